//! Persistence seams and the operations built on them.
//!
//! The relational store and the object store are external services. They are
//! reached through [`ContentStore`] and [`BlobStore`]; [`MemoryStore`]
//! implements both in process for static builds and tests.
use std::{
  collections::HashMap,
  sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use folio_config::{Config, StorageConfig};
use uuid::Uuid;

use crate::{
  error::{SaveError, StoreError, UploadError},
  form::{ProjectForm, UploadFile},
  order::OrderUpdate,
  records::{Profile, Project, SiteData},
};

/// Directory uploaded project images are stored under.
pub const PROJECT_IMAGE_DIR: &str = "projects";

/// Read and write access to profile and project records.
pub trait ContentStore: Send + Sync {
  /// The profile, if one has been saved.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError`] if the backend cannot be read.
  fn profile(&self) -> Result<Option<Profile>, StoreError>;

  /// Every project, ordered by `sort_order` ascending with unordered
  /// projects last.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError`] if the backend cannot be read.
  fn projects(&self) -> Result<Vec<Project>, StoreError>;

  /// The project published under `slug`.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError`] if the backend cannot be read.
  fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, StoreError>;

  /// Insert or replace the profile.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError`] if the write is rejected.
  fn upsert_profile(&self, profile: Profile) -> Result<Profile, StoreError>;

  /// Update the project with the same id, or insert it when its id is
  /// empty. Returns the stored record.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError`] if the write is rejected or the id is unknown.
  fn save_project(&self, project: Project) -> Result<Project, StoreError>;

  /// Apply new sort orders. Stops at the first failing update.
  ///
  /// # Errors
  ///
  /// Returns the first [`StoreError`] encountered.
  fn update_sort_orders(&self, updates: &[OrderUpdate]) -> Result<(), StoreError>;
}

/// Binary object storage for uploaded images.
pub trait BlobStore: Send + Sync {
  /// Store `bytes` at `path`, replacing anything already there.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError`] if the upload is rejected.
  fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Turns a stored image path into a URL a browser can load.
pub trait ImageUrlResolver {
  fn resolve(&self, path: &str) -> String;
}

/// Resolves stored paths against a public bucket URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrlResolver {
  pub public_url: String,
  pub bucket:     String,
}

impl From<&StorageConfig> for PublicUrlResolver {
  fn from(config: &StorageConfig) -> Self {
    Self {
      public_url: config.public_url.clone(),
      bucket:     config.bucket.clone(),
    }
  }
}

impl ImageUrlResolver for PublicUrlResolver {
  /// `{public_url}/{bucket}/{path}`. Absolute URLs are returned unchanged.
  fn resolve(&self, path: &str) -> String {
    if path.starts_with("http://")
      || path.starts_with("https://")
      || path.starts_with("data:")
    {
      return path.to_string();
    }
    format!(
      "{}/{}/{}",
      self.public_url.trim_end_matches('/'),
      self.bucket.trim_matches('/'),
      path.trim_start_matches('/')
    )
  }
}

/// Whether `email` belongs to the configured admin account.
#[must_use]
pub fn is_admin(email: Option<&str>, config: &Config) -> bool {
  matches!(
    (email, config.admin_email.as_deref()),
    (Some(email), Some(admin)) if !admin.is_empty() && email == admin
  )
}

/// Upload images under fresh `projects/{uuid}.{ext}` paths.
///
/// Returns the stored paths in input order.
///
/// # Errors
///
/// Returns [`UploadError`] on the first failing upload.
pub fn upload_images(
  blobs: &dyn BlobStore,
  files: &[UploadFile],
) -> Result<Vec<String>, UploadError> {
  files
    .iter()
    .map(|file| {
      let path = format!("{PROJECT_IMAGE_DIR}/{}.{}", Uuid::new_v4(), file.extension());
      blobs.upload(&path, &file.bytes).map_err(|source| {
        log::error!("Upload of {} failed: {source}", file.name);
        UploadError { source }
      })?;
      log::debug!("Uploaded {} to {path}", file.name);
      Ok(path)
    })
    .collect()
}

/// Save a project editor submission.
///
/// A new cover image is uploaded first and replaces `cover_image_path`. On
/// success, returns the site paths whose pages must be rebuilt: the index,
/// the project page and, when the slug changed, the page under the old slug.
///
/// # Errors
///
/// Returns [`SaveError::Upload`] if the cover upload fails, in which case
/// nothing is saved, and [`SaveError::Store`] if the record is rejected.
pub fn save_project(
  store: &dyn ContentStore,
  blobs: &dyn BlobStore,
  form: ProjectForm,
) -> Result<Vec<String>, SaveError> {
  let ProjectForm {
    mut project,
    original_slug,
    cover_upload,
  } = form;

  if let Some(cover) = cover_upload {
    let mut paths = upload_images(blobs, std::slice::from_ref(&cover))?;
    project.cover_image_path = paths.pop();
  }

  let saved = store.save_project(project)?;
  log::info!("Saved project {} ({})", saved.slug, saved.id);

  let mut rebuild = vec!["/".to_string()];
  if let Some(old) = original_slug
    && old != saved.slug
  {
    rebuild.push(format!("/projects/{old}"));
  }
  rebuild.push(format!("/projects/{}", saved.slug));
  Ok(rebuild)
}

#[derive(Debug, Default)]
struct MemoryState {
  profile:  Option<Profile>,
  projects: Vec<Project>,
  blobs:    HashMap<String, Vec<u8>>,
}

/// In-process [`ContentStore`] and [`BlobStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
  state: RwLock<MemoryState>,
}

impl From<SiteData> for MemoryStore {
  fn from(data: SiteData) -> Self {
    Self {
      state: RwLock::new(MemoryState {
        profile: data.profile,
        projects: data.projects,
        blobs: HashMap::new(),
      }),
    }
  }
}

impl MemoryStore {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
    self.state.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
    self.state.write().unwrap_or_else(PoisonError::into_inner)
  }

  /// Bytes stored at `path`.
  #[must_use]
  pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
    self.read().blobs.get(path).cloned()
  }

  /// Export the records as they are now.
  #[must_use]
  pub fn snapshot(&self) -> SiteData {
    let state = self.read();
    SiteData {
      profile:  state.profile.clone(),
      projects: state.projects.clone(),
    }
  }
}

impl ContentStore for MemoryStore {
  fn profile(&self) -> Result<Option<Profile>, StoreError> {
    Ok(self.read().profile.clone())
  }

  fn projects(&self) -> Result<Vec<Project>, StoreError> {
    let mut projects = self.read().projects.clone();
    // Stable, so equal orders keep insertion order.
    projects.sort_by_key(|project| (project.sort_order.is_none(), project.sort_order));
    Ok(projects)
  }

  fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, StoreError> {
    Ok(
      self
        .read()
        .projects
        .iter()
        .find(|project| project.slug == slug)
        .cloned(),
    )
  }

  fn upsert_profile(&self, mut profile: Profile) -> Result<Profile, StoreError> {
    let mut state = self.write();
    if profile.id.is_empty() {
      profile.id = state
        .profile
        .as_ref()
        .map_or_else(|| Uuid::new_v4().to_string(), |existing| existing.id.clone());
    }
    state.profile = Some(profile.clone());
    Ok(profile)
  }

  fn save_project(&self, mut project: Project) -> Result<Project, StoreError> {
    let mut state = self.write();

    if state
      .projects
      .iter()
      .any(|other| other.slug == project.slug && other.id != project.id)
    {
      return Err(StoreError::with_code(
        format!("duplicate key value violates unique constraint on slug '{}'", project.slug),
        "23505",
      ));
    }

    if project.id.is_empty() {
      project.id = Uuid::new_v4().to_string();
      state.projects.push(project.clone());
      return Ok(project);
    }

    let existing = state
      .projects
      .iter_mut()
      .find(|other| other.id == project.id)
      .ok_or_else(|| {
        StoreError::with_code(format!("No project with id {}", project.id), "PGRST116")
      })?;
    *existing = project.clone();
    Ok(project)
  }

  fn update_sort_orders(&self, updates: &[OrderUpdate]) -> Result<(), StoreError> {
    let mut state = self.write();
    for update in updates {
      let project = state
        .projects
        .iter_mut()
        .find(|project| project.id == update.id)
        .ok_or_else(|| {
          StoreError::with_code(format!("No project with id {}", update.id), "PGRST116")
        })?;
      project.sort_order = Some(update.sort_order);
    }
    Ok(())
  }
}

impl BlobStore for MemoryStore {
  fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), StoreError> {
    self.write().blobs.insert(path.to_string(), bytes.to_vec());
    Ok(())
  }
}
