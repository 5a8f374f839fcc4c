//! Parsing submitted editor forms into records.
use folio_markdown::combine_sections;

use crate::{
  error::FormError,
  records::{Profile, Project, is_safe_slug},
};

/// Default class for project titles.
pub const DEFAULT_TITLE_TYPOGRAPHY: &str = "heading-32_b";
/// Default class for project subtitles.
pub const DEFAULT_SUBTITLE_TYPOGRAPHY: &str = "title-20_sb";
/// Default class for project bodies.
pub const DEFAULT_BODY_TYPOGRAPHY: &str = "body-16_r";

/// A file submitted with a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
  pub name:  String,
  pub bytes: Vec<u8>,
}

impl UploadFile {
  #[must_use]
  pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      name:  name.into(),
      bytes: bytes.into(),
    }
  }

  /// Extension of the original file name, or `bin` when it has none.
  #[must_use]
  pub fn extension(&self) -> &str {
    self
      .name
      .rsplit_once('.')
      .map(|(_, ext)| ext)
      .filter(|ext| !ext.is_empty())
      .unwrap_or("bin")
  }
}

/// One submitted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
  Text(String),
  File(UploadFile),
}

/// Submitted form fields in submission order. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
  entries: Vec<(String, FormValue)>,
}

impl FormData {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self
      .entries
      .push((name.into(), FormValue::Text(value.into())));
  }

  pub fn append_file(&mut self, name: impl Into<String>, file: UploadFile) {
    self.entries.push((name.into(), FormValue::File(file)));
  }

  /// Builder form of [`FormData::append_text`].
  #[must_use]
  pub fn text(mut self, name: &str, value: &str) -> Self {
    self.append_text(name, value);
    self
  }

  /// Builder form of [`FormData::append_file`].
  #[must_use]
  pub fn file(mut self, name: &str, file: UploadFile) -> Self {
    self.append_file(name, file);
    self
  }

  /// First value named `name`.
  #[must_use]
  pub fn get(&self, name: &str) -> Option<&FormValue> {
    self
      .entries
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value)
  }

  /// Every value named `name`, in order.
  pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> {
    self
      .entries
      .iter()
      .filter(move |(key, _)| key == name)
      .map(|(_, value)| value)
  }

  /// Every submitted file, in order, regardless of field name.
  pub fn files(&self) -> impl Iterator<Item = &UploadFile> {
    self.entries.iter().filter_map(|(_, value)| {
      match value {
        FormValue::File(file) => Some(file),
        FormValue::Text(_) => None,
      }
    })
  }

  /// First text value named `name`, as submitted.
  #[must_use]
  pub fn get_text(&self, name: &str) -> Option<&str> {
    match self.get(name)? {
      FormValue::Text(text) => Some(text),
      FormValue::File(_) => None,
    }
  }

  /// Text value named `name`, with empty values treated as absent.
  #[must_use]
  pub fn optional(&self, name: &str) -> Option<String> {
    self
      .get_text(name)
      .filter(|text| !text.is_empty())
      .map(str::to_string)
  }

  /// First non-empty file named `name`.
  #[must_use]
  pub fn get_file(&self, name: &str) -> Option<&UploadFile> {
    match self.get(name)? {
      FormValue::File(file) if !file.bytes.is_empty() => Some(file),
      _ => None,
    }
  }
}

/// Split a comma-separated tag field. Returns `None` when nothing is left.
#[must_use]
pub fn parse_tags(value: Option<&str>) -> Option<Vec<String>> {
  let tags: Vec<String> = value?
    .split(',')
    .map(str::trim)
    .filter(|tag| !tag.is_empty())
    .map(str::to_string)
    .collect();
  (!tags.is_empty()).then_some(tags)
}

/// A parsed project editor submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectForm {
  /// The record to save. Its `id` is empty for new projects.
  pub project:       Project,
  /// Slug the project had before this edit.
  pub original_slug: Option<String>,
  /// New cover image to upload. Replaces `cover_image_path` once stored.
  pub cover_upload:  Option<UploadFile>,
}

impl ProjectForm {
  /// Parse a project editor submission.
  ///
  /// # Errors
  ///
  /// Returns [`FormError::MissingField`] if `slug` or `title` is empty,
  /// [`FormError::InvalidSlug`] if `slug` is not a single path segment and
  /// [`FormError::InvalidNumber`] if `sort_order` is not an integer.
  pub fn parse(form: &FormData) -> Result<Self, FormError> {
    let section = |name| form.get_text(name).unwrap_or_default().to_string();
    let body_intro = section("body_intro");
    let body_main = section("body_main");
    let body_outro = section("body_outro");
    let body = combine_sections(&[&body_intro, &body_main, &body_outro]);

    let slug = form.optional("slug").ok_or(FormError::MissingField("slug"))?;
    if !is_safe_slug(&slug) {
      return Err(FormError::InvalidSlug(slug));
    }
    let title = form
      .optional("title")
      .ok_or(FormError::MissingField("title"))?;

    let sort_order = form
      .optional("sort_order")
      .map(|raw| {
        raw.trim().parse::<i64>().map_err(|_| {
          FormError::InvalidNumber {
            field: "sort_order",
            value: raw.clone(),
          }
        })
      })
      .transpose()?;

    let typography = |name, default: &str| {
      Some(form.optional(name).unwrap_or_else(|| default.to_string()))
    };
    let tags = |name| parse_tags(form.get_text(name));

    let project = Project {
      id: form.optional("id").unwrap_or_default(),
      slug,
      title,
      subtitle: form.optional("subtitle"),
      period: form.optional("period"),
      summary: form.optional("summary"),
      body: Some(body),
      body_intro: Some(body_intro),
      body_main: Some(body_main),
      body_outro: Some(body_outro),
      cover_image_path: form.optional("cover_image_path"),
      impact: form.optional("impact"),
      link: form.optional("link"),
      sort_order,
      type_tags: tags("type_tags"),
      tech_stack_tags: tags("tech_stack_tags"),
      theme_tags: tags("theme_tags"),
      role_tags: tags("role_tags"),
      keywords: tags("keywords"),
      title_typography: typography("title_typography", DEFAULT_TITLE_TYPOGRAPHY),
      subtitle_typography: typography(
        "subtitle_typography",
        DEFAULT_SUBTITLE_TYPOGRAPHY,
      ),
      body_typography: typography("body_typography", DEFAULT_BODY_TYPOGRAPHY),
    };

    Ok(Self {
      project,
      original_slug: form.optional("original_slug"),
      cover_upload: form.get_file("cover_image").cloned(),
    })
  }
}

/// Profile editor submission.
pub struct ProfileForm;

impl ProfileForm {
  /// Map a profile editor submission onto a [`Profile`]. Empty fields become
  /// `None`; a missing `id` is left empty for the store to fill in.
  #[must_use]
  pub fn parse(form: &FormData) -> Profile {
    Profile {
      id:             form.optional("id").unwrap_or_default(),
      full_name:      form.optional("full_name"),
      title:          form.optional("title"),
      summary:        form.optional("summary"),
      contact_birth:  form.optional("contact_birth"),
      contact_phone:  form.optional("contact_phone"),
      contact_email:  form.optional("contact_email"),
      contact_github: form.optional("contact_github"),
      skills:         form.optional("skills"),
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  fn minimal() -> FormData {
    FormData::new().text("slug", "pipeline").text("title", "Pipeline")
  }

  #[test]
  fn empty_text_becomes_none() {
    let form = minimal().text("subtitle", "").text("period", "2024");
    let parsed = ProjectForm::parse(&form).unwrap();
    assert_eq!(parsed.project.subtitle, None);
    assert_eq!(parsed.project.period.as_deref(), Some("2024"));
    assert_eq!(parsed.project.id, "");
  }

  #[test]
  fn slug_and_title_are_required() {
    let form = FormData::new().text("title", "T");
    assert_eq!(
      ProjectForm::parse(&form),
      Err(FormError::MissingField("slug"))
    );

    let form = FormData::new().text("slug", "s").text("title", "");
    assert_eq!(
      ProjectForm::parse(&form),
      Err(FormError::MissingField("title"))
    );
  }

  #[test]
  fn slugs_must_be_a_single_path_segment() {
    for slug in ["../x", "a/b", "a\\b", "..", "."] {
      let form = FormData::new().text("slug", slug).text("title", "T");
      assert_eq!(
        ProjectForm::parse(&form),
        Err(FormError::InvalidSlug(slug.to_string())),
        "{slug}"
      );
    }

    let form = FormData::new().text("slug", "v1.2-notes").text("title", "T");
    assert_eq!(ProjectForm::parse(&form).unwrap().project.slug, "v1.2-notes");
  }

  #[test]
  fn typography_defaults_apply() {
    let parsed = ProjectForm::parse(&minimal().text("body_typography", "body-14_r"))
      .unwrap()
      .project;
    assert_eq!(parsed.title_typography.as_deref(), Some("heading-32_b"));
    assert_eq!(parsed.subtitle_typography.as_deref(), Some("title-20_sb"));
    assert_eq!(parsed.body_typography.as_deref(), Some("body-14_r"));
  }

  #[test]
  fn tags_are_split_and_trimmed() {
    let form = minimal()
      .text("tech_stack_tags", " Rust, ,Tokio ,")
      .text("theme_tags", " , ");
    let project = ProjectForm::parse(&form).unwrap().project;
    assert_eq!(
      project.tech_stack_tags,
      Some(vec!["Rust".to_string(), "Tokio".to_string()])
    );
    assert_eq!(project.theme_tags, None);
    assert_eq!(project.role_tags, None);
  }

  #[test]
  fn sort_order_must_be_an_integer() {
    let parsed = ProjectForm::parse(&minimal().text("sort_order", " 3 ")).unwrap();
    assert_eq!(parsed.project.sort_order, Some(3));

    let err = ProjectForm::parse(&minimal().text("sort_order", "1.5")).unwrap_err();
    assert_eq!(err, FormError::InvalidNumber {
      field: "sort_order",
      value: "1.5".to_string(),
    });
  }

  #[test]
  fn body_is_the_combined_sections() {
    let form = minimal()
      .text("body_intro", "Intro\n")
      .text("body_main", "")
      .text("body_outro", "Outro");
    let project = ProjectForm::parse(&form).unwrap().project;
    assert_eq!(project.body.as_deref(), Some("Intro\n\n---\n\nOutro"));
    assert_eq!(project.body_main.as_deref(), Some(""));
  }

  #[test]
  fn only_non_empty_cover_is_uploaded() {
    let form = minimal().file("cover_image", UploadFile::new("a.png", Vec::new()));
    assert!(ProjectForm::parse(&form).unwrap().cover_upload.is_none());

    let form = minimal().file("cover_image", UploadFile::new("a.png", vec![1, 2]));
    let cover = ProjectForm::parse(&form).unwrap().cover_upload.unwrap();
    assert_eq!(cover.extension(), "png");
  }

  #[test]
  fn file_extension_falls_back() {
    assert_eq!(UploadFile::new("README", vec![1]).extension(), "bin");
    assert_eq!(UploadFile::new("a.tar.gz", vec![1]).extension(), "gz");
  }

  #[test]
  fn profile_form_maps_fields() {
    let form = FormData::new()
      .text("full_name", "Jiin Lee")
      .text("contact_phone", "")
      .text("skills", "- Rust");
    let profile = ProfileForm::parse(&form);
    assert_eq!(profile.full_name.as_deref(), Some("Jiin Lee"));
    assert_eq!(profile.contact_phone, None);
    assert_eq!(profile.skills.as_deref(), Some("- Rust"));
    assert!(profile.id.is_empty());
  }
}
