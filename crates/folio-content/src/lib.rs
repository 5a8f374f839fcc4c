//! Content records behind a folio site and the operations that edit them.
//!
//! The records are read from a [`SiteData`] export for static builds, and
//! written through the [`ContentStore`] and [`BlobStore`] seams by the editing
//! operations: [`save_project`], [`upload_images`] and the order editor.
pub mod editor;
pub mod error;
pub mod form;
pub mod order;
pub mod records;
pub mod storage;

pub use editor::image_snippets;
pub use error::{FormError, LoadError, SaveError, StoreError, UploadError};
pub use form::{FormData, FormValue, ProfileForm, ProjectForm, UploadFile};
pub use order::{OrderUpdate, parse_order_updates};
pub use records::{Profile, Project, SiteData, is_safe_slug};
pub use storage::{
  BlobStore,
  ContentStore,
  ImageUrlResolver,
  MemoryStore,
  PublicUrlResolver,
  is_admin,
  save_project,
  upload_images,
};
