use std::{fmt, io};

use thiserror::Error;

/// Error reported by a [`crate::ContentStore`] or [`crate::BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
  pub message: String,
  /// Backend error code, when the backend reports one.
  pub code:    Option<String>,
}

impl StoreError {
  #[must_use]
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      code:    None,
    }
  }

  #[must_use]
  pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      code:    Some(code.into()),
    }
  }
}

impl fmt::Display for StoreError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.code {
      Some(code) => write!(f, "{} [{code}]", self.message),
      None => f.write_str(&self.message),
    }
  }
}

impl std::error::Error for StoreError {}

/// An image upload failed. The message is meant for the editor's user; the
/// store's own error is kept as the source.
#[derive(Debug, Error)]
#[error("Image upload failed. Please try again shortly.")]
pub struct UploadError {
  #[source]
  pub source: StoreError,
}

/// Error type for form parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
  #[error("Missing required field: {0}")]
  MissingField(&'static str),

  #[error("Invalid number for '{field}': '{value}'")]
  InvalidNumber { field: &'static str, value: String },

  #[error("Invalid slug '{0}': slugs cannot contain '/', '\\' or '..'")]
  InvalidSlug(String),
}

/// Error type for [`crate::save_project`]
#[derive(Debug, Error)]
pub enum SaveError {
  #[error(transparent)]
  Upload(#[from] UploadError),

  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Error type for loading a site data export
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("Failed to read {path}: {source}")]
  Io {
    path:   String,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse JSON data: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Failed to parse TOML data: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("Unsupported data file format: {0}")]
  UnsupportedFormat(String),
}
