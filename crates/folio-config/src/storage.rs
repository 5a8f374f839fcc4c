use serde::{Deserialize, Serialize};

/// Where uploaded images are served from.
///
/// Stored paths such as `projects/{uuid}.png` resolve to
/// `{public_url}/{bucket}/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  /// Public base URL of the object store.
  pub public_url: String,

  /// Bucket holding project images.
  pub bucket: String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      public_url: String::new(),
      bucket:     "portfolio".to_string(),
    }
  }
}
