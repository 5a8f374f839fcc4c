use serde::{Deserialize, Serialize};

/// Configuration for diagram rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
  /// Whether `mermaid` fenced blocks are rendered as diagrams. When off they
  /// are highlighted like any other code.
  pub enable: bool,

  /// Base URL of the Kroki server used to render diagrams.
  pub kroki_url: String,

  /// Per-diagram request timeout in seconds.
  pub timeout_secs: u64,
}

impl Default for DiagramsConfig {
  fn default() -> Self {
    Self {
      enable:       true,
      kroki_url:    "https://kroki.io".to_string(),
      timeout_secs: 10,
    }
  }
}
