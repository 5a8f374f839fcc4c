use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading, overriding or exporting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Template error: {0}")]
  Template(String),

  #[error("Failed to read config file: {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse {format} config from {}: {message}", path.display())]
  Parse {
    path:    PathBuf,
    format:  &'static str,
    message: String,
  },

  #[error("Unsupported config file format: {}", .0.display())]
  UnsupportedFormat(PathBuf),

  #[error("Invalid config override format: '{0}'. Expected KEY=VALUE")]
  OverrideFormat(String),

  #[error("Unknown configuration key: '{0}'. See documentation for supported keys.")]
  UnknownKey(String),

  #[error("Invalid value for '{key}': '{value}'. Expected {expected}")]
  InvalidValue {
    key:      String,
    value:    String,
    expected: &'static str,
  },

  #[error("Configuration path validation errors:\n{}", .0.join("\n"))]
  InvalidPaths(Vec<String>),
}
