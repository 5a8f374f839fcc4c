//! Error types for syntax highlighting operations.

/// Result type for syntax highlighting operations.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Why a code block could not be highlighted. Callers fall back to escaped
/// plain text.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
  #[error("No syntax definition for language '{0}'")]
  UnsupportedLanguage(String),
  #[error("No language given and none could be detected")]
  DetectionFailed,
  #[error("Highlighting failed: {0}")]
  HighlightingFailed(String),
}
