//! Syntax highlighting for fenced code blocks.
//!
//! Backends sit behind the [`SyntaxHighlighter`] trait and are driven through
//! a [`SyntaxManager`], which resolves language aliases and falls back to
//! language detection. The shipped backend is **Syntect**, extended with the
//! two-face syntax and theme sets.

mod clipboard;
pub mod error;
mod highlighter;
mod syntect;
pub mod types;

pub use clipboard::{
  COPIED_LABEL,
  COPY_CONFIRMATION,
  COPY_LABEL,
  Clipboard,
  ClipboardError,
  CopyButton,
  MemoryClipboard,
};
pub use error::{SyntaxError, SyntaxResult};
pub use highlighter::{CodeHighlighter, render_code_block, wrap_lines};
pub use syntect::{DEFAULT_THEME, SyntectHighlighter, create_syntect_manager};
pub use types::{Highlighted, SyntaxConfig, SyntaxHighlighter, SyntaxManager};

/// Create the default syntax manager, using `theme` when none is passed per
/// call.
///
/// # Errors
///
/// Returns an error if backend initialization fails.
pub fn create_default_manager(theme: Option<&str>) -> SyntaxResult<SyntaxManager> {
  create_syntect_manager(theme)
}
