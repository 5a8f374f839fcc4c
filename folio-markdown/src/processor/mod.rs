//! Markdown processing: comrak parsing plus DOM post-processing.
//!
//! - [`types`]: options, the processor and AST transformers
//! - [`core`]: the rendering pipeline
//! - [`process`]: panic isolation helpers
pub mod core;
pub mod process;
pub mod types;

pub use core::extract_inline_text;
pub use process::{process_safe, process_with_recovery};
pub use types::{
  AstTransformer,
  CardTransformer,
  MarkdownOptions,
  MarkdownProcessor,
  RenderMode,
};
