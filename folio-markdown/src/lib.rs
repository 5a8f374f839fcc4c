//! # folio-markdown
//!
//! The markdown pipeline behind folio's profile and project pages. Turns a
//! markdown string into HTML with GitHub Flavored Markdown extensions, and
//! routes the interesting parts of the document to dedicated renderers:
//!
//! - fenced `mermaid` blocks go to a [`DiagramRenderer`] after a default
//!   hand-drawn init directive has been injected
//! - every other fenced block goes to a [`CodeHighlighter`], with automatic
//!   language detection and an escaped plain-text fallback
//! - level 1 and 2 headings receive slug anchors, and the same slugs are
//!   produced by [`extract_toc`] for sidebar navigation
//! - blockquotes are classified into callouts by their emoji marker
//! - images become lightbox triggers
//!
//! ## Quick Start
//!
//! ```rust
//! use folio_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let result = processor.render("# Hello\n\n> ✅ Shipped it.");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains(r#"<h1 id="hello">"#));
//! assert!(result.html.contains("callout-result"));
//! ```
//!
//! Code and diagram blocks are left as slots in [`MarkdownResult::html`]. The
//! asynchronous [`DocumentRenderer`] fills them concurrently; callers that do
//! not need highlighting can use [`MarkdownResult::fallback_html`].

pub mod callout;
pub mod diagram;
pub mod lightbox;
pub mod processor;
pub mod render;
pub mod syntax;
pub mod toc;
mod types;
pub mod utils;

pub use crate::{
  callout::CalloutVariant,
  diagram::{DiagramEngine, DiagramError, DiagramOutput, DiagramRenderer},
  lightbox::{Lightbox, LightboxContent, LightboxEvent},
  processor::{AstTransformer, MarkdownOptions, MarkdownProcessor, RenderMode},
  render::{
    DocumentRenderer,
    DocumentView,
    RenderPass,
    RenderToken,
    RenderedDocument,
  },
  syntax::{CodeHighlighter, CopyButton},
  toc::{TocItem, TocStore, extract_toc},
  types::{CodeBlock, DiagramBlock, MarkdownResult},
  utils::{combine_sections, slugify},
};
