//! Type definitions for the Markdown processor.
//!
//! # Examples
//!
//! ```
//! use folio_markdown::{MarkdownOptions, MarkdownProcessor, RenderMode};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions {
//!   mode: RenderMode::Card,
//!   ..Default::default()
//! });
//! assert!(processor.render("![x](a.png) hi").code_blocks.is_empty());
//! ```

use comrak::nodes::{AstNode, NodeValue};

/// Which rendering rules apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
  /// Full project pages: anchors, callouts, code and diagram slots.
  #[default]
  Document,
  /// Compact project card summaries: images and fenced code are dropped and
  /// block elements are flattened into spans.
  Card,
}

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown extensions: tables, strikethrough,
  /// autolinks, task lists and footnotes.
  pub gfm: bool,

  /// Rendering rules to apply.
  pub mode: RenderMode,

  /// Route `mermaid` fenced blocks to the diagram renderer. When off they
  /// are treated as ordinary code.
  pub diagrams: bool,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:      true,
      mode:     RenderMode::Document,
      diagrams: true,
    }
  }
}

/// Main Markdown processor.
///
/// Rendering is synchronous and never fails. Code and diagram blocks are
/// left as slots for [`crate::DocumentRenderer`] to fill in.
#[derive(Debug, Clone, Default)]
pub struct MarkdownProcessor {
  pub(crate) options: MarkdownOptions,
}

/// Trait for AST transformations applied between parsing and HTML output.
pub trait AstTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// Removes images and fenced code blocks, for card summaries.
pub struct CardTransformer;

impl AstTransformer for CardTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    // Collect first; detaching while walking would cut the traversal short.
    let dropped: Vec<_> = node
      .descendants()
      .filter(|n| {
        matches!(
          n.data.borrow().value,
          NodeValue::Image(..) | NodeValue::CodeBlock(..)
        )
      })
      .collect();

    for n in dropped {
      n.detach();
    }
  }
}
