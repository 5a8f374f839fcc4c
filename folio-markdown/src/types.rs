//! Types for the folio-markdown public API.
use serde::{Deserialize, Serialize};

use crate::{
  diagram::DiagramOutput,
  syntax::render_code_block,
  toc::TocItem,
  utils::{escape_html, fill_slots},
};

/// A fenced code block waiting to be highlighted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeBlock {
  /// Slot identifier inside [`MarkdownResult::html`], e.g. `code-0`.
  pub slot:     String,
  /// Language tag from the fence info string, if any.
  pub language: Option<String>,
  /// Unhighlighted block text without its trailing newline.
  pub raw_text: String,
}

/// A fenced `mermaid` block waiting to be rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagramBlock {
  /// Slot identifier inside [`MarkdownResult::html`], e.g. `diagram-1`.
  pub slot:     String,
  /// Diagram description as written by the author, without its trailing
  /// newline.
  pub raw_text: String,
}

/// Result of Markdown processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML. Code and diagram blocks are `<folio-slot>` placeholders.
  pub html: String,

  /// Level 1 and 2 headings, in document order.
  pub toc: Vec<TocItem>,

  /// Text of the first level 1 heading.
  pub title: Option<String>,

  /// Code blocks referenced by slots in `html`.
  pub code_blocks: Vec<CodeBlock>,

  /// Diagram blocks referenced by slots in `html`.
  pub diagrams: Vec<DiagramBlock>,
}

impl MarkdownResult {
  /// Markup shown for a slot before its asynchronous render completes.
  ///
  /// Code blocks show their escaped text with line numbers, diagrams an empty
  /// frame.
  #[must_use]
  pub fn slot_fallback(&self, slot: &str) -> Option<String> {
    if let Some(block) = self.code_blocks.iter().find(|b| b.slot == slot) {
      let body = crate::syntax::wrap_lines(&escape_html(&block.raw_text));
      return Some(render_code_block(block, &body));
    }
    self
      .diagrams
      .iter()
      .find(|d| d.slot == slot)
      .map(|d| DiagramOutput::Pending.to_html(&d.slot))
  }

  /// The document with every slot replaced by its fallback markup, for
  /// callers that skip asynchronous rendering entirely.
  #[must_use]
  pub fn fallback_html(&self) -> String {
    fill_slots(&self.html, |slot| self.slot_fallback(slot))
  }
}
