//! Asynchronous document rendering.
//!
//! [`DocumentRenderer`] runs the synchronous processor, then renders every
//! code and diagram block concurrently into a [`DocumentView`]. Each render
//! pass holds a [`RenderToken`]; results are written only while the token is
//! still current, so a torn-down or re-rendered view never receives output
//! from an older pass.
use std::{
  collections::HashMap,
  sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
    Weak,
    atomic::{AtomicU64, Ordering},
  },
};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::{
  diagram::{DiagramOutput, DiagramRenderer},
  processor::{MarkdownProcessor, process_with_recovery},
  syntax::CodeHighlighter,
  toc::TocItem,
  types::MarkdownResult,
  utils::fill_slots,
};

#[derive(Debug, Default)]
struct ViewState {
  skeleton:  String,
  fallbacks: HashMap<String, String>,
  slots:     HashMap<String, String>,
  svgs:      HashMap<String, String>,
}

#[derive(Debug, Default)]
struct ViewInner {
  generation: AtomicU64,
  state:      Mutex<ViewState>,
}

/// The rendered form of one document, filled in as blocks complete.
///
/// Clones share the same view.
#[derive(Debug, Clone, Default)]
pub struct DocumentView {
  inner: Arc<ViewInner>,
}

/// Proof that a render pass still owns its view.
#[derive(Debug, Clone)]
pub struct RenderToken {
  view:       Weak<ViewInner>,
  generation: u64,
}

impl RenderToken {
  /// Whether the view still exists and has not been re-rendered or torn
  /// down since this token was issued.
  #[must_use]
  pub fn is_active(&self) -> bool {
    self
      .view
      .upgrade()
      .is_some_and(|view| view.generation.load(Ordering::SeqCst) == self.generation)
  }
}

impl DocumentView {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, ViewState> {
    self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn owns(&self, token: &RenderToken) -> bool {
    std::ptr::eq(token.view.as_ptr(), Arc::as_ptr(&self.inner))
      && self.inner.generation.load(Ordering::SeqCst) == token.generation
  }

  /// Start showing `result`, invalidating every earlier token.
  #[must_use]
  pub fn begin(&self, result: &MarkdownResult) -> RenderToken {
    let mut state = self.lock();
    let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

    let fallbacks = result
      .code_blocks
      .iter()
      .map(|block| &block.slot)
      .chain(result.diagrams.iter().map(|block| &block.slot))
      .filter_map(|slot| {
        result
          .slot_fallback(slot)
          .map(|html| (slot.clone(), html))
      })
      .collect();
    *state = ViewState {
      skeleton: result.html.clone(),
      fallbacks,
      ..ViewState::default()
    };

    RenderToken {
      view: Arc::downgrade(&self.inner),
      generation,
    }
  }

  /// Write a block's markup. Returns `false`, writing nothing, if the token
  /// is stale.
  pub fn apply(&self, token: &RenderToken, slot: &str, html: String) -> bool {
    let mut state = self.lock();
    if !self.owns(token) {
      return false;
    }
    state.slots.insert(slot.to_string(), html);
    true
  }

  /// Keep a diagram's raw SVG for the zoom view. Returns `false` if the token
  /// is stale.
  pub fn cache_svg(&self, token: &RenderToken, slot: &str, svg: String) -> bool {
    let mut state = self.lock();
    if !self.owns(token) {
      return false;
    }
    state.svgs.insert(slot.to_string(), svg);
    true
  }

  /// Raw SVG of a rendered diagram, as the engine produced it.
  #[must_use]
  pub fn diagram_svg(&self, slot: &str) -> Option<String> {
    self.lock().svgs.get(slot).cloned()
  }

  /// Number of slots that have received their final markup.
  #[must_use]
  pub fn completed(&self) -> usize {
    self.lock().slots.len()
  }

  /// Current markup. Slots still rendering show their fallback.
  #[must_use]
  pub fn html(&self) -> String {
    let state = self.lock();
    fill_slots(&state.skeleton, |slot| {
      state
        .slots
        .get(slot)
        .or_else(|| state.fallbacks.get(slot))
        .cloned()
    })
  }

  /// Drop the content and invalidate every outstanding token.
  pub fn teardown(&self) {
    let mut state = self.lock();
    self.inner.generation.fetch_add(1, Ordering::SeqCst);
    *state = ViewState::default();
  }
}

/// A completed render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
  pub html:  String,
  pub toc:   Vec<TocItem>,
  pub title: Option<String>,
}

/// A render in progress.
#[derive(Debug)]
pub struct RenderPass {
  pub toc:   Vec<TocItem>,
  pub title: Option<String>,
  tasks:     JoinSet<()>,
}

impl RenderPass {
  /// Wait for every block and return the assembled document.
  pub async fn finish(mut self, view: &DocumentView) -> RenderedDocument {
    while let Some(joined) = self.tasks.join_next().await {
      if let Err(e) = joined {
        log::error!("Block render task failed: {e}");
      }
    }
    RenderedDocument {
      html:  view.html(),
      toc:   self.toc,
      title: self.title,
    }
  }

  /// Let the block tasks run on without waiting for them.
  pub fn detach(mut self) -> (Vec<TocItem>, Option<String>) {
    self.tasks.detach_all();
    (self.toc, self.title)
  }
}

/// Renders markdown documents into [`DocumentView`]s.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
  processor:   MarkdownProcessor,
  highlighter: CodeHighlighter,
  diagrams:    DiagramRenderer,
}

impl DocumentRenderer {
  #[must_use]
  pub const fn new(
    processor: MarkdownProcessor,
    highlighter: CodeHighlighter,
    diagrams: DiagramRenderer,
  ) -> Self {
    Self {
      processor,
      highlighter,
      diagrams,
    }
  }

  #[must_use]
  pub const fn processor(&self) -> &MarkdownProcessor {
    &self.processor
  }

  /// Process `markdown` into `view` and spawn one task per block.
  ///
  /// Must be called from within a Tokio runtime.
  #[must_use]
  pub fn start(&self, view: &DocumentView, markdown: &str) -> RenderPass {
    let result = process_with_recovery(&self.processor, markdown);
    let token = view.begin(&result);
    let mut tasks = JoinSet::new();

    for block in result.code_blocks {
      let highlighter = self.highlighter.clone();
      let view = view.clone();
      let token = token.clone();
      tasks.spawn(async move {
        let html = highlighter.render_block(&block).await;
        if !view.apply(&token, &block.slot, html) {
          log::trace!("Discarding stale render of {}", block.slot);
        }
      });
    }

    for block in result.diagrams {
      let diagrams = self.diagrams.clone();
      let view = view.clone();
      let token = token.clone();
      tasks.spawn(async move {
        let output = diagrams.render(&block).await;
        if let DiagramOutput::Rendered { raw, .. } = &output {
          view.cache_svg(&token, &block.slot, raw.clone());
        }
        if !view.apply(&token, &block.slot, output.to_html(&block.slot)) {
          log::trace!("Discarding stale render of {}", block.slot);
        }
      });
    }

    RenderPass {
      toc: result.toc,
      title: result.title,
      tasks,
    }
  }

  /// Render `markdown` into `view` and wait for every block.
  pub async fn render(
    &self,
    view: &DocumentView,
    markdown: &str,
  ) -> RenderedDocument {
    self.start(view, markdown).finish(view).await
  }
}
