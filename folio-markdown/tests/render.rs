#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
use std::sync::{
  Arc,
  Barrier,
  atomic::{AtomicUsize, Ordering},
};

use folio_markdown::{
  CodeHighlighter,
  DiagramEngine,
  DiagramError,
  DiagramRenderer,
  DocumentRenderer,
  DocumentView,
  MarkdownProcessor,
  diagram::SVG_STYLE,
};

/// Echoes the preprocessed source back inside an `<svg>`.
struct EchoEngine {
  calls: AtomicUsize,
}

impl DiagramEngine for EchoEngine {
  fn name(&self) -> &'static str {
    "echo"
  }

  fn render_svg(&self, id: &str, source: &str) -> Result<String, DiagramError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(format!(r#"<svg id="{id}"><desc>{}</desc></svg>"#, source.len()))
  }
}

struct SyntaxErrorEngine;

impl DiagramEngine for SyntaxErrorEngine {
  fn name(&self) -> &'static str {
    "broken"
  }

  fn render_svg(&self, _id: &str, _source: &str) -> Result<String, DiagramError> {
    Err(DiagramError::Render("Parse error on line 2".into()))
  }
}

/// Blocks inside the engine until the test releases it.
struct GatedEngine {
  gate: Arc<Barrier>,
}

impl DiagramEngine for GatedEngine {
  fn name(&self) -> &'static str {
    "gated"
  }

  fn render_svg(&self, _id: &str, _source: &str) -> Result<String, DiagramError> {
    self.gate.wait();
    Ok("<svg></svg>".into())
  }
}

fn renderer(diagrams: DiagramRenderer) -> DocumentRenderer {
  DocumentRenderer::new(
    MarkdownProcessor::default(),
    CodeHighlighter::disabled(),
    diagrams,
  )
}

const DOCUMENT: &str = "# Flow\n\n```mermaid\ngraph TD; A-->B\n```\n\n```rust\nlet \
                        x = 1 < 2;\n```\n\n```mermaid\nsequenceDiagram\n```";

#[tokio::test]
async fn fills_every_slot() {
  let engine = Arc::new(EchoEngine {
    calls: AtomicUsize::new(0),
  });
  let view = DocumentView::new();
  let doc = renderer(DiagramRenderer::with_engine(engine.clone()))
    .render(&view, DOCUMENT)
    .await;

  assert_eq!(doc.title.as_deref(), Some("Flow"));
  assert_eq!(doc.toc.len(), 1);
  assert!(!doc.html.contains("folio-slot"));
  assert!(doc.html.contains(r#"<svg id="diagram-0""#));
  assert!(doc.html.contains(SVG_STYLE));
  assert!(doc.html.contains("let x = 1 &lt; 2;"));
  assert!(doc.html.contains(r#"class="copy-button""#));
  assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
  assert_eq!(view.completed(), 3);

  let raw = view.diagram_svg("diagram-2").unwrap();
  assert!(!raw.contains(SVG_STYLE), "zoom view keeps the raw markup");
  assert!(doc.html.contains(&format!(r#"<template class="diagram-source">{raw}</template>"#)));
}

#[tokio::test]
async fn diagram_failures_render_inline() {
  let view = DocumentView::new();
  let doc = renderer(DiagramRenderer::with_engine(Arc::new(SyntaxErrorEngine)))
    .render(&view, "```mermaid\ngraph TD; A-->\n```")
    .await;

  assert!(doc.html.contains("diagram-error"));
  assert!(doc.html.contains("Mermaid Error: Parse error on line 2\ngraph TD; A--&gt;"));
  assert!(view.diagram_svg("diagram-0").is_none());
}

#[tokio::test]
async fn failed_engine_load_is_retried() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&attempts);
  let diagrams = DiagramRenderer::new(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    Err(DiagramError::Engine("offline".into()))
  });

  let view = DocumentView::new();
  let doc = renderer(diagrams)
    .render(&view, "```mermaid\na\n```\n\n```mermaid\nb\n```")
    .await;

  assert_eq!(doc.html.matches("Mermaid Error: Diagram engine unavailable: offline").count(), 2);
  assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn engine_loads_once_for_concurrent_blocks() {
  let loads = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&loads);
  let diagrams = DiagramRenderer::new(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    let engine: Arc<dyn DiagramEngine> = Arc::new(EchoEngine {
      calls: AtomicUsize::new(0),
    });
    Ok(engine)
  });

  let markdown = (0..8)
    .map(|i| format!("```mermaid\ngraph TD; N{i}\n```"))
    .collect::<Vec<_>>()
    .join("\n\n");
  let view = DocumentView::new();
  renderer(diagrams).render(&view, &markdown).await;

  assert_eq!(loads.load(Ordering::SeqCst), 1);
  assert_eq!(view.completed(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn teardown_discards_late_results() {
  let gate = Arc::new(Barrier::new(2));
  let diagrams = DiagramRenderer::with_engine(Arc::new(GatedEngine {
    gate: Arc::clone(&gate),
  }));

  let view = DocumentView::new();
  let pass = renderer(diagrams).start(&view, "```mermaid\ngraph TD\n```");
  assert!(view.html().contains("diagram-pending"));

  view.teardown();
  let release = Arc::clone(&gate);
  tokio::task::spawn_blocking(move || release.wait())
    .await
    .unwrap();

  let doc = pass.finish(&view).await;
  assert!(doc.html.is_empty());
  assert!(view.diagram_svg("diagram-0").is_none());
  assert_eq!(view.completed(), 0);
}

#[test]
fn rerender_invalidates_previous_token() {
  let view = DocumentView::new();
  let first = view.begin(&MarkdownProcessor::default().render("```\nold\n```"));
  let second = view.begin(&MarkdownProcessor::default().render("```\nnew\n```"));

  assert!(!first.is_active());
  assert!(second.is_active());
  assert!(!view.apply(&first, "code-0", "stale".into()));
  assert!(view.apply(&second, "code-0", "fresh".into()));
  assert_eq!(view.html().trim(), "fresh");
}

#[test]
fn token_from_another_view_is_rejected() {
  let a = DocumentView::new();
  let b = DocumentView::new();
  let result = MarkdownProcessor::default().render("```\nx\n```");
  let token = a.begin(&result);
  let _ = b.begin(&result);

  assert!(!b.apply(&token, "code-0", "wrong view".into()));
}

#[test]
fn token_dies_with_its_view() {
  let view = DocumentView::new();
  let token = view.begin(&MarkdownProcessor::default().render("# x"));
  drop(view);
  assert!(!token.is_active());
}
