//! The seam between the renderer and whatever draws the diagrams.

/// Errors a diagram engine can report.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
  #[error("HTTP error: {0}")]
  Http(String),
  #[error("I/O error: {0}")]
  Io(String),
  /// The engine ran but rejected the diagram, e.g. a syntax error.
  #[error("{0}")]
  Render(String),
  #[error("Diagram engine unavailable: {0}")]
  Engine(String),
}

/// A backend that turns preprocessed diagram text into SVG markup.
///
/// Calls are blocking; the renderer runs them off the async executor.
pub trait DiagramEngine: Send + Sync {
  /// Short backend name for logs.
  fn name(&self) -> &'static str;

  /// Render `source` to an SVG document. `id` identifies the block and is
  /// unique within a page.
  ///
  /// # Errors
  ///
  /// Returns an error if the engine cannot be reached or rejects the source.
  fn render_svg(&self, id: &str, source: &str) -> Result<String, DiagramError>;
}
