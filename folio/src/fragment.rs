//! Single-file tools: render a markdown fragment, list its table of contents,
//! or apply the default diagram directive.
use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use folio_config::Config;
use folio_markdown::{
  DocumentView,
  MarkdownOptions,
  MarkdownProcessor,
  RenderMode,
  diagram,
  extract_toc,
};

use crate::site;

fn read_input(input: &Path) -> Result<String> {
  fs::read_to_string(input)
    .wrap_err_with(|| format!("Failed to read {}", input.display()))
}

/// Render a markdown file to an HTML fragment.
///
/// Card mode applies the summary rules and needs no runtime. Document mode
/// highlights code and renders diagrams according to `config`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the runtime cannot start.
pub fn render(config: &Config, input: &Path, card: bool) -> Result<String> {
  let markdown = read_input(input)?;

  if card {
    let processor = MarkdownProcessor::new(MarkdownOptions {
      mode: RenderMode::Card,
      ..MarkdownOptions::default()
    });
    return Ok(processor.render(&markdown).fallback_html());
  }

  let renderer = site::renderer_for(config);
  let document = site::runtime()?.block_on(async {
    let view = DocumentView::new();
    renderer.render(&view, &markdown).await
  });
  Ok(document.html)
}

/// The level 1 and 2 headings of a markdown file, as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn toc(input: &Path) -> Result<String> {
  let markdown = read_input(input)?;
  serde_json::to_string_pretty(&extract_toc(&markdown))
    .wrap_err("Failed to serialize the table of contents")
}

/// A diagram source with the default hand-drawn init directive applied.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn directive(input: &Path) -> Result<String> {
  Ok(diagram::preprocess(&read_input(input)?))
}
