//! Snippets the markdown editor inserts into a section.
use folio_markdown::CalloutVariant;

use crate::storage::ImageUrlResolver;

/// Two-column table starter.
pub const TABLE_SNIPPET: &str =
  "| Item | Details |\n| --- | --- |\n| Item 1 | Description |\n| Item 2 | Description |\n";

/// Callout starters offered in the editor toolbar, in marker priority order.
#[must_use]
pub fn callout_snippets() -> Vec<(CalloutVariant, &'static str)> {
  CalloutVariant::MARKERS
    .iter()
    .map(|(_, variant)| (*variant, variant.snippet()))
    .collect()
}

/// Markdown image references for uploaded images, separated by blank lines.
#[must_use]
pub fn image_snippets<S: AsRef<str>>(
  paths: &[S],
  resolver: &dyn ImageUrlResolver,
) -> String {
  paths
    .iter()
    .map(|path| format!("![image]({})", resolver.resolve(path.as_ref())))
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Insert `snippet` into `text`, replacing the byte range `start..end`.
///
/// The snippet is set off from preceding text by a blank line and always
/// followed by one. Returns the new text and the cursor position after the
/// snippet. Out of range or non-boundary offsets are clamped to the end of
/// the text.
#[must_use]
pub fn insert_snippet(
  text: &str,
  start: usize,
  end: usize,
  snippet: &str,
) -> (String, usize) {
  let clamp = |offset: usize| {
    if text.is_char_boundary(offset) {
      offset
    } else {
      text.len()
    }
  };
  let start = clamp(start);
  let end = clamp(end).max(start);

  let lead = if start > 0 { "\n\n" } else { "" };
  let mut next = String::with_capacity(text.len() + snippet.len() + 4);
  next.push_str(&text[..start]);
  next.push_str(lead);
  next.push_str(snippet);
  let cursor = next.len();
  next.push_str("\n\n");
  next.push_str(&text[end..]);
  (next, cursor)
}
