use std::fmt::Write;

use folio_markdown::TocItem;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Sidebar list items for a page's table of contents.
///
/// Each entry links to its heading anchor. Level 2 entries carry the
/// `toc-level-2` class, which the stylesheet indents.
#[must_use]
pub fn generate_toc(items: &[TocItem]) -> String {
  let mut toc = String::new();
  for item in items {
    // Writing to String is infallible
    let _ = writeln!(
      toc,
      "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
      item.level,
      encode_double_quoted_attribute(&item.id),
      encode_text(&item.text)
    );
  }
  toc
}

#[cfg(test)]
mod tests {
  use folio_markdown::extract_toc;

  use super::*;

  #[test]
  fn levels_become_classes() {
    let toc = generate_toc(&extract_toc("# A\n## B <i>\n### C"));
    assert_eq!(
      toc,
      "<li class=\"toc-level-1\"><a href=\"#a\">A</a></li>\n<li \
       class=\"toc-level-2\"><a href=\"#b-i\">B &lt;i&gt;</a></li>\n"
    );
  }

  #[test]
  fn empty_toc_is_empty() {
    assert!(generate_toc(&[]).is_empty());
  }
}
