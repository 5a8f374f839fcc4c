use std::sync::LazyLock;

use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{LocalName, QualName, ns};
use regex::Regex;

/// Separator placed between the non-empty sections of a combined body.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Tag name of the placeholder element left where a code or diagram block
/// will be rendered.
pub(crate) const SLOT_TAG: &str = "folio-slot";

/// Slugify heading text for use as an anchor ID.
///
/// Lowercases the text and keeps ASCII letters, digits and Hangul syllables.
/// Runs of whitespace and hyphens become a single hyphen, and the result never
/// starts or ends with one. Everything else is dropped.
///
/// # Examples
///
/// ```
/// use folio_markdown::slugify;
///
/// assert_eq!(slugify(" Data  Pipeline! "), "data-pipeline");
/// assert_eq!(slugify("문제 정의"), "문제-정의");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
  let kept: String = text
    .to_lowercase()
    .chars()
    .filter(|&c| is_slug_char(c) || c.is_whitespace() || c == '-')
    .collect();

  kept
    .split(|c: char| c.is_whitespace() || c == '-')
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-")
}

const fn is_slug_char(c: char) -> bool {
  matches!(c, 'a'..='z' | '0'..='9' | '\u{AC00}'..='\u{D7A3}')
}

/// Join body sections into one markdown document.
///
/// Each section is trimmed, empty ones are dropped, and the rest are joined
/// with a thematic break.
///
/// # Examples
///
/// ```
/// use folio_markdown::combine_sections;
///
/// assert_eq!(combine_sections(&["A", "", "C"]), "A\n\n---\n\nC");
/// ```
#[must_use]
pub fn combine_sections<S: AsRef<str>>(sections: &[S]) -> String {
  sections
    .iter()
    .map(|s| s.as_ref().trim())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(SECTION_SEPARATOR)
}

/// Escape text for inclusion in HTML, including both quote characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
  html_escape::encode_quoted_attribute(text).into_owned()
}

/// Language tag from a `language-*` class attribute.
///
/// Only the leading word characters count, so `language-c++` yields `c`.
#[must_use]
pub fn language_from_class(class: &str) -> Option<String> {
  class
    .split_whitespace()
    .find_map(|c| c.strip_prefix("language-"))
    .map(|lang| {
      lang
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
    })
    .filter(|lang| !lang.is_empty())
}

/// Placeholder markup for a block slot.
#[must_use]
pub fn slot_placeholder(slot: &str) -> String {
  format!(r#"<{SLOT_TAG} data-slot="{slot}"></{SLOT_TAG}>"#)
}

/// Replace every slot placeholder in `html` with the markup returned by
/// `fill`. Slots for which `fill` returns `None` are removed.
pub fn fill_slots<F>(html: &str, mut fill: F) -> String
where
  F: FnMut(&str) -> Option<String>,
{
  static SLOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<folio-slot data-slot="([a-z]+-\d+)"></folio-slot>"#)
      .unwrap_or_else(|e| {
        log::error!("Failed to compile SLOT_RE regex: {e}");
        never_matching_regex()
      })
  });

  SLOT_RE
    .replace_all(html, |caps: &regex::Captures| {
      fill(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}

/// Build a detached HTML element with the given attributes.
pub(crate) fn new_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), LocalName::from(tag)),
    attributes.iter().map(|(name, value)| {
      (ExpandedName::new("", *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Serialize the children of `<body>`, leaving out the document wrapper the
/// HTML parser adds around fragments.
pub(crate) fn serialize_body(document: &NodeRef) -> String {
  let mut out = Vec::new();
  match document.select_first("body") {
    Ok(body) => {
      for child in body.as_node().children() {
        if let Err(e) = child.serialize(&mut out) {
          log::error!("Failed to serialize HTML node: {e}");
        }
      }
    },
    Err(()) => {
      if let Err(e) = document.serialize(&mut out) {
        log::error!("Failed to serialize HTML document: {e}");
      }
    },
  }
  String::from_utf8(out).unwrap_or_default()
}

/// A regex that never matches, used when a static pattern fails to compile.
///
/// # Panics
///
/// Panics if the fallback pattern fails to compile, which should never happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    Regex::new(r"^\b$").expect("regex pattern ^\\b$ should always compile")
  })
}
