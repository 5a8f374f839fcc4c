//! A two-level `key: value` header parser.
//!
//! Grammar, one entry per line after tabs expand to two spaces:
//!
//! ```text
//! top      = KEY ":" VALUE        ; at column 0
//! section  = KEY ":"              ; at column 0, opens a section
//! nested   = KEY ":" VALUE        ; indented by two or more, inside a section
//! KEY      = [A-Za-z0-9_-]+
//! ```
//!
//! Values are `true`/`false`, integer or decimal literals, or strings with
//! one layer of surrounding quotes removed. Lists, multi-line scalars and
//! deeper nesting are not supported; lines that do not fit are skipped.
use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

use crate::utils::never_matching_regex;

/// A single value in a header.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
  Bool(bool),
  Integer(i64),
  Decimal(f64),
  String(String),
}

impl Scalar {
  /// Whether the value counts as set: `false`, zero and the empty string do
  /// not.
  #[must_use]
  pub fn is_truthy(&self) -> bool {
    match self {
      Self::Bool(b) => *b,
      Self::Integer(n) => *n != 0,
      Self::Decimal(f) => *f != 0.0 && !f.is_nan(),
      Self::String(s) => !s.is_empty(),
    }
  }

  /// The value as display text.
  #[must_use]
  pub fn to_text(&self) -> String {
    match self {
      Self::Bool(b) => b.to_string(),
      Self::Integer(n) => n.to_string(),
      Self::Decimal(f) => f.to_string(),
      Self::String(s) => s.clone(),
    }
  }

  /// The value read as a number, if it has a numeric reading.
  #[must_use]
  #[allow(
    clippy::cast_precision_loss,
    reason = "Seeds are small integers in practice"
  )]
  pub fn to_number(&self) -> Option<f64> {
    match self {
      Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
      Self::Integer(n) => Some(*n as f64),
      Self::Decimal(f) => Some(*f),
      Self::String(s) => s.trim().parse().ok(),
    }
  }
}

/// A top-level header entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
  Scalar(Scalar),
  Section(HashMap<String, Scalar>),
}

/// Parsed header, keyed by top-level name.
pub type Frontmatter = HashMap<String, Entry>;

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([A-Za-z0-9_\-]+)\s*:\s*(.*)$").unwrap_or_else(|e| {
    log::error!("Failed to compile ENTRY_RE regex: {e}");
    never_matching_regex()
  })
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^-?\d+(\.\d+)?$").unwrap_or_else(|e| {
    log::error!("Failed to compile NUMBER_RE regex: {e}");
    never_matching_regex()
  })
});

/// Parse a header block into its entries.
#[must_use]
pub fn parse_frontmatter(text: &str) -> Frontmatter {
  let mut root = Frontmatter::new();
  let mut section: Option<String> = None;

  for raw in text.lines() {
    let line = raw.replace('\t', "  ");
    if line.trim().is_empty() {
      continue;
    }
    let indent = line.len() - line.trim_start().len();

    if indent == 0 {
      let Some(caps) = ENTRY_RE.captures(&line) else {
        continue;
      };
      let key = caps[1].to_string();
      let value = &caps[2];
      if value.is_empty() {
        root.insert(key.clone(), Entry::Section(HashMap::new()));
        section = Some(key);
      } else {
        root.insert(key, Entry::Scalar(parse_scalar(value)));
        section = None;
      }
    } else if indent >= 2
      && let Some(current) = &section
      && let Some(caps) = ENTRY_RE.captures(line.trim())
    {
      let entry = root
        .entry(current.clone())
        .or_insert_with(|| Entry::Section(HashMap::new()));
      if let Entry::Section(map) = entry {
        map.insert(caps[1].to_string(), parse_scalar(&caps[2]));
      }
    }
  }

  root
}

/// Parse a single value.
#[must_use]
pub fn parse_scalar(value: &str) -> Scalar {
  let value = value.trim();
  match value {
    "true" => return Scalar::Bool(true),
    "false" => return Scalar::Bool(false),
    _ => {},
  }

  if NUMBER_RE.is_match(value) {
    if let Ok(n) = value.parse::<i64>() {
      return Scalar::Integer(n);
    }
    if let Ok(f) = value.parse::<f64>() {
      return Scalar::Decimal(f);
    }
  }

  let value = value.strip_prefix(['\'', '"']).unwrap_or(value);
  let value = value.strip_suffix(['\'', '"']).unwrap_or(value);
  Scalar::String(value.to_string())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::panic, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn parses_sections_and_scalars() {
    let fm = parse_frontmatter(
      "title: Flow\nconfig:\n  look: classic\n  theme: 'forest'\n  handDrawnSeed: 7",
    );

    assert_eq!(
      fm.get("title"),
      Some(&Entry::Scalar(Scalar::String("Flow".into())))
    );
    let Some(Entry::Section(config)) = fm.get("config") else {
      panic!("config should be a section: {fm:?}");
    };
    assert_eq!(config.get("look"), Some(&Scalar::String("classic".into())));
    assert_eq!(config.get("theme"), Some(&Scalar::String("forest".into())));
    assert_eq!(config.get("handDrawnSeed"), Some(&Scalar::Integer(7)));
  }

  #[test]
  fn tabs_count_as_indentation() {
    let fm = parse_frontmatter("config:\n\tlook: handDrawn");
    let Some(Entry::Section(config)) = fm.get("config") else {
      panic!("config should be a section: {fm:?}");
    };
    assert_eq!(config.len(), 1);
  }

  #[test]
  fn single_space_indent_is_ignored() {
    let fm = parse_frontmatter("config:\n look: neo");
    assert_eq!(fm.get("config"), Some(&Entry::Section(HashMap::new())));
  }

  #[test]
  fn nested_lines_without_section_are_ignored() {
    let fm = parse_frontmatter("title: x\n  look: neo");
    assert_eq!(fm.len(), 1);
  }

  #[test]
  fn scalar_coercion() {
    assert_eq!(parse_scalar("true"), Scalar::Bool(true));
    assert_eq!(parse_scalar(" false "), Scalar::Bool(false));
    assert_eq!(parse_scalar("-12"), Scalar::Integer(-12));
    assert_eq!(parse_scalar("2.5"), Scalar::Decimal(2.5));
    assert_eq!(parse_scalar("\"dark\""), Scalar::String("dark".into()));
    assert_eq!(parse_scalar("1e5"), Scalar::String("1e5".into()));
    assert_eq!(parse_scalar("'half"), Scalar::String("half".into()));
  }

  #[test]
  fn truthiness() {
    assert!(!Scalar::Integer(0).is_truthy());
    assert!(!Scalar::String(String::new()).is_truthy());
    assert!(!Scalar::Bool(false).is_truthy());
    assert!(Scalar::Decimal(0.5).is_truthy());
  }
}
