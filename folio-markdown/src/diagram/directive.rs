//! Init directive injection for Mermaid diagram text.
//!
//! Every diagram is drawn in the hand-drawn look unless its author asked for
//! something else in a frontmatter `config` section.
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::frontmatter::{Entry, Frontmatter, Scalar, parse_frontmatter};
use crate::utils::never_matching_regex;

/// Directive prepended when the text carries no usable configuration.
pub const DEFAULT_DIRECTIVE: &str =
  "%%{init: {\"look\":\"handDrawn\",\"handDrawnSeed\":1}}%%\n";

const DEFAULT_LOOK: &str = "handDrawn";

/// The JSON body of a synthesized `%%{init: ...}%%` line. Field order is the
/// order keys appear in the output.
#[derive(Debug, Serialize)]
struct InitDirective {
  look: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  theme: Option<String>,
  #[serde(rename = "handDrawnSeed")]
  hand_drawn_seed: serde_json::Number,
}

impl InitDirective {
  fn from_frontmatter(frontmatter: &Frontmatter) -> Self {
    let config = match frontmatter.get("config") {
      Some(Entry::Section(config)) => Some(config),
      _ => None,
    };
    let get = |key: &str| {
      config
        .and_then(|c| c.get(key))
        .filter(|value| value.is_truthy())
    };

    Self {
      look:            get("look")
        .map_or_else(|| DEFAULT_LOOK.to_string(), Scalar::to_text),
      theme:           get("theme").map(Scalar::to_text),
      hand_drawn_seed: seed_number(get("handDrawnSeed")),
    }
  }
}

/// Seed as a JSON number. Zero, NaN and anything non-numeric become 1, and
/// whole floats are written without a fraction.
#[allow(
  clippy::cast_possible_truncation,
  reason = "Only whole values within i64 range take the integer path"
)]
fn seed_number(value: Option<&Scalar>) -> serde_json::Number {
  let seed = value
    .and_then(Scalar::to_number)
    .filter(|n| *n != 0.0 && n.is_finite())
    .unwrap_or(1.0);

  if seed.fract() == 0.0 && seed.abs() < 9.0e15 {
    serde_json::Number::from(seed as i64)
  } else {
    serde_json::Number::from_f64(seed).unwrap_or_else(|| 1.into())
  }
}

static HAND_DRAWN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"%%\{\s*init:[^}]*"look"\s*:\s*"handDrawn""#).unwrap_or_else(
    |e| {
      log::error!("Failed to compile HAND_DRAWN_RE regex: {e}");
      never_matching_regex()
    },
  )
});

/// Inject an init directive into diagram text.
///
/// Rules, first match wins:
///
/// 1. Text already asking for the hand-drawn look is returned unchanged, so
///    the function is idempotent.
/// 2. Text starting with a different init directive gets the default
///    directive prepended; both stay.
/// 3. Text starting with a `---` frontmatter block has the block replaced by
///    a directive built from its `config` section.
/// 4. Anything else gets the default directive prepended.
///
/// # Examples
///
/// ```
/// use folio_markdown::diagram::preprocess;
///
/// let once = preprocess("graph TD; A-->B");
/// assert!(once.starts_with("%%{init:"));
/// assert_eq!(preprocess(&once), once);
/// ```
#[must_use]
pub fn preprocess(source: &str) -> String {
  if HAND_DRAWN_RE.is_match(source) {
    return source.to_string();
  }

  let text = source.trim_start();

  if text.starts_with("%%{") && text.contains("}%%") {
    return format!("{DEFAULT_DIRECTIVE}{source}");
  }

  if let Some(after_open) = text.strip_prefix("---")
    && let Some(close) = after_open.find("---")
  {
    let header = after_open[..close].trim();
    let body = after_open[close + 3..].trim_start();
    let directive = InitDirective::from_frontmatter(&parse_frontmatter(header));

    return match serde_json::to_string(&directive) {
      Ok(json) => format!("%%{{init: {json}}}%%\n{body}"),
      Err(e) => {
        log::error!("Failed to serialize diagram init directive: {e}");
        format!("{DEFAULT_DIRECTIVE}{body}")
      },
    };
  }

  format!("{DEFAULT_DIRECTIVE}{source}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_text_gets_default_directive() {
    assert_eq!(
      preprocess("graph TD; A-->B"),
      format!("{DEFAULT_DIRECTIVE}graph TD; A-->B")
    );
  }

  #[test]
  fn existing_hand_drawn_directive_is_kept() {
    let src = "%%{init: {\"look\": \"handDrawn\"}}%%\nflowchart LR";
    assert_eq!(preprocess(src), src);
  }

  #[test]
  fn other_directive_gets_default_prepended() {
    let src = "%%{init: {\"theme\":\"dark\"}}%%\nflowchart LR";
    let out = preprocess(src);
    assert!(out.starts_with(DEFAULT_DIRECTIVE));
    assert!(out.ends_with(src));
  }

  #[test]
  fn frontmatter_becomes_directive() {
    let src = "---\nconfig:\n  look: classic\n  theme: forest\n  \
               handDrawnSeed: 3\n---\nflowchart LR\n  A --> B";
    assert_eq!(
      preprocess(src),
      "%%{init: {\"look\":\"classic\",\"theme\":\"forest\",\"handDrawnSeed\":3}}%%\nflowchart LR\n  A --> B"
    );
  }

  #[test]
  fn frontmatter_without_config_uses_defaults() {
    let src = "---\ntitle: Flow\n---\nsequenceDiagram";
    assert_eq!(
      preprocess(src),
      "%%{init: {\"look\":\"handDrawn\",\"handDrawnSeed\":1}}%%\nsequenceDiagram"
    );
  }

  #[test]
  fn zero_seed_falls_back_to_one() {
    let src = "---\nconfig:\n  handDrawnSeed: 0\n---\ngraph TD";
    assert!(preprocess(src).contains("\"handDrawnSeed\":1}"));
  }

  #[test]
  fn decimal_seed_is_kept() {
    let src = "---\nconfig:\n  handDrawnSeed: 2.5\n---\ngraph TD";
    assert!(preprocess(src).contains("\"handDrawnSeed\":2.5}"));
  }

  #[test]
  fn output_is_idempotent() {
    for src in [
      "graph TD",
      "---\nconfig:\n  theme: dark\n---\ngraph TD",
      "%%{init: {\"theme\":\"dark\"}}%%\ngraph TD",
    ] {
      let once = preprocess(src);
      assert_eq!(preprocess(&once), once, "not idempotent for {src:?}");
    }
  }

  #[test]
  fn unterminated_frontmatter_is_left_in_body() {
    let src = "---\nconfig:\n  look: neo\ngraph TD";
    assert_eq!(preprocess(src), format!("{DEFAULT_DIRECTIVE}{src}"));
  }
}
