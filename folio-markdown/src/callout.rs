//! Blockquote callouts selected by an emoji marker.
use serde::{Deserialize, Serialize};

/// Presentation variant of a blockquote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutVariant {
  Problem,
  Design,
  Impl,
  Result,
  Reflection,
  None,
}

impl CalloutVariant {
  /// Marked variants in priority order, with the character that selects each.
  ///
  /// Markers are matched without their variation selector, so both `⚠` and
  /// `⚠️` select [`CalloutVariant::Problem`].
  pub const MARKERS: [(char, Self); 5] = [
    ('\u{26A0}', Self::Problem),
    ('\u{1F9E9}', Self::Design),
    ('\u{2699}', Self::Impl),
    ('\u{2705}', Self::Result),
    ('\u{1F9E0}', Self::Reflection),
  ];

  /// Classify blockquote text. The first marker in priority order that
  /// appears anywhere in the text wins.
  ///
  /// # Examples
  ///
  /// ```
  /// use folio_markdown::CalloutVariant;
  ///
  /// assert_eq!(CalloutVariant::classify("✅ done ⚠️ but"), CalloutVariant::Problem);
  /// assert_eq!(CalloutVariant::classify("plain quote"), CalloutVariant::None);
  /// ```
  #[must_use]
  pub fn classify(text: &str) -> Self {
    Self::MARKERS
      .iter()
      .find(|(marker, _)| text.contains(*marker))
      .map_or(Self::None, |(_, variant)| *variant)
  }

  /// Lowercase name, as used in class names and serialized output.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Problem => "problem",
      Self::Design => "design",
      Self::Impl => "impl",
      Self::Result => "result",
      Self::Reflection => "reflection",
      Self::None => "none",
    }
  }

  /// Class attribute for a blockquote of this variant.
  #[must_use]
  pub fn class_name(self) -> String {
    match self {
      Self::None => "blockquote-neutral".to_string(),
      variant => format!("callout callout-{}", variant.as_str()),
    }
  }

  /// Markdown snippet that starts a callout of this variant in the editor.
  #[must_use]
  pub const fn snippet(self) -> &'static str {
    match self {
      Self::Problem => "> ⚠️ **Problem**\n> ",
      Self::Design => "> 🧩 **Design**\n> ",
      Self::Impl => "> ⚙️ **Implementation**\n> ",
      Self::Result => "> ✅ **Result**\n> ",
      Self::Reflection => "> 🧠 **Reflection**\n> ",
      Self::None => "> ",
    }
  }
}
