//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! Uses Sublime Text syntax definitions (TextMate grammars) extended with
//! the two-face syntax and theme sets.

use std::sync::{LazyLock, OnceLock};

use syntect::{
  easy::HighlightLines,
  highlighting::Theme,
  html::{IncludeBackground, styled_line_to_highlighted_html},
  parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet},
  util::LinesWithEndings,
};
use two_face::{
  re_exports::syntect::highlighting::ThemeSet,
  theme::{EmbeddedLazyThemeSet, EmbeddedThemeName},
};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

/// Theme used when nothing else is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Themes bundled by two-face, by the names configuration files use.
const EMBEDDED_THEMES: [(&str, EmbeddedThemeName); 29] = [
  ("Ansi", EmbeddedThemeName::Ansi),
  ("Base16", EmbeddedThemeName::Base16),
  ("Base16EightiesDark", EmbeddedThemeName::Base16EightiesDark),
  ("Base16MochaDark", EmbeddedThemeName::Base16MochaDark),
  ("Base16OceanDark", EmbeddedThemeName::Base16OceanDark),
  ("Base16OceanLight", EmbeddedThemeName::Base16OceanLight),
  ("Base16_256", EmbeddedThemeName::Base16_256),
  ("ColdarkCold", EmbeddedThemeName::ColdarkCold),
  ("ColdarkDark", EmbeddedThemeName::ColdarkDark),
  ("DarkNeon", EmbeddedThemeName::DarkNeon),
  ("Dracula", EmbeddedThemeName::Dracula),
  ("Github", EmbeddedThemeName::Github),
  ("GruvboxDark", EmbeddedThemeName::GruvboxDark),
  ("GruvboxLight", EmbeddedThemeName::GruvboxLight),
  ("InspiredGithub", EmbeddedThemeName::InspiredGithub),
  ("Leet", EmbeddedThemeName::Leet),
  ("MonokaiExtended", EmbeddedThemeName::MonokaiExtended),
  ("MonokaiExtendedBright", EmbeddedThemeName::MonokaiExtendedBright),
  ("MonokaiExtendedLight", EmbeddedThemeName::MonokaiExtendedLight),
  ("MonokaiExtendedOrigin", EmbeddedThemeName::MonokaiExtendedOrigin),
  ("Nord", EmbeddedThemeName::Nord),
  ("OneHalfDark", EmbeddedThemeName::OneHalfDark),
  ("OneHalfLight", EmbeddedThemeName::OneHalfLight),
  ("SolarizedDark", EmbeddedThemeName::SolarizedDark),
  ("SolarizedLight", EmbeddedThemeName::SolarizedLight),
  ("SublimeSnazzy", EmbeddedThemeName::SublimeSnazzy),
  ("TwoDark", EmbeddedThemeName::TwoDark),
  ("VisualStudioDarkPlus", EmbeddedThemeName::VisualStudioDarkPlus),
  ("Zenburn", EmbeddedThemeName::Zenburn),
];

/// Languages tried, in tie-breaking order, when an untagged block has no
/// recognizable first line.
const DETECTION_CANDIDATES: [&str; 7] =
  ["py", "rs", "js", "sql", "sh", "json", "yaml"];

/// Share of non-whitespace text that must land in a scored scope for a
/// candidate to be accepted.
const DETECTION_THRESHOLD: f64 = 0.3;

/// Only the head of a block is scored.
const DETECTION_MAX_LINES: usize = 40;

/// Scopes that count as evidence for a language. Strings and comments are
/// left out since prose lands in them under most grammars.
static SCORED_SCOPES: LazyLock<Vec<Scope>> = LazyLock::new(|| {
  ["keyword", "storage", "entity.name", "support", "constant"]
    .iter()
    .filter_map(|name| Scope::new(name).ok())
    .collect()
});

/// Syntect-based syntax highlighter
pub struct SyntectHighlighter {
  theme_name: String,
}

impl SyntectHighlighter {
  /// Create a new Syntect highlighter with the specified theme.
  #[must_use]
  pub fn new(theme_name: Option<String>) -> Self {
    Self {
      theme_name: theme_name.unwrap_or_else(|| DEFAULT_THEME.to_string()),
    }
  }

  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }

  fn theme_set() -> &'static EmbeddedLazyThemeSet {
    static THEME_SET: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(two_face::theme::extra)
  }

  fn default_theme_set() -> &'static ThemeSet {
    static DEFAULT_THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    DEFAULT_THEME_SET.get_or_init(ThemeSet::load_defaults)
  }

  /// Look a theme up by name, falling back to [`DEFAULT_THEME`].
  fn get_theme(&self, theme_name: Option<&str>) -> &'static Theme {
    let name = theme_name
      .filter(|name| !name.is_empty())
      .or_else(|| Some(self.theme_name.as_str()).filter(|n| !n.is_empty()))
      .unwrap_or(DEFAULT_THEME);

    let default_theme_set = Self::default_theme_set();
    if let Some(theme) = default_theme_set.themes.get(name) {
      return theme;
    }

    if let Some((_, embedded)) = EMBEDDED_THEMES
      .iter()
      .find(|(embedded_name, _)| *embedded_name == name)
    {
      return Self::theme_set().get(*embedded);
    }

    log::debug!("Unknown highlight theme '{name}', using {DEFAULT_THEME}");
    default_theme_set
      .themes
      .get(DEFAULT_THEME)
      .unwrap_or_else(|| {
        Self::theme_set().get(EmbeddedThemeName::InspiredGithub)
      })
  }
}

impl Default for SyntectHighlighter {
  fn default() -> Self {
    Self::new(None)
  }
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    Self::syntax_set()
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn available_themes(&self) -> Vec<String> {
    let mut themes: Vec<String> =
      Self::default_theme_set().themes.keys().cloned().collect();
    themes.extend(EMBEDDED_THEMES.iter().map(|(name, _)| (*name).to_string()));
    themes.sort();
    themes.dedup();
    themes
  }

  fn supports_language(&self, language: &str) -> bool {
    Self::syntax_set().find_syntax_by_token(language).is_some()
  }

  fn highlight(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<String> {
    let syntax_set = Self::syntax_set();
    let syntax = syntax_set
      .find_syntax_by_token(language)
      .ok_or_else(|| SyntaxError::UnsupportedLanguage(language.to_string()))?;
    let mut highlighter = HighlightLines::new(syntax, self.get_theme(theme));

    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
      let regions = highlighter
        .highlight_line(line, syntax_set)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
      // Line breaks stay outside the spans so output lines match input lines.
      let regions: Vec<_> = regions
        .into_iter()
        .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
        .collect();
      let html = styled_line_to_highlighted_html(&regions, IncludeBackground::No)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
      lines.push(html);
    }

    Ok(lines.join("\n"))
  }

  /// First-line detection (shebangs, prologues), then the candidate whose
  /// grammar scopes the largest share of the text.
  fn detect_language(&self, code: &str) -> Option<String> {
    let syntax_set = Self::syntax_set();
    let first_line = code.lines().next()?;
    let plain_text = &syntax_set.find_syntax_plain_text().name;
    if let Some(syntax) = syntax_set
      .find_syntax_by_first_line(first_line)
      .filter(|syntax| &syntax.name != plain_text)
    {
      return Some(syntax.name.to_lowercase());
    }

    let mut best: Option<(&SyntaxReference, f64)> = None;
    for token in DETECTION_CANDIDATES {
      let Some(syntax) = syntax_set.find_syntax_by_token(token) else {
        continue;
      };
      let Some(score) = score_syntax(code, syntax, syntax_set) else {
        continue;
      };
      log::trace!("Detection score for {}: {score:.2}", syntax.name);
      if score >= DETECTION_THRESHOLD
        && best.is_none_or(|(_, best_score)| score > best_score)
      {
        best = Some((syntax, score));
      }
    }
    best.map(|(syntax, _)| syntax.name.to_lowercase())
  }
}

/// Share of the non-whitespace characters of `code` that `syntax` places in
/// a [`SCORED_SCOPES`] scope. `None` if the grammar fails on the text.
fn score_syntax(
  code: &str,
  syntax: &SyntaxReference,
  syntax_set: &SyntaxSet,
) -> Option<f64> {
  let mut state = ParseState::new(syntax);
  let mut stack = ScopeStack::new();
  let mut total = 0usize;
  let mut scored = 0usize;

  for line in LinesWithEndings::from(code).take(DETECTION_MAX_LINES) {
    let ops = state.parse_line(line, syntax_set).ok()?;
    let mut start = 0;
    for (end, op) in ops {
      let text = line.get(start..end).unwrap_or_default();
      scored += scored_chars(text, &stack);
      total += visible_chars(text);
      stack.apply(&op).ok()?;
      start = end;
    }
    let rest = line.get(start..).unwrap_or_default();
    scored += scored_chars(rest, &stack);
    total += visible_chars(rest);
  }

  (total > 0).then(|| share(scored, total))
}

#[allow(
  clippy::cast_precision_loss,
  reason = "Character counts of a code block are far below 2^52"
)]
fn share(part: usize, whole: usize) -> f64 {
  part as f64 / whole as f64
}

fn visible_chars(text: &str) -> usize {
  text.chars().filter(|c| !c.is_whitespace()).count()
}

fn scored_chars(text: &str, stack: &ScopeStack) -> usize {
  let in_scored_scope = stack.as_slice().iter().any(|scope| {
    SCORED_SCOPES
      .iter()
      .any(|prefix| prefix.is_prefix_of(*scope))
  });
  if in_scored_scope {
    visible_chars(text)
  } else {
    0
  }
}

/// Create a Syntect-based syntax manager using `theme` by default.
///
/// # Errors
///
/// Currently infallible; the `Result` leaves room for backends whose
/// initialization can fail.
pub fn create_syntect_manager(
  theme: Option<&str>,
) -> SyntaxResult<SyntaxManager> {
  let theme = theme.unwrap_or(DEFAULT_THEME).to_string();
  let highlighter = Box::new(SyntectHighlighter::new(Some(theme.clone())));
  let config = SyntaxConfig {
    default_theme: Some(theme),
    ..SyntaxConfig::default()
  };
  Ok(SyntaxManager::new(highlighter, config))
}
