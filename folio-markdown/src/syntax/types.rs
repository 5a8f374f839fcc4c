//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};

/// Trait for syntax highlighting backends.
///
/// Allows different syntax highlighting implementations to be used
/// interchangeably behind a [`SyntaxManager`].
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Get a list of available themes
  fn available_themes(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Check if a theme is available
  fn has_theme(&self, theme: &str) -> bool {
    self
      .available_themes()
      .iter()
      .any(|t| t.eq_ignore_ascii_case(theme))
  }

  /// Highlight code with the specified language and theme.
  ///
  /// The output is a sequence of inline-styled spans with one source line
  /// per output line and no surrounding `<pre>`, so callers can number the
  /// lines themselves.
  ///
  /// # Errors
  ///
  /// Returns an error if the backend fails while highlighting.
  fn highlight(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<String>;

  /// Guess the language of untagged code, e.g. from a shebang line.
  fn detect_language(&self, code: &str) -> Option<String>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Default theme to use when none is specified
  pub default_theme: Option<String>,

  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to guess the language of untagged or unknown blocks
  pub auto_detect: bool,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let language_aliases = [
      ("js", "javascript"),
      ("jsx", "javascript"),
      ("ts", "typescript"),
      ("tsx", "typescript"),
      ("py", "python"),
      ("rb", "ruby"),
      ("sh", "bash"),
      ("shell", "bash"),
      ("zsh", "bash"),
      ("yml", "yaml"),
      ("md", "markdown"),
      ("kt", "kotlin"),
    ]
    .into_iter()
    .map(|(alias, name)| (alias.to_string(), name.to_string()))
    .collect();

    Self {
      default_theme: None,
      language_aliases,
      auto_detect: true,
    }
  }
}

/// Highlighted code and the language it was highlighted as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
  pub html:     String,
  pub language: String,
}

/// High-level syntax highlighting manager.
///
/// Manages a syntax highlighting backend and provides a convenient
/// interface for highlighting code with configuration options.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl std::fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("highlighter", &self.highlighter.name())
      .field("config", &self.config)
      .finish()
  }
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  /// Get the underlying highlighter
  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Get the configuration
  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let language = language.to_lowercase();
    self
      .config
      .language_aliases
      .get(&language)
      .cloned()
      .unwrap_or(language)
  }

  /// Highlight code, resolving aliases and falling back to detection when
  /// the tag is missing or unknown.
  ///
  /// # Errors
  ///
  /// Returns an error if no language could be settled on or the backend
  /// fails.
  pub fn highlight_code(
    &self,
    code: &str,
    language: Option<&str>,
    theme: Option<&str>,
  ) -> SyntaxResult<Highlighted> {
    let theme = theme.or(self.config.default_theme.as_deref());
    let requested = language
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .map(|l| self.resolve_language(l));

    if let Some(language) = &requested
      && self.highlighter.supports_language(language)
    {
      let html = self.highlighter.highlight(code, language, theme)?;
      return Ok(Highlighted {
        html,
        language: language.clone(),
      });
    }

    if self.config.auto_detect
      && let Some(language) = self.highlighter.detect_language(code)
    {
      log::debug!("Detected language '{language}' for code block");
      let html = self.highlighter.highlight(code, &language, theme)?;
      return Ok(Highlighted { html, language });
    }

    Err(requested.map_or(SyntaxError::DetectionFailed, |language| {
      SyntaxError::UnsupportedLanguage(language)
    }))
  }
}
