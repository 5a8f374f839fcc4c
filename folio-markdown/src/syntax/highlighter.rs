//! Asynchronous highlighting of extracted code blocks.
use std::sync::Arc;

use super::{
  clipboard::COPY_LABEL,
  types::SyntaxManager,
};
use crate::{types::CodeBlock, utils::escape_html};

/// Highlights [`CodeBlock`]s off the async executor.
///
/// A highlighter without a manager, or one that is disabled, renders every
/// block as escaped plain text.
#[derive(Debug, Clone)]
pub struct CodeHighlighter {
  manager: Option<Arc<SyntaxManager>>,
  theme:   Option<String>,
}

impl CodeHighlighter {
  /// Create a highlighter on the default backend.
  #[must_use]
  pub fn new(theme: Option<&str>) -> Self {
    let manager = match super::create_default_manager(theme) {
      Ok(manager) => Some(Arc::new(manager)),
      Err(e) => {
        log::warn!("Syntax highlighting unavailable: {e}");
        None
      },
    };
    Self {
      manager,
      theme: theme.map(str::to_string),
    }
  }

  #[must_use]
  pub fn with_manager(manager: Arc<SyntaxManager>) -> Self {
    Self {
      manager: Some(manager),
      theme:   None,
    }
  }

  /// A highlighter that only escapes.
  #[must_use]
  pub const fn disabled() -> Self {
    Self {
      manager: None,
      theme:   None,
    }
  }

  /// Highlighted, line-numbered body markup for `block`.
  ///
  /// Failures never propagate: they are logged and the escaped raw text is
  /// used instead.
  pub async fn highlight(&self, block: &CodeBlock) -> String {
    let Some(manager) = self.manager.clone() else {
      return wrap_lines(&escape_html(&block.raw_text));
    };

    let code = block.raw_text.clone();
    let language = block.language.clone();
    let theme = self.theme.clone();
    let result = tokio::task::spawn_blocking(move || {
      manager.highlight_code(&code, language.as_deref(), theme.as_deref())
    })
    .await;

    let html = match result {
      Ok(Ok(highlighted)) => highlighted.html,
      Ok(Err(e)) => {
        log::warn!("Falling back to plain text for {}: {e}", block.slot);
        escape_html(&block.raw_text)
      },
      Err(e) => {
        log::warn!("Highlight task for {} failed: {e}", block.slot);
        escape_html(&block.raw_text)
      },
    };
    wrap_lines(&html)
  }

  /// Complete markup for `block`, including toolbar and copy source.
  pub async fn render_block(&self, block: &CodeBlock) -> String {
    render_code_block(block, &self.highlight(block).await)
  }
}

impl Default for CodeHighlighter {
  fn default() -> Self {
    Self::new(None)
  }
}

/// Wrap each line of `html` in numbered spans. One trailing newline is
/// dropped first so it does not produce an empty last line.
///
/// # Examples
///
/// ```
/// use folio_markdown::syntax::wrap_lines;
///
/// assert_eq!(
///   wrap_lines("a\n"),
///   r#"<span class="line-number">1</span><span class="line-content">a</span>"#
/// );
/// ```
#[must_use]
pub fn wrap_lines(html: &str) -> String {
  let html = html.strip_suffix('\n').unwrap_or(html);
  html
    .split('\n')
    .enumerate()
    .map(|(i, line)| {
      format!(
        r#"<span class="line-number">{}</span><span class="line-content">{line}</span>"#,
        i + 1
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Code block container around already highlighted `body` markup.
///
/// The raw text travels with the block in a hidden textarea so the copy
/// button can copy it verbatim.
#[must_use]
pub fn render_code_block(block: &CodeBlock, body: &str) -> String {
  let slot = escape_html(&block.slot);
  let language = block.language.as_deref().map(escape_html);
  let label = language.as_deref().unwrap_or("text");
  let code_class = language.as_deref().map_or_else(
    || "with-line-numbers".to_string(),
    |lang| format!("language-{lang} with-line-numbers"),
  );
  let raw = escape_html(&block.raw_text);

  format!(
    r#"<div class="code-block" data-slot="{slot}"><div class="code-toolbar"><span class="code-language">{label}</span><button type="button" class="copy-button" data-copy-source="{slot}">{COPY_LABEL}</button></div><pre class="highlight"><code class="{code_class}">{body}</code></pre><textarea class="code-raw" hidden readonly>{raw}</textarea></div>"#
  )
}
