use std::{
  fmt,
  sync::{Arc, LazyLock},
};

use regex::{Captures, Regex};
use tokio::sync::OnceCell;

use super::{
  directive::preprocess,
  engine::{DiagramEngine, DiagramError},
};
use crate::{
  types::DiagramBlock,
  utils::{escape_html, never_matching_regex},
};

/// Style merged into the root `<svg>` element of every rendered diagram.
pub const SVG_STYLE: &str =
  "max-width:100%;max-height:500px;background:transparent";

type EngineLoader =
  dyn Fn() -> Result<Arc<dyn DiagramEngine>, DiagramError> + Send + Sync;

/// Outcome of rendering one diagram block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOutput {
  Rendered {
    /// Markup with the display style applied.
    svg: String,
    /// Markup exactly as the engine returned it, for the zoom view.
    raw: String,
  },
  Failed {
    message: String,
    source:  String,
  },
  /// Not rendered yet.
  Pending,
}

impl DiagramOutput {
  /// Markup for the block's container.
  #[must_use]
  pub fn to_html(&self, slot: &str) -> String {
    let slot = escape_html(slot);
    match self {
      // The zoom view opens the engine's markup from the template, not the
      // styled copy on the page.
      Self::Rendered { svg, raw } => {
        format!(
          r#"<figure class="diagram" data-slot="{slot}" data-lightbox-kind="diagram"><div class="diagram-frame">{svg}</div><template class="diagram-source">{raw}</template></figure>"#
        )
      },
      Self::Failed { message, source } => {
        format!(
          r#"<figure class="diagram diagram-error" data-slot="{slot}"><pre class="diagram-error-message">Mermaid Error: {}
{}</pre></figure>"#,
          escape_html(message),
          escape_html(source)
        )
      },
      Self::Pending => {
        format!(
          r#"<figure class="diagram diagram-pending" data-slot="{slot}"><div class="diagram-frame"></div></figure>"#
        )
      },
    }
  }
}

/// Renders diagram blocks through a lazily loaded, shared engine.
///
/// The engine is loaded on first use. Concurrent first callers wait on the
/// same load, and clones of the renderer share the loaded engine. A failed
/// load is not cached, so the next block tries again.
#[derive(Clone)]
pub struct DiagramRenderer {
  loader: Arc<EngineLoader>,
  engine: Arc<OnceCell<Arc<dyn DiagramEngine>>>,
}

impl fmt::Debug for DiagramRenderer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DiagramRenderer")
      .field("loaded", &self.engine.initialized())
      .finish_non_exhaustive()
  }
}

impl DiagramRenderer {
  /// Create a renderer that builds its engine with `loader` on first use.
  /// The loader runs on a blocking thread.
  pub fn new<F>(loader: F) -> Self
  where
    F: Fn() -> Result<Arc<dyn DiagramEngine>, DiagramError>
      + Send
      + Sync
      + 'static,
  {
    Self {
      loader: Arc::new(loader),
      engine: Arc::new(OnceCell::new()),
    }
  }

  /// Create a renderer around an already constructed engine.
  #[must_use]
  pub fn with_engine(engine: Arc<dyn DiagramEngine>) -> Self {
    let loaded = Arc::clone(&engine);
    Self {
      loader: Arc::new(move || Ok(Arc::clone(&engine))),
      engine: Arc::new(OnceCell::new_with(Some(loaded))),
    }
  }

  /// Create a renderer whose every block fails with `reason`.
  #[must_use]
  pub fn unavailable(reason: &str) -> Self {
    let reason = reason.to_string();
    Self::new(move || Err(DiagramError::Engine(reason.clone())))
  }

  /// Create a renderer backed by a Kroki server.
  #[cfg(feature = "kroki")]
  #[must_use]
  pub fn kroki(server_url: &str, timeout: std::time::Duration) -> Self {
    let server_url = server_url.to_string();
    Self::new(move || {
      let engine: Arc<dyn DiagramEngine> =
        Arc::new(super::kroki::KrokiEngine::new(&server_url, timeout));
      Ok(engine)
    })
  }

  /// The shared engine, loading it if this is the first call.
  ///
  /// # Errors
  ///
  /// Returns an error if the loader fails or its task is cancelled.
  pub async fn engine(&self) -> Result<Arc<dyn DiagramEngine>, DiagramError> {
    let loader = Arc::clone(&self.loader);
    self
      .engine
      .get_or_try_init(|| {
        async move {
          tokio::task::spawn_blocking(move || (*loader)())
            .await
            .map_err(|e| DiagramError::Engine(e.to_string()))?
        }
      })
      .await
      .cloned()
  }

  /// Render one block. Failures are returned as [`DiagramOutput::Failed`]
  /// carrying the author's original text.
  pub async fn render(&self, block: &DiagramBlock) -> DiagramOutput {
    match self.render_svg(block).await {
      Ok(raw) => {
        DiagramOutput::Rendered {
          svg: normalize_svg(&raw),
          raw,
        }
      },
      Err(e) => {
        log::warn!("Failed to render diagram {}: {e}", block.slot);
        DiagramOutput::Failed {
          message: e.to_string(),
          source:  block.raw_text.clone(),
        }
      },
    }
  }

  async fn render_svg(&self, block: &DiagramBlock) -> Result<String, DiagramError> {
    let engine = self.engine().await?;
    let id = block.slot.clone();
    let source = preprocess(&block.raw_text);

    tokio::task::spawn_blocking(move || engine.render_svg(&id, &source))
      .await
      .map_err(|e| DiagramError::Engine(e.to_string()))?
  }
}

impl Default for DiagramRenderer {
  /// Kroki's public instance when the `kroki` feature is on, otherwise a
  /// renderer that reports every diagram as unavailable.
  fn default() -> Self {
    #[cfg(feature = "kroki")]
    {
      Self::kroki(
        super::kroki::DEFAULT_KROKI_URL,
        std::time::Duration::from_secs(10),
      )
    }
    #[cfg(not(feature = "kroki"))]
    {
      Self::unavailable("no diagram engine configured")
    }
  }
}

/// Apply [`SVG_STYLE`] to the first `<svg>` element, merging with any style
/// it already has.
#[must_use]
pub fn normalize_svg(svg: &str) -> String {
  static SVG_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<svg\b([^>]*?)(/?)>").unwrap_or_else(|e| {
      log::error!("Failed to compile SVG_OPEN_RE regex: {e}");
      never_matching_regex()
    })
  });
  static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sstyle\s*=\s*"([^"]*)""#).unwrap_or_else(|e| {
      log::error!("Failed to compile STYLE_RE regex: {e}");
      never_matching_regex()
    })
  });

  SVG_OPEN_RE
    .replacen(svg, 1, |caps: &Captures| {
      let attrs = &caps[1];
      let close = &caps[2];
      if STYLE_RE.is_match(attrs) {
        let attrs = STYLE_RE.replacen(attrs, 1, |style: &Captures| {
          let existing = style[1].trim().trim_end_matches(';');
          if existing.is_empty() {
            format!(r#" style="{SVG_STYLE}""#)
          } else {
            format!(r#" style="{existing};{SVG_STYLE}""#)
          }
        });
        format!("<svg{attrs}{close}>")
      } else {
        format!(r#"<svg{attrs} style="{SVG_STYLE}"{close}>"#)
      }
    })
    .into_owned()
}
