//! Mermaid rendering through a Kroki server.
use std::time::Duration;

use ureq::Agent;

use super::engine::{DiagramEngine, DiagramError};

/// Public Kroki instance used when no server is configured.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// [`DiagramEngine`] that POSTs diagram text to `{server}/mermaid/svg`.
pub struct KrokiEngine {
  agent:      Agent,
  server_url: String,
}

impl KrokiEngine {
  /// Create an engine for `server_url` with a per-request timeout.
  #[must_use]
  pub fn new(server_url: &str, timeout: Duration) -> Self {
    let agent = Agent::config_builder()
      .timeout_global(Some(timeout))
      .http_status_as_error(false)
      .build()
      .into();

    Self {
      agent,
      server_url: server_url.trim_end_matches('/').to_string(),
    }
  }
}

impl DiagramEngine for KrokiEngine {
  fn name(&self) -> &'static str {
    "Kroki"
  }

  fn render_svg(&self, id: &str, source: &str) -> Result<String, DiagramError> {
    let url = format!("{}/mermaid/svg", self.server_url);
    log::debug!("Rendering diagram {id} via {url}");

    let response = self
      .agent
      .post(&url)
      .header("Content-Type", "text/plain")
      .send(source.as_bytes())
      .map_err(|e| DiagramError::Http(e.to_string()))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    // Kroki answers 400 with the parser's message as plain text.
    if status >= 400 {
      let message = body
        .read_to_string()
        .unwrap_or_else(|_| format!("HTTP {status}"));
      return Err(if status < 500 {
        DiagramError::Render(message.trim().to_string())
      } else {
        DiagramError::Http(format!("HTTP {status}: {}", message.trim()))
      });
    }

    body
      .read_to_string()
      .map_err(|e| DiagramError::Io(e.to_string()))
  }
}
