//! Zoom viewer for images and diagrams.
//!
//! [`Lightbox`] is a small state machine: it is either closed or open with a
//! single piece of content. Opening while already open replaces the content.
//! The light/dark theme of the viewer is tracked separately and survives
//! open/close cycles for as long as the controller lives.
use serde::{Deserialize, Serialize};

use crate::utils::escape_html;

/// Name of the page event other components dispatch to open the shared
/// lightbox with an image.
pub const EXTERNAL_OPEN_EVENT: &str = "open-lightbox-external";

/// What the lightbox is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LightboxContent {
  Image { url: String, alt: Option<String> },
  Svg { markup: String },
}

/// Background theme of the open viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightboxTheme {
  #[default]
  Light,
  Dark,
}

impl LightboxTheme {
  #[must_use]
  pub const fn toggled(self) -> Self {
    match self {
      Self::Light => Self::Dark,
      Self::Dark => Self::Light,
    }
  }

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Light => "light",
      Self::Dark => "dark",
    }
  }
}

/// Payload of an [`EXTERNAL_OPEN_EVENT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalOpen {
  pub src: String,
}

impl ExternalOpen {
  /// Parse the JSON event detail, e.g. `{"src": "/cover.png"}`.
  ///
  /// # Errors
  ///
  /// Returns an error if the detail is not an object with a string `src`.
  pub fn from_detail(detail: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(detail)
  }
}

/// A key press delivered to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
  Escape,
  Char(char),
  Other,
}

impl Key {
  /// Map a DOM `KeyboardEvent.key` value.
  #[must_use]
  pub fn from_dom(key: &str) -> Self {
    if key == "Escape" || key == "Esc" {
      return Self::Escape;
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) => Self::Char(c),
      _ => Self::Other,
    }
  }
}

/// Inputs the viewer reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightboxEvent {
  ImageClicked { url: String, alt: Option<String> },
  DiagramClicked { markup: String },
  External(ExternalOpen),
  KeyPressed(Key),
  CloseClicked,
  BackdropClicked,
  ThemeToggled,
}

/// The viewer's open/closed state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LightboxState {
  #[default]
  Closed,
  Open(LightboxContent),
}

/// Lightbox controller for one page visit.
#[derive(Debug, Clone, Default)]
pub struct Lightbox {
  state: LightboxState,
  theme: LightboxTheme,
}

impl Lightbox {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub const fn state(&self) -> &LightboxState {
    &self.state
  }

  #[must_use]
  pub const fn content(&self) -> Option<&LightboxContent> {
    match &self.state {
      LightboxState::Open(content) => Some(content),
      LightboxState::Closed => None,
    }
  }

  #[must_use]
  pub const fn is_open(&self) -> bool {
    matches!(self.state, LightboxState::Open(_))
  }

  #[must_use]
  pub const fn theme(&self) -> LightboxTheme {
    self.theme
  }

  /// Show `content`, replacing whatever is currently shown.
  pub fn open(&mut self, content: LightboxContent) {
    self.state = LightboxState::Open(content);
  }

  pub fn close(&mut self) {
    self.state = LightboxState::Closed;
  }

  pub const fn toggle_theme(&mut self) {
    self.theme = self.theme.toggled();
  }

  /// Apply an event. Returns whether anything changed.
  pub fn handle(&mut self, event: LightboxEvent) -> bool {
    match event {
      LightboxEvent::ImageClicked { url, alt } => {
        self.open(LightboxContent::Image { url, alt });
        true
      },
      LightboxEvent::DiagramClicked { markup } => {
        self.open(LightboxContent::Svg { markup });
        true
      },
      LightboxEvent::External(ExternalOpen { src }) => {
        self.open(LightboxContent::Image {
          url: src,
          alt: None,
        });
        true
      },
      LightboxEvent::KeyPressed(Key::Escape)
      | LightboxEvent::CloseClicked
      | LightboxEvent::BackdropClicked => {
        let was_open = self.is_open();
        self.close();
        was_open
      },
      LightboxEvent::KeyPressed(Key::Char('t' | 'T')) if self.is_open() => {
        self.toggle_theme();
        true
      },
      LightboxEvent::ThemeToggled => {
        self.toggle_theme();
        true
      },
      LightboxEvent::KeyPressed(_) => false,
    }
  }

  /// Markup for the viewer in its current state. A closed viewer renders as
  /// a hidden, empty dialog that scripts can fill in later.
  #[must_use]
  pub fn render_html(&self) -> String {
    let theme = self.theme.as_str();
    let (hidden, body) = match &self.state {
      LightboxState::Closed => (" hidden", String::new()),
      LightboxState::Open(LightboxContent::Image { url, alt }) => {
        (
          "",
          format!(
            r#"<img class="lightbox-image" src="{}" alt="{}">"#,
            escape_html(url),
            escape_html(alt.as_deref().unwrap_or_default())
          ),
        )
      },
      LightboxState::Open(LightboxContent::Svg { markup }) => {
        ("", format!(r#"<div class="lightbox-svg">{markup}</div>"#))
      },
    };

    format!(
      r#"<div class="lightbox lightbox-{theme}" role="dialog" aria-modal="true" data-lightbox-theme="{theme}"{hidden}><div class="lightbox-backdrop" data-lightbox-close></div><div class="lightbox-toolbar"><button type="button" class="lightbox-theme-toggle" aria-label="Toggle background">◐</button><button type="button" class="lightbox-close" aria-label="Close" data-lightbox-close>×</button></div><div class="lightbox-content">{body}</div></div>"#
    )
  }
}
