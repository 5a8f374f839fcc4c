//! Copy-to-clipboard control for code blocks.
use std::{
  sync::{
    Arc,
    Mutex,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use tokio::sync::watch;

/// How long the button shows its confirmation after a successful copy.
pub const COPY_CONFIRMATION: Duration = Duration::from_millis(1500);

/// Button text at rest.
pub const COPY_LABEL: &str = "Copy";

/// Button text while confirming a copy.
pub const COPIED_LABEL: &str = "Copied!";

/// Errors reported by a [`Clipboard`].
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
  #[error("Clipboard unavailable: {0}")]
  Unavailable(String),
  #[error("Clipboard write rejected: {0}")]
  Rejected(String),
}

/// Somewhere text can be copied to.
pub trait Clipboard: Send + Sync {
  /// Replace the clipboard contents with `text`.
  ///
  /// # Errors
  ///
  /// Returns an error if the clipboard cannot be written.
  fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard, for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
  contents: Mutex<Option<String>>,
  reject:   bool,
}

impl MemoryClipboard {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// A clipboard that refuses every write.
  #[must_use]
  pub fn rejecting() -> Self {
    Self {
      contents: Mutex::new(None),
      reject:   true,
    }
  }

  #[must_use]
  pub fn contents(&self) -> Option<String> {
    self
      .contents
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
      .clone()
  }
}

impl Clipboard for MemoryClipboard {
  fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
    if self.reject {
      return Err(ClipboardError::Rejected("permission denied".to_string()));
    }
    *self
      .contents
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(text.to_string());
    Ok(())
  }
}

/// The copy button of one code block.
///
/// Copies the block's original text, not its highlighted markup. After a
/// successful copy the button reports `copied` for [`COPY_CONFIRMATION`];
/// pressing again restarts the timer.
#[derive(Debug, Clone)]
pub struct CopyButton {
  raw:     Arc<str>,
  copied:  Arc<watch::Sender<bool>>,
  presses: Arc<AtomicU64>,
}

impl CopyButton {
  #[must_use]
  pub fn new(raw_text: &str) -> Self {
    let (copied, _) = watch::channel(false);
    Self {
      raw:     Arc::from(raw_text),
      copied:  Arc::new(copied),
      presses: Arc::new(AtomicU64::new(0)),
    }
  }

  /// Copy the text. Returns whether the clipboard accepted it; on failure
  /// the error is logged and no confirmation is shown.
  pub async fn copy(&self, clipboard: &dyn Clipboard) -> bool {
    if let Err(e) = clipboard.write_text(&self.raw) {
      log::warn!("Failed to copy code block: {e}");
      return false;
    }

    let press = self.presses.fetch_add(1, Ordering::SeqCst) + 1;
    self.copied.send_replace(true);

    let copied = Arc::clone(&self.copied);
    let presses = Arc::clone(&self.presses);
    tokio::spawn(async move {
      tokio::time::sleep(COPY_CONFIRMATION).await;
      if presses.load(Ordering::SeqCst) == press {
        copied.send_replace(false);
      }
    });
    true
  }

  #[must_use]
  pub fn is_copied(&self) -> bool {
    *self.copied.borrow()
  }

  #[must_use]
  pub fn label(&self) -> &'static str {
    if self.is_copied() { COPIED_LABEL } else { COPY_LABEL }
  }

  /// Follow the `copied` state.
  #[must_use]
  pub fn subscribe(&self) -> watch::Receiver<bool> {
    self.copied.subscribe()
  }
}
