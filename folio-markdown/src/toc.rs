//! Table of contents extraction and the page-scoped store that publishes it.
//!
//! Extraction is a plain line scan over the raw markdown, independent of the
//! render tree, so it can run before or alongside rendering. The resulting
//! items are published into a [`TocStore`] while a page is mounted; dropping
//! the [`TocMount`] guard clears them again.
use std::sync::{
  Arc,
  LazyLock,
  atomic::{AtomicU64, Ordering},
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::utils::{never_matching_regex, slugify};

/// A heading entry in the table of contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TocItem {
  /// Heading level, 1 or 2.
  pub level: u8,
  /// Heading text, trimmed.
  pub text:  String,
  /// Anchor ID. Not unique: repeated headings share an ID.
  pub id:    String,
}

/// Extract level 1 and 2 ATX headings from raw markdown, in document order.
///
/// # Examples
///
/// ```
/// use folio_markdown::extract_toc;
///
/// let toc = extract_toc("# A\n## B\n### C\n## D");
/// let ids: Vec<_> = toc.iter().map(|i| i.id.as_str()).collect();
/// assert_eq!(ids, ["a", "b", "d"]);
/// ```
#[must_use]
pub fn extract_toc(markdown: &str) -> Vec<TocItem> {
  static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,2})\s+(.*)$").unwrap_or_else(|e| {
      log::error!("Failed to compile HEADING_RE regex: {e}");
      never_matching_regex()
    })
  });

  markdown
    .lines()
    .filter_map(|line| {
      let caps = HEADING_RE.captures(line)?;
      #[allow(
        clippy::cast_possible_truncation,
        reason = "The pattern only matches one or two hashes"
      )]
      let level = caps[1].len() as u8;
      let text = caps[2].trim().to_string();
      let id = slugify(&text);
      Some(TocItem { level, text, id })
    })
    .collect()
}

/// What the sidebar shows for the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocState {
  pub items:   Vec<TocItem>,
  /// Short page summary rendered above the item list.
  pub summary: Option<String>,
}

/// Observable holder for the current page's table of contents.
///
/// Pages publish into it through [`TocStore::mount`]; navigation views read
/// it through [`TocStore::subscribe`]. Clones share the same state.
#[derive(Debug, Clone)]
pub struct TocStore {
  sender:  Arc<watch::Sender<TocState>>,
  mounted: Arc<AtomicU64>,
}

impl Default for TocStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TocStore {
  #[must_use]
  pub fn new() -> Self {
    let (sender, _) = watch::channel(TocState::default());
    Self {
      sender:  Arc::new(sender),
      mounted: Arc::new(AtomicU64::new(0)),
    }
  }

  /// Receive the current state and every later change.
  #[must_use]
  pub fn subscribe(&self) -> watch::Receiver<TocState> {
    self.sender.subscribe()
  }

  /// Copy of the current state.
  #[must_use]
  pub fn snapshot(&self) -> TocState {
    self.sender.borrow().clone()
  }

  /// Publish a page's items. They stay visible until the returned guard is
  /// dropped or another page mounts.
  #[must_use = "dropping the guard clears the table of contents immediately"]
  pub fn mount(&self, items: Vec<TocItem>, summary: Option<String>) -> TocMount {
    let mut id = 0;
    // Ownership changes under the channel's write lock, together with the state.
    self.sender.send_modify(|state| {
      id = self.mounted.fetch_add(1, Ordering::SeqCst) + 1;
      *state = TocState { items, summary };
    });
    TocMount {
      store: self.clone(),
      id,
    }
  }
}

/// Guard tying published items to the lifetime of a mounted page.
#[derive(Debug)]
pub struct TocMount {
  store: TocStore,
  id:    u64,
}

impl Drop for TocMount {
  fn drop(&mut self) {
    let mounted = &self.store.mounted;
    self.store.sender.send_if_modified(|state| {
      // A newer mount owns the state now.
      if mounted.load(Ordering::SeqCst) != self.id {
        return false;
      }
      *state = TocState::default();
      true
    });
  }
}
