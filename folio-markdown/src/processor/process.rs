//! Panic isolation around processing steps.
use log::error;

use super::types::MarkdownProcessor;
use crate::types::MarkdownResult;

/// Process markdown content with error recovery.
///
/// A panic anywhere in rendering is logged and replaced by an error notice,
/// so one bad document cannot take down a whole build.
#[must_use]
pub fn process_with_recovery(
  processor: &MarkdownProcessor,
  content: &str,
) -> MarkdownResult {
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor.render(content)
  })) {
    Ok(result) => result,
    Err(panic_err) => {
      error!("Panic during markdown processing: {panic_err:?}");
      MarkdownResult {
        html:        "<div class=\"error\">Critical error processing markdown \
                      content</div>"
          .to_string(),
        toc:         Vec::new(),
        title:       None,
        code_blocks: Vec::new(),
        diagrams:    Vec::new(),
      }
    },
  }
}

/// Run `processor_fn` on `content`, returning `fallback` (or the content
/// itself when `fallback` is empty) if it panics.
pub fn process_safe<F>(content: &str, processor_fn: F, fallback: &str) -> String
where
  F: FnOnce(&str) -> String,
{
  if content.is_empty() {
    return String::new();
  }

  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor_fn(content)
  }));

  match result {
    Ok(processed_text) => processed_text,
    Err(e) => {
      if let Some(error_msg) = e.downcast_ref::<String>() {
        error!("Error processing markup: {error_msg}");
      } else if let Some(error_msg) = e.downcast_ref::<&str>() {
        error!("Error processing markup: {error_msg}");
      } else {
        error!("Unknown error occurred while processing markup");
      }

      if fallback.is_empty() {
        content.to_string()
      } else {
        fallback.to_string()
      }
    },
  }
}
