use serde::Deserialize;

use crate::form::{FormData, FormValue};

/// Form field carrying one JSON-encoded [`OrderUpdate`] per project.
pub const ORDER_FIELD: &str = "order_item";

/// New position for one project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderUpdate {
  pub id:         String,
  pub sort_order: i64,
}

/// Collect the order updates submitted by the order editor.
///
/// Entries that are not valid JSON, or lack an `id` or integer
/// `sort_order`, are logged and skipped.
#[must_use]
pub fn parse_order_updates(form: &FormData) -> Vec<OrderUpdate> {
  form
    .get_all(ORDER_FIELD)
    .filter_map(|value| {
      let FormValue::Text(raw) = value else {
        log::error!("Skipping order entry: expected text, got a file");
        return None;
      };
      match serde_json::from_str::<OrderUpdate>(raw) {
        Ok(update) if !update.id.is_empty() => Some(update),
        Ok(_) => {
          log::error!("Skipping order entry with empty id: {raw}");
          None
        },
        Err(e) => {
          log::error!("Skipping invalid order entry {raw:?}: {e}");
          None
        },
      }
    })
    .collect()
}
