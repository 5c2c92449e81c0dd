//! Normalizing inbound triggers to an order id.

use serde_json::Value;

use stockroute_core::{OrderId, ProcessError, ProcessResult};

/// Extract the order to process from a webhook payload.
///
/// Two shapes are accepted: an event envelope whose first event's metadata
/// references the order (by id or URL), or the order object itself.
pub fn order_id_from_webhook(payload: &Value) -> ProcessResult<OrderId> {
    if let Some(events) = payload.get("events") {
        let first = events
            .as_array()
            .and_then(|list| list.first())
            .ok_or_else(|| ProcessError::bad_trigger("events list is empty"))?;
        let reference = first
            .pointer("/metadata/order")
            .ok_or_else(|| ProcessError::bad_trigger("event carries no order reference"))?;
        return parse_order_reference(reference);
    }

    match payload.get("id") {
        Some(id) => parse_order_reference(id),
        None => Err(ProcessError::bad_trigger(
            "payload carries neither events nor an order id",
        )),
    }
}

/// An order reference is either a numeric id or a URL ending in the id.
fn parse_order_reference(value: &Value) -> ProcessResult<OrderId> {
    if let Some(id) = value.as_i64() {
        return Ok(OrderId::new(id));
    }

    if let Some(text) = value.as_str() {
        let tail = text.rsplit('/').next().unwrap_or(text);
        let tail = tail.strip_suffix(".json").unwrap_or(tail);
        return tail.parse();
    }

    Err(ProcessError::bad_trigger(
        "order reference is neither an id nor a URL",
    ))
}
