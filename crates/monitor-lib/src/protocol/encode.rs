//! Outbound command encoding
//!
//! Builds the query and stop frames sent to the telemetry service.
//! Encoding never fails; validation (non-empty text, connection state)
//! happens at the call site before the frame reaches the transport.

use crate::models::Machine;
use serde_json::json;

/// Build a query frame: `{"query": <text>, "machines": [...]}`.
pub fn encode_query(text: &str, machines: &[Machine]) -> String {
    json!({
        "query": text,
        "machines": machines,
    })
    .to_string()
}

/// Build the stop frame: `{"type": "stop"}`.
pub fn encode_stop() -> String {
    json!({"type": "stop"}).to_string()
}
