//! Inbound frame classification
//!
//! Raw text frames are parsed and classified by shape, in precedence order:
//! error envelope, tagged usage envelope, batch envelope (first entry only),
//! then bare legacy payload for backward wire compatibility. Parse failures
//! are returned as typed errors so the caller can log, count, or ignore them.

use serde_json::Value;
use thiserror::Error;

/// A classified, partially-parsed inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Service-reported error; the detail is diagnostic only
    Error(Value),
    /// Usage payload awaiting normalization
    Usage { data: Value, ts: Option<f64> },
}

/// Reasons an inbound frame is dropped without affecting state
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("batch envelope carries no entries")]
    EmptyBatch,
}

/// Classify a raw inbound frame.
pub fn decode(raw: &str) -> Result<Envelope, DecodeError> {
    let payload: Value = serde_json::from_str(raw)?;
    let object = payload.as_object().ok_or(DecodeError::NotAnObject)?;

    // Error field wins over everything else in the frame.
    if let Some(detail) = object.get("error") {
        return Ok(Envelope::Error(detail.clone()));
    }

    let ts = object.get("ts").and_then(Value::as_f64);

    match object.get("type").and_then(Value::as_str) {
        Some("usage") if object.contains_key("data") => Ok(Envelope::Usage {
            data: object["data"].clone(),
            ts,
        }),
        Some("batch") if object.get("data").map_or(false, Value::is_object) => {
            // Only the first entry in wire order is surfaced; the rest of
            // the batch is discarded (known limitation, kept on purpose).
            let entries = object["data"].as_object();
            match entries.and_then(|m| m.values().next()) {
                Some(entry) => Ok(Envelope::Usage {
                    data: entry.clone(),
                    ts,
                }),
                None => Err(DecodeError::EmptyBatch),
            }
        }
        // Bare legacy payload: fields already carry the canonical sec/usec
        // split, so the whole object is the usage data.
        _ => Ok(Envelope::Usage { data: payload, ts }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_frame_is_error() {
        assert!(matches!(
            decode("{not json"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(decode("[1, 2, 3]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(decode("42"), Err(DecodeError::NotAnObject)));
    }

    #[test]
    fn test_error_field_takes_precedence() {
        let raw = json!({"error": "no_tool", "type": "usage", "data": {}}).to_string();
        match decode(&raw).unwrap() {
            Envelope::Error(detail) => assert_eq!(detail, json!("no_tool")),
            other => panic!("expected error envelope, got {:?}", other),
        }
    }

    #[test]
    fn test_usage_envelope() {
        let raw = json!({
            "type": "usage",
            "data": {"user_time": 1.5, "sys_time": 0.25},
            "ts": 1000
        })
        .to_string();

        match decode(&raw).unwrap() {
            Envelope::Usage { data, ts } => {
                assert_eq!(ts, Some(1000.0));
                assert_eq!(data["user_time"], json!(1.5));
            }
            other => panic!("expected usage envelope, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_surfaces_first_entry_only() {
        // Keys deliberately out of lexical order to prove wire order wins.
        let raw = r#"{"type":"batch","data":{"zeta":{"user_time":9.0},"alpha":{"user_time":1.0}},"ts":5}"#;

        match decode(raw).unwrap() {
            Envelope::Usage { data, ts } => {
                assert_eq!(data["user_time"], 9.0);
                assert_eq!(ts, Some(5.0));
            }
            other => panic!("expected usage envelope, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch_is_dropped() {
        let raw = json!({"type": "batch", "data": {}, "ts": 5}).to_string();
        assert!(matches!(decode(&raw), Err(DecodeError::EmptyBatch)));
    }

    #[test]
    fn test_legacy_payload_passes_through_whole() {
        let raw = json!({
            "ru_utime": {"tv_sec": 2, "tv_usec": 100},
            "ru_stime": {"tv_sec": 0, "tv_usec": 50},
            "ru_maxrss": 4096,
            "ru_minflt": 12,
            "ru_majflt": 0,
            "ts": 77.5
        })
        .to_string();

        match decode(&raw).unwrap() {
            Envelope::Usage { data, ts } => {
                assert_eq!(ts, Some(77.5));
                assert_eq!(data["ru_maxrss"], 4096);
            }
            other => panic!("expected usage envelope, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tagged_frame_falls_back_to_legacy() {
        // "processes" frames and the like carry no usage fields; they decode
        // as legacy usage and normalize to all-zero samples downstream.
        let raw = json!({"type": "stopped"}).to_string();
        assert!(matches!(decode(&raw), Ok(Envelope::Usage { .. })));
    }
}
