//! Wire protocol for the telemetry service
//!
//! This module provides:
//! - Inbound frame classification into envelopes
//! - Normalization of usage payloads into canonical samples
//! - Outbound query/stop command encoding

mod decode;
mod encode;
mod normalize;

pub use decode::{decode, DecodeError, Envelope};
pub use encode::{encode_query, encode_stop};
pub use normalize::normalize;
