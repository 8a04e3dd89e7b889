//! Core library for the usage monitoring dashboard
//!
//! This crate provides the client-side telemetry pipeline:
//! - WebSocket connection management with session reuse
//! - Wire message classification and sample normalization
//! - Bounded rolling history of resource-usage samples
//! - Agent command/response state machine
//! - Outbound query/stop command encoding

pub mod agent;
pub mod connection;
pub mod history;
pub mod models;
pub mod protocol;
pub mod session;

pub use agent::{AgentStateMachine, StopTimer, STOP_DELAY};
pub use connection::{CloseDiagnostics, ConnectionManager};
pub use history::{CpuPoint, FaultPoint, HistoryBuffer, LatestStats, RssPoint, HISTORY_CAPACITY};
pub use models::{AgentState, ConnectionStatus, Machine, MachineList, Sample};
pub use protocol::{decode, encode_query, encode_stop, normalize, DecodeError, Envelope};
pub use session::{SessionEvent, TelemetrySession};
