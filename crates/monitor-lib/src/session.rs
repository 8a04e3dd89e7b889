//! Telemetry session
//!
//! `TelemetrySession` is the single owned context for one telemetry
//! connection. It holds the connection manager, sample history, agent state
//! machine, and machine list, and processes inbound frames strictly in
//! arrival order: each decode -> normalize -> append -> transition sequence
//! completes before the next frame is handled, so no locking is needed.

use crate::agent::{AgentStateMachine, StopTimer, STOP_DELAY};
use crate::connection::ConnectionManager;
use crate::history::HistoryBuffer;
use crate::models::{AgentState, ConnectionStatus, MachineList};
use crate::protocol::{decode, encode_query, encode_stop, normalize, Envelope};
use anyhow::Result;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Outcome of one processed session event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A usage sample was appended to the history
    Sample,
    /// The service reported an error; agent state is now `Error`
    ServiceError,
    /// A malformed frame was discarded
    Dropped,
    /// The stop delay elapsed; agent state is now `Stopped`
    Stopped,
    /// The transport has ended; no further frames will arrive
    Disconnected,
}

/// Owned session context for one telemetry connection
pub struct TelemetrySession {
    connection: ConnectionManager,
    history: HistoryBuffer,
    agent: AgentStateMachine,
    machines: MachineList,
    stop_deadline: Option<(StopTimer, Instant)>,
    dropped_frames: u64,
}

fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl Default for TelemetrySession {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySession {
    pub fn new() -> Self {
        Self {
            connection: ConnectionManager::new(),
            history: HistoryBuffer::new(),
            agent: AgentStateMachine::new(),
            machines: MachineList::new(),
            stop_deadline: None,
            dropped_frames: 0,
        }
    }

    /// Connect to the telemetry endpoint, reusing a live connection if this
    /// session already holds one.
    pub async fn connect(&mut self, endpoint: &str) -> Result<()> {
        self.connection.initialize(endpoint).await
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    pub fn agent_state(&self) -> AgentState {
        self.agent.state()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn machines(&self) -> &MachineList {
        &self.machines
    }

    pub fn machines_mut(&mut self) -> &mut MachineList {
        &mut self.machines
    }

    /// Count of frames discarded because they failed to decode.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Send a query for the current machine list. Empty trimmed text or a
    /// non-connected transport is a silent no-op: nothing is transmitted and
    /// no state changes.
    pub async fn send_query(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self.connection.is_connected() {
            debug!("Query dropped while not connected");
            return;
        }

        let frame = encode_query(trimmed, self.machines.as_slice());
        self.connection.send(&frame).await;
        if self.connection.is_connected() {
            self.agent.command_issued();
            info!(query = %trimmed, "Query sent");
        }
    }

    /// Send a stop command and arm the delayed stopped transition. Returns
    /// the timer token, or `None` when not connected (silent no-op).
    pub async fn send_stop(&mut self) -> Option<StopTimer> {
        if !self.connection.is_connected() {
            debug!("Stop dropped while not connected");
            return None;
        }

        self.connection.send(&encode_stop()).await;
        if !self.connection.is_connected() {
            return None;
        }

        let timer = self.agent.stop_issued();
        self.stop_deadline = Some((timer, Instant::now() + STOP_DELAY));
        info!("Stop sent");
        Some(timer)
    }

    /// Process one raw inbound frame: decode, normalize, append, transition.
    pub fn handle_frame(&mut self, raw: &str) -> SessionEvent {
        match decode(raw) {
            Err(e) => {
                self.dropped_frames += 1;
                debug!(error = %e, "Dropped inbound frame");
                SessionEvent::Dropped
            }
            Ok(Envelope::Error(detail)) => {
                self.agent.error_reported();
                warn!(detail = %detail, "Service reported an error");
                SessionEvent::ServiceError
            }
            Ok(Envelope::Usage { data, ts }) => {
                let sample = normalize(&data, ts, epoch_now());
                self.history.append(sample);
                self.agent.sample_recorded();
                SessionEvent::Sample
            }
        }
    }

    /// Await the next session event: an inbound frame or the armed stop
    /// deadline, whichever comes first. A deadline invalidated by a
    /// superseding event is discarded silently.
    pub async fn poll(&mut self) -> SessionEvent {
        loop {
            if let Some((timer, deadline)) = self.stop_deadline {
                tokio::select! {
                    _ = sleep_until(deadline) => {
                        self.stop_deadline = None;
                        if self.agent.stop_timer_elapsed(timer) {
                            info!("Agent stopped");
                            return SessionEvent::Stopped;
                        }
                        // Stale token; a newer event superseded the stop.
                        continue;
                    }
                    frame = self.connection.recv() => {
                        return self.on_frame(frame);
                    }
                }
            }

            let frame = self.connection.recv().await;
            return self.on_frame(frame);
        }
    }

    fn on_frame(&mut self, frame: Option<String>) -> SessionEvent {
        match frame {
            Some(raw) => self.handle_frame(&raw),
            None => {
                debug!(status = self.connection.status().as_str(), "Transport ended");
                SessionEvent::Disconnected
            }
        }
    }

    /// Close code and reason from the most recent peer close, if any.
    pub fn last_close(&self) -> Option<&crate::connection::CloseDiagnostics> {
        self.connection.last_close()
    }
}
