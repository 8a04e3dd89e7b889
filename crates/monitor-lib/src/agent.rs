//! Agent command/response state machine
//!
//! Tracks the remote agent's lifecycle as observed client-side. The one
//! time-based transition (stop command -> stopped after a fixed delay) is
//! modeled as a generation-counted timer token: any superseding event bumps
//! the generation, so a timer that fires late cannot clobber newer state.

use crate::models::AgentState;
use std::time::Duration;

/// Fixed delay before an issued stop is reflected as `Stopped`. The
/// transition is optimistic and independent of any server acknowledgment.
pub const STOP_DELAY: Duration = Duration::from_millis(400);

/// Token for one scheduled stop transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTimer {
    generation: u64,
}

/// Client-side state machine for the remote agent
#[derive(Debug)]
pub struct AgentStateMachine {
    state: AgentState,
    generation: u64,
    pending_stop: Option<u64>,
}

impl Default for AgentStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentStateMachine {
    pub fn new() -> Self {
        Self {
            state: AgentState::Idle,
            generation: 0,
            pending_stop: None,
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Invalidate any outstanding stop timer.
    fn supersede(&mut self) {
        self.generation += 1;
        self.pending_stop = None;
    }

    /// A query command was actually transmitted (connection was live).
    pub fn command_issued(&mut self) {
        self.supersede();
        self.state = AgentState::Thinking;
    }

    /// A stop command was transmitted; returns the token for the delayed
    /// transition the caller must schedule with [`STOP_DELAY`].
    pub fn stop_issued(&mut self) -> StopTimer {
        self.supersede();
        self.state = AgentState::Thinking;
        self.pending_stop = Some(self.generation);
        StopTimer {
            generation: self.generation,
        }
    }

    /// A usage sample was normalized and appended.
    pub fn sample_recorded(&mut self) {
        self.supersede();
        if self.state == AgentState::Thinking {
            self.state = AgentState::Streaming;
        }
    }

    /// A service-reported error envelope arrived. Unconditional; overrides
    /// in-flight transitions.
    pub fn error_reported(&mut self) {
        self.supersede();
        self.state = AgentState::Error;
    }

    /// The scheduled stop delay elapsed. Transitions to `Stopped` only when
    /// the token is still current; a stale token is a no-op.
    pub fn stop_timer_elapsed(&mut self, timer: StopTimer) -> bool {
        if self.pending_stop == Some(timer.generation) {
            self.pending_stop = None;
            self.state = AgentState::Stopped;
            true
        } else {
            false
        }
    }
}
