//! Core data models for the usage monitor

use serde::{Deserialize, Serialize};

/// One canonical resource-usage reading. Immutable once constructed;
/// instances are created only by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub user_cpu_sec: i64,
    /// Microsecond remainder of user CPU time, 0..=999_999
    pub user_cpu_usec: i64,
    pub sys_cpu_sec: i64,
    /// Microsecond remainder of system CPU time, 0..=999_999
    pub sys_cpu_usec: i64,
    pub max_rss_kb: i64,
    pub minor_faults: i64,
    pub major_faults: i64,
    /// Epoch seconds
    pub timestamp: f64,
}

impl Sample {
    /// User CPU time as fractional seconds
    pub fn user_cpu_seconds(&self) -> f64 {
        self.user_cpu_sec as f64 + self.user_cpu_usec as f64 / 1_000_000.0
    }

    /// System CPU time as fractional seconds
    pub fn sys_cpu_seconds(&self) -> f64 {
        self.sys_cpu_sec as f64 + self.sys_cpu_usec as f64 / 1_000_000.0
    }
}

/// Transport connection status, owned by the connection manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error,
    Closed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
            ConnectionStatus::Closed => "closed",
        }
    }
}

/// Remote agent lifecycle as observed client-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Idle,
    Thinking,
    Streaming,
    Stopped,
    Error,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Idle => "idle",
            AgentState::Thinking => "thinking",
            AgentState::Streaming => "streaming",
            AgentState::Stopped => "stopped",
            AgentState::Error => "error",
        }
    }
}

/// Target machine descriptor, supplied by the machine-list collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    pub url: String,
}

/// Editable list of target machines
///
/// Entries are validated only for non-empty trimmed name and url;
/// anything beyond that is the service's concern.
#[derive(Debug, Clone, Default)]
pub struct MachineList {
    machines: Vec<Machine>,
}

impl MachineList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a machine; returns false without modifying the list when either
    /// trimmed string is empty.
    pub fn add(&mut self, name: &str, url: &str) -> bool {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return false;
        }
        self.machines.push(Machine {
            name: name.to_string(),
            url: url.to_string(),
        });
        true
    }

    /// Replace the entry at `index`; same validation as `add`.
    pub fn update(&mut self, index: usize, name: &str, url: &str) -> bool {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() || index >= self.machines.len() {
            return false;
        }
        self.machines[index] = Machine {
            name: name.to_string(),
            url: url.to_string(),
        };
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Machine> {
        if index < self.machines.len() {
            Some(self.machines.remove(index))
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[Machine] {
        &self.machines
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_fractional_seconds() {
        let sample = Sample {
            user_cpu_sec: 1,
            user_cpu_usec: 500_000,
            sys_cpu_sec: 0,
            sys_cpu_usec: 250_000,
            max_rss_kb: 2048,
            minor_faults: 10,
            major_faults: 1,
            timestamp: 1000.0,
        };

        assert!((sample.user_cpu_seconds() - 1.5).abs() < 1e-9);
        assert!((sample.sys_cpu_seconds() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_machine_list_add_trims() {
        let mut list = MachineList::new();
        assert!(list.add("  arya07  ", " http://10.0.0.7:8000 "));
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].name, "arya07");
        assert_eq!(list.as_slice()[0].url, "http://10.0.0.7:8000");
    }

    #[test]
    fn test_machine_list_rejects_blank() {
        let mut list = MachineList::new();
        assert!(!list.add("", "http://host:8000"));
        assert!(!list.add("host", "   "));
        assert!(list.is_empty());
    }

    #[test]
    fn test_machine_list_update_and_remove() {
        let mut list = MachineList::new();
        list.add("a", "http://a");
        list.add("b", "http://b");

        assert!(list.update(1, "b2", "http://b2"));
        assert_eq!(list.as_slice()[1].name, "b2");
        assert!(!list.update(5, "x", "http://x"));
        assert!(!list.update(0, " ", "http://x"));

        let removed = list.remove(0).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(list.len(), 1);
        assert!(list.remove(7).is_none());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ConnectionStatus::Connected.as_str(), "connected");
        assert_eq!(AgentState::Thinking.as_str(), "thinking");
    }
}
