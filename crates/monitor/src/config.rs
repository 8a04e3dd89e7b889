//! Monitor configuration

use anyhow::Result;
use serde::Deserialize;

/// Driver configuration, read from `MONITOR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Telemetry service WebSocket endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Query sent once after connecting, e.g.
    /// "every 5 seconds for 10 samples"
    #[serde(default)]
    pub query: Option<String>,

    /// Optional single target machine for the query
    #[serde(default)]
    pub machine_name: Option<String>,

    /// URL of the target machine
    #[serde(default)]
    pub machine_url: Option<String>,
}

fn default_endpoint() -> String {
    "ws://localhost:8000/ws".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            query: None,
            machine_name: None,
            machine_url: None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MONITOR"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
