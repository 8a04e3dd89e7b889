//! Usage Monitor - headless telemetry driver
//!
//! Connects one telemetry session to the service, issues the configured
//! query, and logs structured projections of each sample for the dashboard
//! collaborators to consume.

use anyhow::Result;
use monitor_lib::{SessionEvent, TelemetrySession};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting usage-monitor");

    let config = config::MonitorConfig::load()?;
    info!(endpoint = %config.endpoint, "Monitor configured");

    let mut session = TelemetrySession::new();
    session.connect(&config.endpoint).await?;

    if let (Some(name), Some(url)) = (&config.machine_name, &config.machine_url) {
        if !session.machines_mut().add(name, url) {
            warn!("Ignoring blank machine entry from configuration");
        }
    }

    if let Some(query) = &config.query {
        session.send_query(query).await;
    }

    loop {
        tokio::select! {
            event = session.poll() => match event {
                SessionEvent::Sample => {
                    if let Some(stats) = session.history().latest_stats() {
                        info!(
                            event = "sample",
                            user_cpu_seconds = stats.user_cpu_seconds,
                            sys_cpu_seconds = stats.sys_cpu_seconds,
                            max_rss_kb = stats.max_rss_kb,
                            agent_state = session.agent_state().as_str(),
                            window = session.history().len(),
                            "Sample recorded"
                        );
                    }
                }
                SessionEvent::ServiceError => {
                    warn!(event = "service_error", "Agent entered error state");
                }
                SessionEvent::Dropped => {
                    debug!(event = "frame_dropped", total = session.dropped_frames(), "Frame dropped");
                }
                SessionEvent::Stopped => {
                    info!(event = "agent_stopped", "Agent stopped");
                }
                SessionEvent::Disconnected => {
                    if let Some(close) = session.last_close() {
                        info!(code = close.code, reason = %close.reason, "Session ended");
                    } else {
                        info!(status = session.status().as_str(), "Session ended");
                    }
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT received, stopping agent");
                if session.send_stop().await.is_some() {
                    loop {
                        match session.poll().await {
                            SessionEvent::Stopped | SessionEvent::Disconnected => break,
                            _ => {}
                        }
                    }
                }
                break;
            }
        }
    }

    info!(
        samples = session.history().len(),
        dropped_frames = session.dropped_frames(),
        "Shutting down"
    );

    Ok(())
}
