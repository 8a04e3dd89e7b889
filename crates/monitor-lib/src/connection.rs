//! WebSocket connection management
//!
//! This module owns the transport connection for one telemetry session:
//! - Idempotent initialization that reuses a live connection
//! - Status tracking (connecting/connected/error/closed)
//! - Silent no-op sends while not connected
//! - Close diagnostics recording; no automatic reconnection

use crate::models::ConnectionStatus;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code and reason from the peer, recorded for diagnostics only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseDiagnostics {
    pub code: u16,
    pub reason: String,
}

/// Owner of the transport connection and its status
pub struct ConnectionManager {
    endpoint: Option<String>,
    status: ConnectionStatus,
    socket: Option<WsStream>,
    last_close: Option<CloseDiagnostics>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            status: ConnectionStatus::Connecting,
            socket: None,
            last_close: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected && self.socket.is_some()
    }

    /// Close code and reason from the most recent peer close, if any.
    pub fn last_close(&self) -> Option<&CloseDiagnostics> {
        self.last_close.as_ref()
    }

    /// Connect to the telemetry endpoint. Idempotent: a live connection held
    /// by this session is reused rather than replaced, so re-initialization
    /// never tears down an in-flight session.
    pub async fn initialize(&mut self, endpoint: &str) -> Result<()> {
        if self.is_connected() {
            debug!(endpoint = %endpoint, "Reusing live connection");
            return Ok(());
        }

        if let Err(e) = url::Url::parse(endpoint) {
            self.status = ConnectionStatus::Error;
            return Err(e).with_context(|| format!("Invalid endpoint URL: {}", endpoint));
        }

        self.status = ConnectionStatus::Connecting;
        match connect_async(endpoint).await {
            Ok((socket, _response)) => {
                self.socket = Some(socket);
                self.endpoint = Some(endpoint.to_string());
                self.status = ConnectionStatus::Connected;
                info!(endpoint = %endpoint, "Connected to telemetry service");
                Ok(())
            }
            Err(e) => {
                self.status = ConnectionStatus::Error;
                warn!(endpoint = %endpoint, error = %e, "Connection failed");
                Err(e).with_context(|| format!("Failed to connect to {}", endpoint))
            }
        }
    }

    /// Transmit a text frame. Silent no-op unless connected: no queueing and
    /// no error signaled to the caller. A transport failure during the send
    /// flips status to error.
    pub async fn send(&mut self, payload: &str) {
        if !self.is_connected() {
            debug!(status = self.status.as_str(), "Dropping outbound frame while not connected");
            return;
        }

        let socket = match self.socket.as_mut() {
            Some(socket) => socket,
            None => return,
        };

        if let Err(e) = socket.send(Message::Text(payload.to_string())).await {
            warn!(error = %e, "Transport error while sending");
            self.status = ConnectionStatus::Error;
            self.socket = None;
        }
    }

    /// Receive the next inbound text frame. Ping/pong/binary frames are
    /// skipped. Returns `None` once the connection has ended, after updating
    /// status and close diagnostics.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            let socket = self.socket.as_mut()?;
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return Some(text),
                Some(Ok(Message::Close(frame))) => {
                    if let Some(frame) = frame {
                        let diagnostics = CloseDiagnostics {
                            code: u16::from(frame.code),
                            reason: frame.reason.to_string(),
                        };
                        info!(
                            code = diagnostics.code,
                            reason = %diagnostics.reason,
                            "Connection closed by peer"
                        );
                        self.last_close = Some(diagnostics);
                    } else {
                        info!("Connection closed by peer");
                    }
                    self.status = ConnectionStatus::Closed;
                    self.socket = None;
                    return None;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!(error = %e, "Transport error while receiving");
                    self.status = ConnectionStatus::Error;
                    self.socket = None;
                    return None;
                }
                None => {
                    self.status = ConnectionStatus::Closed;
                    self.socket = None;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_is_connecting() {
        let manager = ConnectionManager::new();
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
        assert!(!manager.is_connected());
        assert!(manager.last_close().is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_sets_error_status() {
        let mut manager = ConnectionManager::new();
        let result = manager.initialize("not a url").await;
        assert!(result.is_err());
        assert_eq!(manager.status(), ConnectionStatus::Error);
    }

    #[tokio::test]
    async fn test_send_while_not_connected_is_noop() {
        let mut manager = ConnectionManager::new();
        manager.send(r#"{"type":"stop"}"#).await;
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn test_recv_without_socket_ends_stream() {
        let mut manager = ConnectionManager::new();
        assert!(manager.recv().await.is_none());
    }
}
