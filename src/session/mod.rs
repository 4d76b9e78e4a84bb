pub mod socket;

use crate::protocol::OutboundFrame;
use crate::settings::Settings;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_CHAT_PATH: &str = "/ws/chat";
pub const RECONNECT_DELAY_MS: u64 = 3000;

/// Lifecycle of the single logical session as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    ClosedRetrying,
}

/// Everything needed to keep the chat socket connected.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub url: String,
    /// Fixed delay between a close and the next attempt. Never grows.
    pub reconnect_delay: Duration,
}

impl ConnectionConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            url: endpoint_url(&settings.host, settings.secure, &settings.path),
            reconnect_delay: Duration::from_millis(settings.reconnect_delay_ms),
        }
    }
}

/// `ws://` or `wss://` depending on transport security, path normalized to
/// start with `/`.
pub fn endpoint_url(host: &str, secure: bool, path: &str) -> String {
    let scheme = if secure { "wss" } else { "ws" };
    let host = host
        .trim()
        .trim_start_matches("wss://")
        .trim_start_matches("ws://")
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    let path = path.trim();
    let path = if path.is_empty() {
        DEFAULT_CHAT_PATH.to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!("{}://{}{}", scheme, host, path)
}

/// Outbound handle for one physical connection. Dropped by the controller
/// when that connection closes; a new one arrives with every reconnect.
#[derive(Debug, Clone)]
pub struct Link {
    generation: u64,
    tx: mpsc::UnboundedSender<OutboundFrame>,
}

impl Link {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<OutboundFrame>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hands the frame to the socket writer. False when the writer is gone.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        self.tx.send(frame).is_ok()
    }
}
