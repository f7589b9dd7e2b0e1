// src/services/notifier.rs - fan-out of feed events to socket subscribers
//
// The notifier is created empty and wired to its transport exactly once, after the
// server has bound its listener. Every emit is fire-and-forget.

use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

/// Channel capacity per subscriber before old events are dropped for it.
pub const DEFAULT_CAPACITY: usize = 256;

/// Frame delivered to every subscriber: `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocketEvent {
    pub event: String,
    pub data: serde_json::Value,
}

/// Transport handle the notifier is initialized with.
pub type SocketTransport = broadcast::Sender<SocketEvent>;

pub fn socket_transport(capacity: usize) -> SocketTransport {
    let (tx, _) = broadcast::channel(capacity);
    tx
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("socket channel not initialized")]
    Uninitialized,
    #[error("socket channel already initialized")]
    AlreadyInitialized,
    #[error("could not encode payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct Notifier {
    channel: OnceLock<SocketTransport>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&self, transport: SocketTransport) -> Result<(), NotifierError> {
        self.channel
            .set(transport)
            .map_err(|_| NotifierError::AlreadyInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.channel.get().is_some()
    }

    fn channel(&self) -> Result<&SocketTransport, NotifierError> {
        self.channel.get().ok_or(NotifierError::Uninitialized)
    }

    /// Broadcast `payload` under `event` to all live subscribers.
    /// Returns how many subscribers were handed the event.
    pub fn emit<T: Serialize>(&self, event: &str, payload: &T) -> Result<usize, NotifierError> {
        let channel = self.channel()?;
        let frame = SocketEvent {
            event: event.to_string(),
            data: serde_json::to_value(payload)?,
        };

        match channel.send(frame) {
            Ok(count) => {
                log::info!("[socket] '{}' event sent to {} subscribers", event, count);
                Ok(count)
            }
            Err(_) => {
                // no subscribers
                log::debug!("[socket] '{}' event had no subscribers", event);
                Ok(0)
            }
        }
    }

    pub fn subscribe(&self) -> Result<broadcast::Receiver<SocketEvent>, NotifierError> {
        Ok(self.channel()?.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.get().map_or(0, |tx| tx.receiver_count())
    }
}
