//! Bus abstraction layer: wraps `tokio::sync::broadcast` so callers never
//! touch the broadcast types directly.

use tokio::sync::broadcast;

use apbridge::{BridgeMessage, SessionCommand, SessionEvent};

/// Capacity of the unified bus.
pub const BUS_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// PollError
// ---------------------------------------------------------------------------

/// Error from `BusReceiver::recv()` once the bus is closed.
#[derive(Debug)]
pub enum PollError {
    Shutdown,
}

// ---------------------------------------------------------------------------
// BusSender
// ---------------------------------------------------------------------------

/// Cloneable sender that auto-stamps `source` on every outbound message.
#[derive(Clone)]
pub struct BusSender {
    actor_id: String,
    inner: broadcast::Sender<BridgeMessage>,
}

impl BusSender {
    pub fn new(actor_id: impl Into<String>, inner: broadcast::Sender<BridgeMessage>) -> Self {
        Self {
            actor_id: actor_id.into(),
            inner,
        }
    }

    /// A sender on the same bus that stamps a different actor ID.
    pub fn for_actor(&self, actor_id: impl Into<String>) -> Self {
        Self::new(actor_id, self.inner.clone())
    }

    /// Send a message, auto-stamping source from the actor ID. A bus with no
    /// subscribers drops the message silently.
    pub fn send(&self, mut msg: BridgeMessage) {
        msg.source = self.actor_id.clone();
        let _ = self.inner.send(msg);
    }

    /// Ask the session client to carry out a request.
    pub fn command(&self, cmd: SessionCommand) {
        self.send(BridgeMessage::new(cmd));
    }

    /// Push a session event (used by session clients).
    pub fn push(&self, event: SessionEvent) {
        self.send(BridgeMessage::new(event));
    }

    /// Create a new receiver subscribed to this bus.
    pub fn subscribe(&self) -> BusReceiver {
        BusReceiver {
            inner: self.inner.subscribe(),
        }
    }
}

// ---------------------------------------------------------------------------
// BusReceiver
// ---------------------------------------------------------------------------

/// Receiver wrapper around the broadcast receiver.
pub struct BusReceiver {
    inner: broadcast::Receiver<BridgeMessage>,
}

impl BusReceiver {
    /// Wait for the next message. Lagged messages are logged and skipped.
    pub async fn recv(&mut self) -> Result<BridgeMessage, PollError> {
        loop {
            match self.inner.recv().await {
                Ok(msg) => return Ok(msg),
                Err(broadcast::error::RecvError::Closed) => return Err(PollError::Shutdown),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("bus: lagged, dropped {n} events");
                    continue;
                }
            }
        }
    }

    /// Non-blocking drain: returns the next message, `Ok(None)` if empty.
    pub fn poll(&mut self) -> Result<Option<BridgeMessage>, PollError> {
        loop {
            match self.inner.try_recv() {
                Ok(msg) => return Ok(Some(msg)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(PollError::Shutdown),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("bus: lagged, dropped {n} events");
                    continue;
                }
            }
        }
    }
}

/// Create a fresh bus and its root sender.
pub fn channel(actor_id: impl Into<String>) -> BusSender {
    let (tx, _) = broadcast::channel(BUS_CAPACITY);
    BusSender::new(actor_id, tx)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Drain every queued outbound command.
    pub fn drain_commands(rx: &mut BusReceiver) -> Vec<SessionCommand> {
        let mut out = Vec::new();
        while let Ok(Some(msg)) = rx.poll() {
            if let apbridge::BridgeEvent::Command(cmd) = msg.event {
                out.push(cmd);
            }
        }
        out
    }
}
