//! Session lifecycle notifications
//!
//! `SessionRegistry` announces every relay session when it is spawned and
//! again once both of its sockets are released. Subscribers that fall more
//! than `LIFECYCLE_BACKLOG` events behind see `RecvError::Lagged`.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

const LIFECYCLE_BACKLOG: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelayEvent {
    /// A debugger is now attached to `page_id` on `device_id`
    SessionOpened {
        session_id: Uuid,
        page_id: String,
        device_id: String,
    },
    /// Handler state for the session has been dropped
    SessionClosed { session_id: Uuid },
}

impl RelayEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            Self::SessionOpened { session_id, .. } | Self::SessionClosed { session_id } => {
                *session_id
            }
        }
    }
}

pub struct EventBus {
    tx: broadcast::Sender<RelayEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(LIFECYCLE_BACKLOG);
        Self { tx }
    }

    /// Sessions run whether or not anyone listens
    pub fn publish(&self, event: RelayEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No lifecycle subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
