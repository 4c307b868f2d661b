//! Relay Sessions
//!
//! One session per debugger attached to a page. Each session runs on a single
//! task and handles one message at a time, so handler state needs no locks.
//! When either side goes away the session ends and drops its registry, which
//! releases every handler cache and both socket writers.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::connection::Connection;
use crate::debugger_type::{debugger_type, DebuggerType};
use crate::events::{EventBus, RelayEvent};
use crate::handler::HandlerRegistry;
use crate::protocol::CdpMessage;

/// Message counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub debugger_messages: usize,
    pub device_messages: usize,
    pub intercepted: usize,
}

pub struct RelaySession {
    pub id: Uuid,
    registry: HandlerRegistry,
}

impl RelaySession {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            id: Uuid::now_v7(),
            registry,
        }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        self.registry.connection()
    }

    /// Relay until either inbound stream ends
    pub async fn run(
        mut self,
        mut debugger_rx: mpsc::UnboundedReceiver<CdpMessage>,
        mut device_rx: mpsc::UnboundedReceiver<CdpMessage>,
    ) -> SessionStats {
        let mut stats = SessionStats::default();

        loop {
            tokio::select! {
                message = debugger_rx.recv() => match message {
                    Some(message) => {
                        stats.debugger_messages += 1;
                        if self.registry.handle_debugger_message(message) {
                            stats.intercepted += 1;
                        }
                    }
                    None => {
                        tracing::info!("[RelaySession {}] Debugger disconnected", self.id);
                        break;
                    }
                },
                message = device_rx.recv() => match message {
                    Some(message) => {
                        stats.device_messages += 1;
                        if self.registry.handle_device_message(message) {
                            stats.intercepted += 1;
                        }
                    }
                    None => {
                        tracing::info!("[RelaySession {}] Device disconnected", self.id);
                        break;
                    }
                },
            }
        }

        tracing::debug!("[RelaySession {}] Finished: {:?}", self.id, stats);
        stats
    }
}

/// Live session summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub page_id: String,
    pub device_id: String,
    pub debugger_type: DebuggerType,
}

/// Tracks running sessions across tasks
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, SessionInfo>>,
    events: Arc<EventBus>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            events: Arc::new(EventBus::new()),
        }
    }

    /// Run a session on its own task; it is listed until it finishes
    pub fn spawn(
        &self,
        session: RelaySession,
        debugger_rx: mpsc::UnboundedReceiver<CdpMessage>,
        device_rx: mpsc::UnboundedReceiver<CdpMessage>,
    ) -> JoinHandle<SessionStats> {
        let session_id = session.id;
        let connection = session.connection();
        let info = SessionInfo {
            page_id: connection.page.id.clone(),
            device_id: connection.device.id.clone(),
            debugger_type: debugger_type(connection),
        };

        tracing::info!(
            "[SessionRegistry] Opening session {} for page {} ({} debugger)",
            session_id,
            info.page_id,
            info.debugger_type
        );
        self.events.publish(RelayEvent::SessionOpened {
            session_id,
            page_id: info.page_id.clone(),
            device_id: info.device_id.clone(),
        });
        self.sessions.insert(session_id, info);

        let sessions = self.sessions.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let stats = session.run(debugger_rx, device_rx).await;

            sessions.remove(&session_id);
            events.publish(RelayEvent::SessionClosed { session_id });
            tracing::info!("[SessionRegistry] Closed session {}", session_id);
            stats
        })
    }

    pub fn get(&self, session_id: &Uuid) -> Option<SessionInfo> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.events.subscribe()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
