//! Page Reload Handler - routes `Page.reload` through the bundler
//!
//! The device cannot reload itself over CDP, so the request is turned into a
//! bundler broadcast that every connected app listens to.

use std::sync::Arc;

use crate::connection::Connection;
use crate::handler::MessageHandler;
use crate::protocol::{methods, CdpMessage};

/// Bundler / dev server capability used by the relay
pub trait Bundler: Send + Sync {
    /// Broadcast a named message to every connected app
    fn broadcast_message(&self, name: &str);
}

pub struct PageReloadHandler {
    connection: Arc<Connection>,
    bundler: Arc<dyn Bundler>,
}

impl PageReloadHandler {
    pub fn new(connection: Arc<Connection>, bundler: Arc<dyn Bundler>) -> Self {
        Self {
            connection,
            bundler,
        }
    }
}

impl MessageHandler for PageReloadHandler {
    fn name(&self) -> &str {
        "PageReloadHandler"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::PAGE_RELOAD) {
            return false;
        }

        tracing::info!(
            "[PageReloadHandler] Reloading {} on {}",
            self.connection.page.app,
            self.connection.device.name
        );
        self.bundler.broadcast_message("reload");
        self.connection
            .debugger
            .send_message(CdpMessage::response(message.id, serde_json::json!({})));
        true
    }
}
