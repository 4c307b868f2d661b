//! Message Handlers - selective CDP interception
//!
//! Every workaround is one `MessageHandler`. The registry holds them in a
//! fixed order and offers each message to the enabled ones until one of them
//! consumes it. Messages nobody consumes go to the other side, including any
//! in-place edits a handler made on the way.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::connection::Connection;
use crate::handlers::{
    Bundler, NetworkResponseHandler, PageReloadHandler, VscodeGetPossibleBreakpointsHandler,
    VscodeRuntimeCallFunctionOnHandler, VscodeRuntimeEvaluateHandler,
    VscodeRuntimeGetPropertiesHandler, VscodeSetBreakpointByUrlHandler,
};
use crate::protocol::CdpMessage;

/// Interception strategy for one connection
///
/// Returning `true` means the handler disposed of the message and already
/// sent whatever reply was needed. Returning `false` lets the message
/// continue, possibly after the handler edited it.
pub trait MessageHandler: Send {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Whether this handler takes part for the current connection
    fn is_enabled(&self) -> bool;

    /// Debugger -> device traffic
    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        let _ = message;
        false
    }

    /// Device -> debugger traffic
    fn handle_device_message(&mut self, message: &mut CdpMessage) -> bool {
        let _ = message;
        false
    }
}

/// Ordered handler set plus the connection it relays for
pub struct HandlerRegistry {
    connection: Arc<Connection>,
    handlers: Vec<Box<dyn MessageHandler>>,
}

impl HandlerRegistry {
    /// Registry with no handlers: everything passes through
    pub fn empty(connection: Arc<Connection>) -> Self {
        Self {
            connection,
            handlers: Vec::new(),
        }
    }

    /// Default handler set, most specific first
    pub fn new(
        connection: Arc<Connection>,
        bundler: Arc<dyn Bundler>,
        config: &RelayConfig,
    ) -> Self {
        let mut registry = Self::empty(connection.clone());

        registry.register(Box::new(NetworkResponseHandler::new(
            connection.clone(),
            config.network_response_cache_size,
        )));
        registry.register(Box::new(PageReloadHandler::new(
            connection.clone(),
            bundler,
        )));

        if config.enable_vscode_handlers {
            registry.register(Box::new(VscodeGetPossibleBreakpointsHandler::new(
                connection.clone(),
            )));
            registry.register(Box::new(VscodeSetBreakpointByUrlHandler::new(
                connection.clone(),
            )));
            registry.register(Box::new(VscodeRuntimeCallFunctionOnHandler::new(
                connection.clone(),
            )));
            registry.register(Box::new(VscodeRuntimeEvaluateHandler::new(
                connection.clone(),
            )));
            registry.register(Box::new(VscodeRuntimeGetPropertiesHandler::new(
                connection,
            )));
        }

        registry
    }

    /// Append a handler after the ones already registered
    pub fn register(&mut self, handler: Box<dyn MessageHandler>) {
        tracing::debug!("Registered handler: {}", handler.name());
        self.handlers.push(handler);
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Relay a debugger message; returns whether a handler consumed it
    pub fn handle_debugger_message(&mut self, mut message: CdpMessage) -> bool {
        for handler in self.handlers.iter_mut().filter(|h| h.is_enabled()) {
            if handler.handle_debugger_message(&mut message) {
                tracing::debug!(
                    "[{}] Intercepted debugger message {:?} ({:?})",
                    handler.name(),
                    message.method,
                    message.id
                );
                return true;
            }
        }

        self.connection.device.send_message(message);
        false
    }

    /// Relay a device message; returns whether a handler consumed it
    pub fn handle_device_message(&mut self, mut message: CdpMessage) -> bool {
        for handler in self.handlers.iter_mut().filter(|h| h.is_enabled()) {
            if handler.handle_device_message(&mut message) {
                tracing::debug!(
                    "[{}] Intercepted device message {:?} ({:?})",
                    handler.name(),
                    message.method,
                    message.id
                );
                return true;
            }
        }

        self.connection.debugger.send_message(message);
        false
    }
}
