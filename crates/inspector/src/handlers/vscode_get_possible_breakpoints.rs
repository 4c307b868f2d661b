//! Answers `Debugger.getPossibleBreakpoints` with no locations for VS Code.
//! The engine's own answer is unreliable and VS Code falls back gracefully.

use serde_json::json;
use std::sync::Arc;

use crate::connection::Connection;
use crate::debugger_type::{debugger_type, DebuggerType};
use crate::handler::MessageHandler;
use crate::protocol::{methods, CdpMessage};

pub struct VscodeGetPossibleBreakpointsHandler {
    connection: Arc<Connection>,
}

impl VscodeGetPossibleBreakpointsHandler {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

impl MessageHandler for VscodeGetPossibleBreakpointsHandler {
    fn name(&self) -> &str {
        "VscodeGetPossibleBreakpointsHandler"
    }

    fn is_enabled(&self) -> bool {
        debugger_type(&self.connection) == DebuggerType::Vscode
    }

    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::DEBUGGER_GET_POSSIBLE_BREAKPOINTS) {
            return false;
        }

        self.connection
            .debugger
            .send_message(CdpMessage::response(message.id, json!({ "locations": [] })));
        true
    }
}
