//! Short-circuits `Runtime.callFunctionOn` for VS Code.
//!
//! VS Code calls into the engine to compute object previews, which the engine
//! cannot serve. Echoing the object id back keeps the variables view working.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::connection::Connection;
use crate::debugger_type::{debugger_type, DebuggerType};
use crate::handler::MessageHandler;
use crate::protocol::{methods, CdpMessage};

pub struct VscodeRuntimeCallFunctionOnHandler {
    connection: Arc<Connection>,
}

impl VscodeRuntimeCallFunctionOnHandler {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

impl MessageHandler for VscodeRuntimeCallFunctionOnHandler {
    fn name(&self) -> &str {
        "VscodeRuntimeCallFunctionOnHandler"
    }

    fn is_enabled(&self) -> bool {
        debugger_type(&self.connection) == DebuggerType::Vscode
    }

    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::RUNTIME_CALL_FUNCTION_ON) {
            return false;
        }

        let object_id = message.param("objectId").cloned().unwrap_or(Value::Null);
        self.connection.debugger.send_message(CdpMessage::response(
            message.id,
            json!({ "result": { "objectId": object_id } }),
        ));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::*;

    #[test]
    fn test_echoes_object_id() {
        let test = vscode_connection();
        let mut handler = VscodeRuntimeCallFunctionOnHandler::new(test.connection.clone());

        let mut request = CdpMessage::request(
            420,
            methods::RUNTIME_CALL_FUNCTION_ON,
            json!({
                "objectId": "1337",
                "returnByValue": true,
                "functionDeclaration": "function() { return this.constructor.name }",
            }),
        );

        assert!(handler.is_enabled());
        assert!(handler.handle_debugger_message(&mut request));
        assert_eq!(
            test.debugger.messages(),
            vec![CdpMessage::response(
                Some(420),
                json!({ "result": { "objectId": "1337" } })
            )]
        );
        assert_eq!(test.device.len(), 0);
    }

    #[test]
    fn test_disabled_for_unknown_debugger() {
        let test = connection();
        let handler = VscodeRuntimeCallFunctionOnHandler::new(test.connection.clone());
        assert!(!handler.is_enabled());
    }
}
