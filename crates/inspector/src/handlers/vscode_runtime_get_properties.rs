//! Runtime Get Properties Handler - patches property descriptors for VS Code
//!
//! The request is forwarded as-is and its id remembered. When the device
//! answers that id, each descriptor's value gets a `description` (VS Code
//! renders nothing without one) and symbol values lose their `objectId`,
//! which VS Code would otherwise try to expand.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::connection::Connection;
use crate::debugger_type::{debugger_type, DebuggerType};
use crate::handler::MessageHandler;
use crate::protocol::{methods, CdpMessage, RequestId};

pub struct VscodeRuntimeGetPropertiesHandler {
    connection: Arc<Connection>,

    /// Outstanding `Runtime.getProperties` requests, cleared by their response
    pending: HashSet<RequestId>,
}

impl VscodeRuntimeGetPropertiesHandler {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self {
            connection,
            pending: HashSet::new(),
        }
    }

    /// Number of requests awaiting a device response (for testing)
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn patch_descriptor_value(value: &mut Map<String, Value>) {
    value
        .entry("description")
        .or_insert_with(|| Value::from(""));

    if value.get("type").and_then(Value::as_str) == Some("symbol") {
        value.remove("objectId");
    }
}

impl MessageHandler for VscodeRuntimeGetPropertiesHandler {
    fn name(&self) -> &str {
        "VscodeRuntimeGetPropertiesHandler"
    }

    fn is_enabled(&self) -> bool {
        debugger_type(&self.connection) == DebuggerType::Vscode
    }

    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::RUNTIME_GET_PROPERTIES) {
            return false;
        }
        if let Some(id) = message.id {
            self.pending.insert(id);
        }
        false
    }

    fn handle_device_message(&mut self, message: &mut CdpMessage) -> bool {
        let Some(id) = message.id else {
            return false;
        };
        if !self.pending.remove(&id) {
            return false;
        }

        let descriptors = message
            .result
            .as_mut()
            .and_then(|result| result.get_mut("result"))
            .and_then(Value::as_array_mut);

        for descriptor in descriptors.into_iter().flatten() {
            if let Some(value) = descriptor.get_mut("value").and_then(Value::as_object_mut) {
                patch_descriptor_value(value);
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::*;
    use serde_json::json;

    fn get_properties(id: RequestId) -> CdpMessage {
        CdpMessage::request(id, methods::RUNTIME_GET_PROPERTIES, json!({ "objectId": "1337" }))
    }

    fn properties_response(id: RequestId, descriptors: Value) -> CdpMessage {
        CdpMessage::response(Some(id), json!({ "result": descriptors }))
    }

    #[test]
    fn test_request_is_forwarded_and_tracked() {
        let test = vscode_connection();
        let mut handler = VscodeRuntimeGetPropertiesHandler::new(test.connection.clone());

        let mut request = get_properties(420);
        let original = request.clone();

        assert!(!handler.handle_debugger_message(&mut request));
        assert_eq!(request, original);
        assert_eq!(handler.pending_count(), 1);
    }

    #[test]
    fn test_adds_missing_description_and_keeps_existing() {
        let test = vscode_connection();
        let mut handler = VscodeRuntimeGetPropertiesHandler::new(test.connection.clone());
        handler.handle_debugger_message(&mut get_properties(420));

        let mut response = properties_response(
            420,
            json!([
                {
                    "name": "foo",
                    "configurable": true,
                    "enumerable": true,
                    "value": { "type": "number", "value": 1 },
                },
                {
                    "name": "bar",
                    "configurable": true,
                    "enumerable": true,
                    "value": { "type": "string", "description": "Dont overwrite" },
                },
            ]),
        );

        assert!(!handler.handle_device_message(&mut response));

        let descriptors = &response.result.as_ref().unwrap()["result"];
        assert_eq!(descriptors[0]["value"]["description"], "");
        assert_eq!(descriptors[1]["value"]["description"], "Dont overwrite");
        assert_eq!(handler.pending_count(), 0);
    }

    #[test]
    fn test_strips_object_id_from_symbols_only() {
        let test = vscode_connection();
        let mut handler = VscodeRuntimeGetPropertiesHandler::new(test.connection.clone());
        handler.handle_debugger_message(&mut get_properties(420));

        let mut response = properties_response(
            420,
            json!([
                {
                    "name": "sym",
                    "configurable": false,
                    "enumerable": false,
                    "value": { "type": "symbol", "description": "Symbol(foo)", "objectId": "1" },
                },
                {
                    "name": "obj",
                    "configurable": true,
                    "enumerable": true,
                    "value": { "type": "object", "description": "Object", "objectId": "2" },
                },
            ]),
        );

        handler.handle_device_message(&mut response);

        let descriptors = &response.result.as_ref().unwrap()["result"];
        assert!(descriptors[0]["value"].get("objectId").is_none());
        assert_eq!(descriptors[1]["value"]["objectId"], "2");
    }

    #[test]
    fn test_unrelated_responses_are_untouched() {
        let test = vscode_connection();
        let mut handler = VscodeRuntimeGetPropertiesHandler::new(test.connection.clone());
        handler.handle_debugger_message(&mut get_properties(1));

        let mut response = properties_response(
            2,
            json!([{ "name": "foo", "value": { "type": "symbol", "objectId": "9" } }]),
        );
        let original = response.clone();

        assert!(!handler.handle_device_message(&mut response));
        assert_eq!(response, original);
        assert_eq!(handler.pending_count(), 1);
    }

    #[test]
    fn test_many_parallel_requests_are_all_patched() {
        let test = vscode_connection();
        let mut handler = VscodeRuntimeGetPropertiesHandler::new(test.connection.clone());

        for id in 1..=250 {
            handler.handle_debugger_message(&mut get_properties(id));
        }
        assert_eq!(handler.pending_count(), 250);

        let mut response = properties_response(
            1,
            json!([{ "name": "sym", "value": { "type": "symbol", "objectId": "9" } }]),
        );
        handler.handle_device_message(&mut response);

        let value = &response.result.as_ref().unwrap()["result"][0]["value"];
        assert!(value.get("objectId").is_none());
        assert_eq!(value["description"], "");
        assert_eq!(handler.pending_count(), 249);
    }

    #[test]
    fn test_error_response_is_tolerated() {
        let test = vscode_connection();
        let mut handler = VscodeRuntimeGetPropertiesHandler::new(test.connection.clone());
        handler.handle_debugger_message(&mut get_properties(7));

        let mut response = CdpMessage {
            id: Some(7),
            error: Some(json!({ "code": -32000, "message": "Invalid object" })),
            ..Default::default()
        };

        let original = response.clone();

        assert!(!handler.handle_device_message(&mut response));
        assert_eq!(response, original);
        assert_eq!(handler.pending_count(), 0);
    }

    #[test]
    fn test_disabled_for_unknown_debugger() {
        let unknown = connection();
        let chrome = connection_with(page(), Some("Mozilla/5.0 Chrome/122.0.0.0"));

        assert!(!VscodeRuntimeGetPropertiesHandler::new(unknown.connection.clone()).is_enabled());
        assert!(!VscodeRuntimeGetPropertiesHandler::new(chrome.connection.clone()).is_enabled());
        assert!(VscodeRuntimeGetPropertiesHandler::new(vscode_connection().connection).is_enabled());
    }
}
