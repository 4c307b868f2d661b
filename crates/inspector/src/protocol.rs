//! CDP Message Envelope
//!
//! One envelope for every shape that crosses the relay: requests, responses,
//! events and error replies. Unknown top-level fields are kept so that a
//! message nobody intercepts leaves the relay exactly as it arrived.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request ID - correlates a request with its response
pub type RequestId = u64;

/// Method names the relay recognizes
pub mod methods {
    pub const NETWORK_GET_RESPONSE_BODY: &str = "Network.getResponseBody";
    pub const EXPO_NETWORK_RECEIVED_RESPONSE_BODY: &str = "Expo(Network.receivedResponseBody)";
    pub const PAGE_RELOAD: &str = "Page.reload";
    pub const DEBUGGER_GET_POSSIBLE_BREAKPOINTS: &str = "Debugger.getPossibleBreakpoints";
    pub const DEBUGGER_SET_BREAKPOINT_BY_URL: &str = "Debugger.setBreakpointByUrl";
    pub const RUNTIME_CALL_FUNCTION_ON: &str = "Runtime.callFunctionOn";
    pub const RUNTIME_EVALUATE: &str = "Runtime.evaluate";
    pub const RUNTIME_GET_PROPERTIES: &str = "Runtime.getProperties";
}

/// CDP message traveling in either direction
///
/// A request carries `id` + `method`, a response carries `id` + `result`
/// (or `error`), and an event carries `method` without `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdpMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,

    /// Everything else (e.g. `sessionId`), forwarded untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CdpMessage {
    pub fn request(id: RequestId, method: impl Into<String>, params: Value) -> Self {
        Self {
            id: Some(id),
            method: Some(method.into()),
            params: Some(params),
            ..Default::default()
        }
    }

    /// Reply to the request with the given id
    pub fn response(id: Option<RequestId>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn event(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: Some(method.into()),
            params: Some(params),
            ..Default::default()
        }
    }

    pub fn is_method(&self, method: &str) -> bool {
        self.method.as_deref() == Some(method)
    }

    /// Unsolicited event (no correlation id)
    pub fn is_event(&self) -> bool {
        self.id.is_none() && self.method.is_some()
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.as_ref()?.get(key)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key)?.as_str()
    }

    pub fn params_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.params.as_mut()?.as_object_mut()
    }
}
