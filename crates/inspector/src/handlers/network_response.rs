//! Network Response Handler - serves `Network.getResponseBody` from the relay
//!
//! Engines without native network inspection push response bodies through a
//! custom `Expo(Network.receivedResponseBody)` event. The bodies are kept per
//! connection and replayed when the debugger asks for them.

use lru::LruCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::connection::{Connection, NATIVE_NETWORK_INSPECTION};
use crate::handler::MessageHandler;
use crate::protocol::{methods, CdpMessage};

/// Stored body, serialized as the `Network.getResponseBody` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub body: String,
    #[serde(default)]
    pub base64_encoded: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceivedResponseBody {
    request_id: String,
    #[serde(flatten)]
    response: ResponseBody,
}

pub struct NetworkResponseHandler {
    connection: Arc<Connection>,

    /// Bodies by `requestId`, least recently used evicted first
    storage: LruCache<String, ResponseBody>,
}

impl NetworkResponseHandler {
    pub fn new(connection: Arc<Connection>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            connection,
            storage: LruCache::new(capacity),
        }
    }

    /// Number of cached bodies (for testing)
    pub fn stored_count(&self) -> usize {
        self.storage.len()
    }
}

impl MessageHandler for NetworkResponseHandler {
    fn name(&self) -> &str {
        "NetworkResponseHandler"
    }

    fn is_enabled(&self) -> bool {
        !self.connection.page.has_capability(NATIVE_NETWORK_INSPECTION)
    }

    fn handle_device_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::EXPO_NETWORK_RECEIVED_RESPONSE_BODY) {
            return false;
        }

        let params = message.params.take().unwrap_or(Value::Null);
        match serde_json::from_value::<ReceivedResponseBody>(params) {
            Ok(received) => {
                tracing::debug!(
                    "[NetworkResponseHandler] Stored body for request {}",
                    received.request_id
                );
                self.storage.put(received.request_id, received.response);
            }
            Err(e) => {
                tracing::warn!("[NetworkResponseHandler] Dropped malformed body event: {}", e);
            }
        }

        // The custom event never reaches the debugger
        true
    }

    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::NETWORK_GET_RESPONSE_BODY) {
            return false;
        }

        let Some(request_id) = message.param_str("requestId") else {
            return false;
        };
        let Some(response) = self.storage.get(request_id) else {
            return false;
        };

        let result = serde_json::json!({
            "body": response.body,
            "base64Encoded": response.base64_encoded,
        });
        self.connection
            .debugger
            .send_message(CdpMessage::response(message.id, result));
        true
    }
}
