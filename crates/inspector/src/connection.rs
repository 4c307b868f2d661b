//! Connection - one debugging session
//!
//! A connection groups the debuggable page, the debugger client (IDE or
//! DevTools) and the device running the app. All handlers of a session share
//! it through an `Arc`; dropping the session drops the connection and with it
//! both outbound writers.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::protocol::CdpMessage;

/// Outbound message callback for one endpoint
pub type SendMessage = Arc<dyn Fn(CdpMessage) + Send + Sync>;

/// Capability advertised when the device serves `Network.getResponseBody` itself
pub const NATIVE_NETWORK_INSPECTION: &str = "nativeNetworkInspection";

/// Debuggable JS context registered by a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub vm: String,
    pub app: String,
    #[serde(default, deserialize_with = "deserialize_capabilities")]
    pub capabilities: HashSet<String>,
}

impl Page {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Older runtimes report capabilities as a list of names, newer ones as a
/// map of `name: bool`. Only enabled flags are kept.
fn deserialize_capabilities<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Capabilities {
        List(Vec<String>),
        Flags(BTreeMap<String, bool>),
    }

    Ok(match Option::<Capabilities>::deserialize(deserializer)? {
        Some(Capabilities::List(names)) => names.into_iter().collect(),
        Some(Capabilities::Flags(flags)) => flags
            .into_iter()
            .filter_map(|(name, enabled)| enabled.then_some(name))
            .collect(),
        None => HashSet::new(),
    })
}

/// IDE / browser side of the session
#[derive(Clone)]
pub struct DebuggerEndpoint {
    send: SendMessage,
    pub user_agent: Option<String>,
}

impl DebuggerEndpoint {
    pub fn new(send: SendMessage, user_agent: Option<String>) -> Self {
        Self { send, user_agent }
    }

    pub fn send_message(&self, message: CdpMessage) {
        (self.send)(message)
    }
}

impl fmt::Debug for DebuggerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebuggerEndpoint")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Running app instance
#[derive(Clone)]
pub struct DeviceEndpoint {
    pub id: String,
    pub name: String,
    pub app_id: String,
    send: SendMessage,
}

impl DeviceEndpoint {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        app_id: impl Into<String>,
        send: SendMessage,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            app_id: app_id.into(),
            send,
        }
    }

    pub fn send_message(&self, message: CdpMessage) {
        (self.send)(message)
    }
}

impl fmt::Debug for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceEndpoint")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

/// Page + debugger + device, all present for the whole session
#[derive(Debug, Clone)]
pub struct Connection {
    pub page: Page,
    pub debugger: DebuggerEndpoint,
    pub device: DeviceEndpoint,
}

impl Connection {
    pub fn new(page: Page, debugger: DebuggerEndpoint, device: DeviceEndpoint) -> Self {
        Self {
            page,
            debugger,
            device,
        }
    }
}
