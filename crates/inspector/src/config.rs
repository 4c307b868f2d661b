//! Relay configuration

use serde::{Deserialize, Serialize};

/// Default bound for the per-connection response body cache
pub const DEFAULT_CACHE_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Response bodies kept per connection before the least recently used is evicted
    pub network_response_cache_size: usize,

    /// Register the VS Code workaround handlers at all
    pub enable_vscode_handlers: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            network_response_cache_size: DEFAULT_CACHE_SIZE,
            enable_vscode_handlers: true,
        }
    }
}
