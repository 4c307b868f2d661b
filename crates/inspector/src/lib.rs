//! Inspector Relay
//!
//! Sits between a CDP debugger (an IDE or DevTools) and an app running an
//! embedded JavaScript engine, and papers over what the engine's debug server
//! does not implement. Most traffic passes through untouched; a small fixed
//! set of methods is answered, rewritten or swallowed by handlers.
//!
//! ```text
//! debugger ──▶ HandlerRegistry ──▶ device
//!          ◀──  (first handler  ◀──
//!                that consumes)
//! ```

pub mod config;
pub mod connection;
pub mod debugger_type;
pub mod events;
pub mod handler;
pub mod handlers;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::RelayConfig;
pub use connection::{Connection, DebuggerEndpoint, DeviceEndpoint, Page, SendMessage};
pub use debugger_type::{debugger_type, DebuggerType};
pub use events::{EventBus, RelayEvent};
pub use handler::{HandlerRegistry, MessageHandler};
pub use handlers::Bundler;
pub use protocol::CdpMessage;
pub use session::{RelaySession, SessionRegistry};
pub use transport::{RelayError, Result};
