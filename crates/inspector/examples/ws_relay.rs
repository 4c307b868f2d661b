//! Relay example - one device, one debugger, loopback only
//!
//! Device:   ws://127.0.0.1:8081/inspector/device?device=sim&name=Simulator&app=com.example
//! Debugger: ws://127.0.0.1:8082/inspector/debug?device=sim&page=1

use inspector::transport::{accept_debugger, accept_device, spawn_endpoint};
use inspector::{
    Bundler, Connection, DebuggerEndpoint, DeviceEndpoint, HandlerRegistry, Page, RelayConfig,
    RelaySession, SessionRegistry,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::TcpListener;

struct LoggingBundler;

impl Bundler for LoggingBundler {
    fn broadcast_message(&self, name: &str) {
        tracing::info!("Bundler broadcast: {}", name);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let device_listener = TcpListener::bind("127.0.0.1:8081").await?;
    let debugger_listener = TcpListener::bind("127.0.0.1:8082").await?;
    println!("Waiting for a device on 8081 and a debugger on 8082");

    let (stream, _) = device_listener.accept().await?;
    let (device_ws, device_info) = accept_device(stream).await?;

    let (stream, _) = debugger_listener.accept().await?;
    let (debugger_ws, handshake) = accept_debugger(stream).await?;

    if handshake.target.device != device_info.id {
        return Err(format!("Unknown device: {}", handshake.target.device).into());
    }

    let (device_send, device_rx) = spawn_endpoint(device_ws, "device");
    let (debugger_send, debugger_rx) = spawn_endpoint(debugger_ws, "debugger");

    let page = Page {
        id: handshake.target.page,
        title: device_info.name.clone(),
        vm: "Hermes".to_string(),
        app: device_info.app.clone(),
        capabilities: HashSet::new(),
    };
    let connection = Arc::new(Connection::new(
        page,
        DebuggerEndpoint::new(debugger_send, handshake.user_agent),
        DeviceEndpoint::new(device_info.id, device_info.name, device_info.app, device_send),
    ));

    let config = RelayConfig::default();
    let registry = HandlerRegistry::new(connection, Arc::new(LoggingBundler), &config);

    let sessions = SessionRegistry::new();
    let stats = sessions
        .spawn(RelaySession::new(registry), debugger_rx, device_rx)
        .await?;

    println!("Session finished: {:?}", stats);
    Ok(())
}
