//! Runtime Evaluate Handler - answers VS Code's Node.js probes
//!
//! VS Code assumes a Node.js target and evaluates two internal expressions
//! after attaching:
//! - a write to `process.env["NODE_OPTIONS"]` to inject its bootloader
//! - a telemetry read of `process.pid`, `process.version` and `process.arch`
//!
//! Neither exists on the device. Both are answered by the relay; every other
//! expression reaches the engine untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::connection::Connection;
use crate::debugger_type::{debugger_type, DebuggerType};
use crate::handler::MessageHandler;
use crate::protocol::{methods, CdpMessage};

static NODE_OPTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"process\.env(\[\s*["']NODE_OPTIONS["']\s*\]|\.NODE_OPTIONS\b)"#).unwrap()
});

pub struct VscodeRuntimeEvaluateHandler {
    connection: Arc<Connection>,
}

impl VscodeRuntimeEvaluateHandler {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    fn reply(&self, id: Option<u64>, result: Value) -> bool {
        self.connection
            .debugger
            .send_message(CdpMessage::response(id, json!({ "result": result })));
        true
    }
}

fn is_node_options_probe(expression: &str) -> bool {
    NODE_OPTIONS.is_match(expression)
}

fn is_node_telemetry_probe(expression: &str) -> bool {
    ["process.pid", "process.version", "process.arch"]
        .iter()
        .all(|needle| expression.contains(needle))
}

/// Architecture of the relay process, spelled the way Node.js reports it
fn node_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        other => other,
    }
}

fn relay_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

impl MessageHandler for VscodeRuntimeEvaluateHandler {
    fn name(&self) -> &str {
        "VscodeRuntimeEvaluateHandler"
    }

    fn is_enabled(&self) -> bool {
        debugger_type(&self.connection) == DebuggerType::Vscode
    }

    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::RUNTIME_EVALUATE) {
            return false;
        }

        let Some(expression) = message.param_str("expression") else {
            return false;
        };

        if is_node_options_probe(expression) {
            let vm = &self.connection.page.vm;
            return self.reply(
                message.id,
                json!({
                    "type": "string",
                    "value": format!("Environment variables are not supported by {vm} (NODE_OPTIONS)"),
                }),
            );
        }

        if is_node_telemetry_probe(expression) {
            return self.reply(
                message.id,
                json!({
                    "type": "object",
                    "value": {
                        "processId": self.connection.page.id,
                        "nodeVersion": relay_version(),
                        "architecture": node_arch(),
                    },
                }),
            );
        }

        false
    }
}
