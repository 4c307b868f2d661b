//! Set Breakpoint By URL Handler - neutralizes unresolvable breakpoints
//!
//! VS Code sometimes treats the HTTP bundle URL as a file path and asks for a
//! breakpoint on `file://http:/localhost:8081/...` (or the LAN / HTTPS variant).
//! The engine cannot parse that and binds the breakpoint somewhere wrong, so
//! the regex is swapped for a literal URL that never matches. The request is
//! still forwarded to the device.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::Arc;

use crate::connection::Connection;
use crate::debugger_type::{debugger_type, DebuggerType};
use crate::handler::MessageHandler;
use crate::protocol::{methods, CdpMessage};

pub const INVALID_BREAKPOINT_URL: &str = "file://__invalid_url__";

/// `[aA]` style classes emitted for case-insensitive file systems
static CASE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([a-zA-Z])([a-zA-Z])\]").unwrap());

static ESCAPED_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(.)").unwrap());

pub struct VscodeSetBreakpointByUrlHandler {
    connection: Arc<Connection>,
}

impl VscodeSetBreakpointByUrlHandler {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

/// Whether `url_regex` targets an HTTP URL wrapped as a file path
fn is_http_as_file_regex(url_regex: &str) -> bool {
    let folded = CASE_CLASS.replace_all(url_regex, |caps: &Captures| {
        let (a, b) = (&caps[1], &caps[2]);
        if a.eq_ignore_ascii_case(b) {
            a.to_ascii_lowercase()
        } else {
            caps[0].to_string()
        }
    });
    let unescaped = ESCAPED_CHAR.replace_all(&folded, "$1");
    let pattern = unescaped.trim_start_matches('^').to_ascii_lowercase();

    pattern.starts_with("file://http:/") || pattern.starts_with("file://https:/")
}

impl MessageHandler for VscodeSetBreakpointByUrlHandler {
    fn name(&self) -> &str {
        "VscodeSetBreakpointByUrlHandler"
    }

    fn is_enabled(&self) -> bool {
        debugger_type(&self.connection) == DebuggerType::Vscode
    }

    fn handle_debugger_message(&mut self, message: &mut CdpMessage) -> bool {
        if !message.is_method(methods::DEBUGGER_SET_BREAKPOINT_BY_URL) {
            return false;
        }

        let wrong_regex = message
            .param_str("urlRegex")
            .is_some_and(is_http_as_file_regex);

        if wrong_regex {
            if let Some(params) = message.params_mut() {
                params.remove("urlRegex");
                params.insert("url".to_string(), Value::from(INVALID_BREAKPOINT_URL));
                tracing::debug!("[VscodeSetBreakpointByUrlHandler] Unbound breakpoint regex");
            }
        }

        // Always forwarded, possibly rewritten
        false
    }
}
