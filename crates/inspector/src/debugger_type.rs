//! Debugger client family detection
//!
//! Some workarounds only apply to one IDE. The family is derived from the
//! user-agent the client announced when it connected.

use std::fmt;

use crate::connection::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebuggerType {
    Vscode,
    Unknown,
}

impl DebuggerType {
    /// Absent or unrecognized user-agents are `Unknown`
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(agent) if agent.to_ascii_lowercase().contains("vscode") => Self::Vscode,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vscode => "vscode",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DebuggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn debugger_type(connection: &Connection) -> DebuggerType {
    DebuggerType::from_user_agent(connection.debugger.user_agent.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::*;

    #[test]
    fn test_vscode_user_agents() {
        assert_eq!(
            DebuggerType::from_user_agent(Some("vscode/1.87.0 vscode-expo-tools/1.3.0")),
            DebuggerType::Vscode
        );
        assert_eq!(
            DebuggerType::from_user_agent(Some("VSCode")),
            DebuggerType::Vscode
        );
    }

    #[test]
    fn test_other_user_agents_are_unknown() {
        let chrome = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                      (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

        assert_eq!(DebuggerType::from_user_agent(Some(chrome)), DebuggerType::Unknown);
        assert_eq!(DebuggerType::from_user_agent(Some("")), DebuggerType::Unknown);
        assert_eq!(DebuggerType::from_user_agent(None), DebuggerType::Unknown);
    }

    #[test]
    fn test_from_connection() {
        assert_eq!(debugger_type(&vscode_connection().connection), DebuggerType::Vscode);
        assert_eq!(debugger_type(&connection().connection), DebuggerType::Unknown);
        assert_eq!(DebuggerType::Vscode.to_string(), "vscode");
    }
}
