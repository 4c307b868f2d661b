//! Concrete Handler Implementations
//!
//! Each handler is a separate module. The VS Code family only activates when
//! the attached debugger identifies as VS Code.

pub mod network_response;
pub mod page_reload;
pub mod vscode_get_possible_breakpoints;
pub mod vscode_runtime_call_function_on;
pub mod vscode_runtime_evaluate;
pub mod vscode_runtime_get_properties;
pub mod vscode_set_breakpoint_by_url;

pub use network_response::NetworkResponseHandler;
pub use page_reload::{Bundler, PageReloadHandler};
pub use vscode_get_possible_breakpoints::VscodeGetPossibleBreakpointsHandler;
pub use vscode_runtime_call_function_on::VscodeRuntimeCallFunctionOnHandler;
pub use vscode_runtime_evaluate::VscodeRuntimeEvaluateHandler;
pub use vscode_runtime_get_properties::VscodeRuntimeGetPropertiesHandler;
pub use vscode_set_breakpoint_by_url::VscodeSetBreakpointByUrlHandler;
