// Codex Bridge MCP Server
// Tool adapter between MCP tool calls and the codex CLI

pub mod invocation;
pub mod params;
pub mod result;
pub mod server;

pub use params::{ExecParams, ReviewParams};
pub use result::ToolResult;
pub use server::{CodexBridgeServer, SERVER_NAME, serve_stdio};
