use std::sync::Arc;

use anyhow::Result;
use codex_bridge_config::BridgeConfig;
use codex_bridge_exec::{CommandRunner, InvocationSpec, ProcessRunner};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
  CallToolResult, ErrorData as McpError, Implementation, ProtocolVersion, ServerCapabilities,
  ServerInfo,
};
use rmcp::{ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use tracing::info;

use crate::invocation::{exec_invocation, review_invocation};
use crate::params::{ExecParams, ReviewParams};
use crate::result::{ToolResult, package_outcome};

pub const SERVER_NAME: &str = "codex-bridge";

const INSTRUCTIONS: &str = "Runs the local codex CLI. codex_review reviews a git repository \
(uncommitted changes, a base branch, or a single commit) and returns the review text. \
codex_exec runs a task prompt with approvals and sandboxing bypassed.";

/// MCP server exposing `codex_review` and `codex_exec`.
#[derive(Clone)]
pub struct CodexBridgeServer {
  config: Arc<BridgeConfig>,
  runner: Arc<dyn CommandRunner>,
  tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CodexBridgeServer {
  pub fn new(config: Arc<BridgeConfig>) -> Self {
    Self::with_runner(config, Arc::new(ProcessRunner::new()))
  }

  pub fn with_runner(config: Arc<BridgeConfig>, runner: Arc<dyn CommandRunner>) -> Self {
    Self {
      config,
      runner,
      tool_router: Self::tool_router(),
    }
  }

  #[tool(description = "Run codex review on a git repository")]
  async fn codex_review(
    &self,
    Parameters(params): Parameters<ReviewParams>,
  ) -> Result<CallToolResult, McpError> {
    Ok(self.review(params).await.into())
  }

  #[tool(description = "Run codex exec with a prompt, bypassing approvals and sandbox")]
  async fn codex_exec(
    &self,
    Parameters(params): Parameters<ExecParams>,
  ) -> Result<CallToolResult, McpError> {
    Ok(self.exec(params).await.into())
  }

  pub async fn review(&self, params: ReviewParams) -> ToolResult {
    self.invoke(review_invocation(&self.config, &params)).await
  }

  pub async fn exec(&self, params: ExecParams) -> ToolResult {
    self.invoke(exec_invocation(&self.config, &params)).await
  }

  async fn invoke(&self, spec: InvocationSpec) -> ToolResult {
    package_outcome(self.runner.run(spec).await)
  }
}

#[tool_handler]
impl ServerHandler for CodexBridgeServer {
  fn get_info(&self) -> ServerInfo {
    ServerInfo {
      protocol_version: ProtocolVersion::LATEST,
      capabilities: ServerCapabilities::builder().enable_tools().build(),
      server_info: Implementation {
        name: SERVER_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ..Default::default()
      },
      instructions: Some(INSTRUCTIONS.to_string()),
    }
  }
}

/// Serve on stdin/stdout until the client disconnects.
pub async fn serve_stdio(config: BridgeConfig) -> Result<()> {
  let server = CodexBridgeServer::new(Arc::new(config));
  let service = server.serve(rmcp::transport::stdio()).await?;
  info!("server running on stdio");
  service.waiting().await?;
  Ok(())
}
