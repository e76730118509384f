//! Turns process outcomes into tool results

use codex_bridge_exec::{CapturedOutput, FailureCause, ProcessFailure, ProcessOutcome};
use rmcp::model::{CallToolResult, Content};

/// Text returned when codex printed nothing at all.
pub const NO_OUTPUT_PLACEHOLDER: &str = "(no output)";

/// Result of one tool call, either the report text or an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
  Text(String),
  Error(String),
}

impl ToolResult {
  pub fn is_error(&self) -> bool {
    matches!(self, ToolResult::Error(_))
  }

  pub fn message(&self) -> &str {
    match self {
      ToolResult::Text(text) | ToolResult::Error(text) => text,
    }
  }
}

impl From<ToolResult> for CallToolResult {
  fn from(result: ToolResult) -> Self {
    match result {
      ToolResult::Text(text) => CallToolResult::success(vec![Content::text(text)]),
      ToolResult::Error(message) => CallToolResult::error(vec![Content::text(message)]),
    }
  }
}

/// A non-zero exit still yields text: codex reports review findings that way.
pub fn package_outcome(outcome: ProcessOutcome) -> ToolResult {
  match outcome {
    ProcessOutcome::Success(output) => ToolResult::Text(report_text(&output)),
    ProcessOutcome::Failure(ProcessFailure {
      cause: FailureCause::NonZeroExit,
      output,
      ..
    }) => ToolResult::Text(report_text(&output)),
    ProcessOutcome::Failure(failure) => ToolResult::Error(error_message(&failure)),
  }
}

/// stdout if present, else stderr, else the placeholder.
pub fn report_text(output: &CapturedOutput) -> String {
  if !output.stdout.is_empty() {
    output.stdout_lossy()
  } else if !output.stderr.is_empty() {
    output.stderr_lossy()
  } else {
    NO_OUTPUT_PLACEHOLDER.to_string()
  }
}

/// Headline naming the cause and exit code, then stdout and stderr.
pub fn error_message(failure: &ProcessFailure) -> String {
  let code = failure
    .exit_code
    .map_or_else(|| "unknown".to_string(), |code| code.to_string());
  let headline = match &failure.cause {
    FailureCause::NonZeroExit => format!("codex exited with code {code}"),
    FailureCause::SpawnError { message } => format!("codex exited with code {code}: {message}"),
    FailureCause::Timeout { after } => {
      format!("codex timed out after {}ms (exit code {code})", after.as_millis())
    }
    FailureCause::OutputTooLarge { limit } => {
      format!("codex output exceeded {limit} bytes (exit code {code})")
    }
  };

  let stdout = failure.output.stdout_lossy();
  let stderr = failure.output.stderr_lossy();
  let separator = if !stdout.is_empty() && !stderr.is_empty() {
    "\n"
  } else {
    ""
  };
  format!("{headline}\n{stdout}{separator}{stderr}")
    .trim()
    .to_string()
}
