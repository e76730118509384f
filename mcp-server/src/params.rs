use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments for `codex_review`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewParams {
  /// Working directory (must be a git repo)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cwd: Option<String>,
  /// Review uncommitted changes
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uncommitted: Option<bool>,
  /// Base branch for diff
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub base: Option<String>,
  /// Specific commit SHA to review
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commit: Option<String>,
  /// PR title for context
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  /// Additional review prompt
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prompt: Option<String>,
}

/// Arguments for `codex_exec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExecParams {
  /// Working directory
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cwd: Option<String>,
  /// The task prompt for Codex
  pub prompt: String,
}

/// Treats `Some("")` like `None`.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|value| !value.is_empty())
}
