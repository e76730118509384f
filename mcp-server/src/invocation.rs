//! Maps tool parameters onto codex command lines

use std::path::PathBuf;

use codex_bridge_config::BridgeConfig;
use codex_bridge_exec::InvocationSpec;

use crate::params::{ExecParams, ReviewParams, non_empty};

pub const REVIEW_SUBCOMMAND: &str = "review";
pub const EXEC_SUBCOMMAND: &str = "exec";
pub const UNCOMMITTED_FLAG: &str = "--uncommitted";
pub const BASE_FLAG: &str = "--base";
pub const COMMIT_FLAG: &str = "--commit";
pub const TITLE_FLAG: &str = "--title";
pub const BYPASS_FLAG: &str = "--dangerously-bypass-approvals-and-sandbox";

/// Builds the `codex review` invocation.
///
/// `--uncommitted` cannot be combined with a positional prompt, so in that
/// case the prompt is piped through stdin instead of appended to the argv.
pub fn review_invocation(config: &BridgeConfig, params: &ReviewParams) -> InvocationSpec {
  let uncommitted = params.uncommitted.unwrap_or(false);
  let mut args = vec![REVIEW_SUBCOMMAND.to_string()];

  if uncommitted {
    args.push(UNCOMMITTED_FLAG.to_string());
  }
  for (flag, value) in [
    (BASE_FLAG, &params.base),
    (COMMIT_FLAG, &params.commit),
    (TITLE_FLAG, &params.title),
  ] {
    if let Some(value) = non_empty(value) {
      args.push(flag.to_string());
      args.push(value.to_string());
    }
  }

  let mut stdin = None;
  if let Some(prompt) = non_empty(&params.prompt) {
    if uncommitted {
      stdin = Some(prompt.as_bytes().to_vec());
    } else {
      args.push(prompt.to_string());
    }
  }

  base_invocation(config, args, &params.cwd).with_stdin(stdin)
}

/// Builds the `codex exec` invocation. The prompt is always positional.
pub fn exec_invocation(config: &BridgeConfig, params: &ExecParams) -> InvocationSpec {
  let args = vec![
    EXEC_SUBCOMMAND.to_string(),
    BYPASS_FLAG.to_string(),
    params.prompt.clone(),
  ];

  base_invocation(config, args, &params.cwd)
}

fn base_invocation(config: &BridgeConfig, args: Vec<String>, cwd: &Option<String>) -> InvocationSpec {
  InvocationSpec::new(config.codex_path.clone(), args)
    .with_cwd(non_empty(cwd).map(PathBuf::from))
    .with_env(config.env.clone())
    .with_timeout(config.timeout())
    .with_max_output_bytes(config.max_output_bytes())
}
