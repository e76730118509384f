use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Wall-clock limit applied when the caller does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Combined stdout + stderr cap applied when the caller does not set one.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Always set in the child's environment so captured text carries no ANSI codes.
pub const NO_COLOR_VAR: &str = "NO_COLOR";

/// Fully resolved description of one external process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
  pub command: String,
  pub arguments: Vec<String>,
  /// `None` inherits the bridge's current directory.
  pub cwd: Option<PathBuf>,
  /// Written in full to the child's stdin, which is then closed.
  pub stdin: Option<Vec<u8>>,
  /// Applied on top of the inherited environment.
  pub env: BTreeMap<String, String>,
  pub timeout: Duration,
  pub max_output_bytes: usize,
}

impl InvocationSpec {
  pub fn new(command: impl Into<String>, arguments: Vec<String>) -> Self {
    Self {
      command: command.into(),
      arguments,
      cwd: None,
      stdin: None,
      env: BTreeMap::new(),
      timeout: DEFAULT_TIMEOUT,
      max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
    }
  }

  pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
    self.cwd = cwd;
    self
  }

  pub fn with_stdin(mut self, stdin: Option<Vec<u8>>) -> Self {
    self.stdin = stdin;
    self
  }

  pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
    self.env = env;
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
    self.max_output_bytes = max_output_bytes;
    self
  }

  /// `command arg1 arg2 ...`, for diagnostics only.
  pub fn display_command(&self) -> String {
    std::iter::once(self.command.as_str())
      .chain(self.arguments.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}
