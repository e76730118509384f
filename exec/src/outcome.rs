//! Terminal results of a process invocation

use std::time::Duration;

use thiserror::Error;

/// Which child stream a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
  Stdout,
  Stderr,
}

/// Bytes collected from the child's output streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
}

impl CapturedOutput {
  pub fn total_len(&self) -> usize {
    self.stdout.len() + self.stderr.len()
  }

  pub fn is_empty(&self) -> bool {
    self.total_len() == 0
  }

  pub fn stdout_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stdout).into_owned()
  }

  pub fn stderr_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stderr).into_owned()
  }

  /// Appends `chunk` without letting the combined size pass `limit`.
  ///
  /// Returns `false` when part of the chunk had to be dropped; the bytes that
  /// fit are kept so the caller still has something to show.
  pub(crate) fn append_capped(&mut self, kind: StreamKind, chunk: &[u8], limit: usize) -> bool {
    let remaining = limit.saturating_sub(self.total_len());
    let fits = chunk.len() <= remaining;
    let take = if fits { chunk.len() } else { remaining };

    let target = match kind {
      StreamKind::Stdout => &mut self.stdout,
      StreamKind::Stderr => &mut self.stderr,
    };
    target.extend_from_slice(&chunk[..take]);
    fits
  }
}

/// Why a process did not complete successfully.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
  /// Ran to completion but reported failure (or died from a signal).
  #[error("process exited unsuccessfully")]
  NonZeroExit,

  /// Could not be started or supervised.
  #[error("failed to spawn process: {message}")]
  SpawnError { message: String },

  /// Killed after running past its deadline.
  #[error("process timed out after {}ms", after.as_millis())]
  Timeout { after: Duration },

  /// Killed after writing more than the output cap.
  #[error("process output exceeded {limit} bytes")]
  OutputTooLarge { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
  /// Absent when the process never started, was killed, or died from a signal.
  pub exit_code: Option<i32>,
  pub output: CapturedOutput,
  pub cause: FailureCause,
}

/// Produced exactly once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
  /// Exit code 0.
  Success(CapturedOutput),
  Failure(ProcessFailure),
}

impl ProcessOutcome {
  pub fn failure(exit_code: Option<i32>, output: CapturedOutput, cause: FailureCause) -> Self {
    ProcessOutcome::Failure(ProcessFailure {
      exit_code,
      output,
      cause,
    })
  }

  pub fn spawn_error(message: impl Into<String>) -> Self {
    Self::failure(
      None,
      CapturedOutput::default(),
      FailureCause::SpawnError {
        message: message.into(),
      },
    )
  }

  pub fn is_success(&self) -> bool {
    matches!(self, ProcessOutcome::Success(_))
  }

  pub fn output(&self) -> &CapturedOutput {
    match self {
      ProcessOutcome::Success(output) => output,
      ProcessOutcome::Failure(failure) => &failure.output,
    }
  }

  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ProcessOutcome::Success(_) => Some(0),
      ProcessOutcome::Failure(failure) => failure.exit_code,
    }
  }
}
