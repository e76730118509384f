use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::outcome::{CapturedOutput, FailureCause, ProcessOutcome, StreamKind};
use crate::spec::{InvocationSpec, NO_COLOR_VAR};

const READ_CHUNK_SIZE: usize = 8 * 1024;
const CHUNK_CHANNEL_CAPACITY: usize = 64;

/// Executes one invocation and resolves to exactly one outcome.
#[async_trait]
pub trait CommandRunner: Send + Sync {
  async fn run(&self, spec: InvocationSpec) -> ProcessOutcome;
}

/// Runs invocations as real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
  async fn run(&self, spec: InvocationSpec) -> ProcessOutcome {
    info!("running: {}", spec.display_command());

    let outcome = supervise(spec).await;
    log_outcome(&outcome);
    outcome
  }
}

async fn supervise(spec: InvocationSpec) -> ProcessOutcome {
  let mut command = Command::new(&spec.command);
  command
    .args(&spec.arguments)
    .envs(&spec.env)
    .env(NO_COLOR_VAR, "1")
    .stdin(if spec.stdin.is_some() {
      Stdio::piped()
    } else {
      Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);
  if let Some(cwd) = &spec.cwd {
    command.current_dir(cwd);
  }

  let mut child = match command.spawn() {
    Ok(child) => child,
    Err(err) => {
      return ProcessOutcome::spawn_error(format!("{}: {err}", spec.command));
    }
  };

  // The deadline counts from spawn.
  let timer = tokio::time::sleep(spec.timeout);
  tokio::pin!(timer);

  if let (Some(input), Some(mut stdin)) = (spec.stdin, child.stdin.take()) {
    tokio::spawn(async move {
      if let Err(err) = stdin.write_all(&input).await {
        debug!("stdin closed before the prompt was fully written: {err}");
      }
      // Dropping the handle closes the pipe.
    });
  }

  let (tx, mut rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
  let mut pumps = Vec::with_capacity(2);
  if let Some(stdout) = child.stdout.take() {
    pumps.push(tokio::spawn(pump(stdout, StreamKind::Stdout, tx.clone())));
  }
  if let Some(stderr) = child.stderr.take() {
    pumps.push(tokio::spawn(pump(stderr, StreamKind::Stderr, tx.clone())));
  }
  drop(tx);

  let mut captured = CapturedOutput::default();

  // Both streams are drained before the exit status is considered.
  loop {
    tokio::select! {
      chunk = rx.recv() => match chunk {
        Some((kind, bytes)) => {
          if !captured.append_capped(kind, &bytes, spec.max_output_bytes) {
            terminate(&mut child, &pumps).await;
            return ProcessOutcome::failure(
              None,
              captured,
              FailureCause::OutputTooLarge { limit: spec.max_output_bytes },
            );
          }
        }
        None => break,
      },
      () = &mut timer => {
        terminate(&mut child, &pumps).await;
        return ProcessOutcome::failure(
          None,
          captured,
          FailureCause::Timeout { after: spec.timeout },
        );
      }
    }
  }

  let status = tokio::select! {
    status = child.wait() => status,
    () = &mut timer => {
      terminate(&mut child, &pumps).await;
      return ProcessOutcome::failure(
        None,
        captured,
        FailureCause::Timeout { after: spec.timeout },
      );
    }
  };

  match status {
    Ok(status) => from_exit_status(status, captured),
    Err(err) => ProcessOutcome::failure(
      None,
      captured,
      FailureCause::SpawnError {
        message: format!("failed to wait for {}: {err}", spec.command),
      },
    ),
  }
}

fn from_exit_status(status: ExitStatus, captured: CapturedOutput) -> ProcessOutcome {
  if status.success() {
    ProcessOutcome::Success(captured)
  } else {
    ProcessOutcome::failure(status.code(), captured, FailureCause::NonZeroExit)
  }
}

/// Forwards a child stream to the supervisor in chunks until EOF.
async fn pump<R>(mut reader: R, kind: StreamKind, tx: mpsc::Sender<(StreamKind, Vec<u8>)>)
where
  R: AsyncRead + Unpin,
{
  let mut buf = vec![0u8; READ_CHUNK_SIZE];
  loop {
    match reader.read(&mut buf).await {
      Ok(0) => break,
      Ok(n) => {
        if tx.send((kind, buf[..n].to_vec())).await.is_err() {
          break;
        }
      }
      Err(err) => {
        debug!("{kind:?} read failed: {err}");
        break;
      }
    }
  }
}

/// Kills the child and stops reading its pipes. Aborting the pumps drops the
/// read ends, so a grandchild still holding the pipes cannot keep them alive.
async fn terminate(child: &mut Child, pumps: &[JoinHandle<()>]) {
  if let Err(err) = child.kill().await {
    warn!("failed to kill child process: {err}");
  }
  for pump in pumps {
    pump.abort();
  }
}

fn log_outcome(outcome: &ProcessOutcome) {
  match outcome {
    ProcessOutcome::Success(output) => {
      if !output.stderr.is_empty() {
        info!("stderr: {}", output.stderr_lossy());
      }
    }
    ProcessOutcome::Failure(failure) => {
      match failure.exit_code {
        Some(code) => warn!("exited with code {code}: {}", failure.cause),
        None => warn!("exited with code unknown: {}", failure.cause),
      }
      if !failure.output.stderr.is_empty() {
        warn!("stderr: {}", failure.output.stderr_lossy());
      }
    }
  }
}
