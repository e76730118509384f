// Codex Bridge Exec
// Spawns and supervises one external process per invocation

pub mod outcome;
pub mod runner;
pub mod spec;

pub use outcome::{CapturedOutput, FailureCause, ProcessFailure, ProcessOutcome};
pub use runner::{CommandRunner, ProcessRunner};
pub use spec::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT, InvocationSpec, NO_COLOR_VAR};
