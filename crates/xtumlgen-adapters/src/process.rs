//! Toolchain process launches via `tokio::process`.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};
use xtumlgen_core::{
    application::{
        ApplicationError,
        ports::{ProcessExit, ProcessRunner},
    },
    domain::{Invocation, StreamMode},
    error::CodegenResult,
};

/// [`ProcessRunner`] that spawns real child processes.
///
/// Child output is either inherited or discarded, never captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn stdio(mode: StreamMode) -> Stdio {
    match mode {
        StreamMode::Inherit => Stdio::inherit(),
        StreamMode::Suppress => Stdio::null(),
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt as _;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    #[instrument(skip_all, fields(program = %invocation.program_name()))]
    async fn run(&self, invocation: &Invocation) -> CodegenResult<ProcessExit> {
        debug!(command = %invocation, "Spawning");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(stdio(invocation.stdio.stdin))
            .stdout(stdio(invocation.stdio.stdout))
            .stderr(stdio(invocation.stdio.stderr))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| ApplicationError::ProcessSpawnFailed {
                program: invocation.program_name(),
                reason: e.to_string(),
            })?;

        let exit = ProcessExit {
            code: status.code(),
            signal: exit_signal(&status),
        };
        debug!(code = ?exit.code, signal = ?exit.signal, "Process exited");

        if status.success() {
            Ok(exit)
        } else {
            Err(ApplicationError::ProcessExited {
                program: invocation.program_name(),
                code: exit.code,
                signal: exit.signal,
            }
            .into())
        }
    }
}
