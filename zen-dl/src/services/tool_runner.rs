//! External process execution
//!
//! The child runs on the tokio runtime; the request future waits on it
//! together with a wall-clock timeout and a cancellation token. Dropping the
//! wait kills the child (`kill_on_drop`).

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Process runner errors
#[derive(Debug, Error)]
pub enum RunError {
    /// Program missing or not executable
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Wall-clock limit exceeded; the child was killed
    #[error("Process exceeded timeout of {0:?}")]
    Timeout(Duration),

    /// Cancelled from outside (service shutdown)
    #[error("Process cancelled")]
    Cancelled,

    /// Failure while collecting output
    #[error("Process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully specified command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// None when killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools. Implemented by [`ProcessRunner`] and by test doubles.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &ToolInvocation,
        cancel: CancellationToken,
    ) -> Result<ToolOutput, RunError>;
}

/// Runs tools as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(
        &self,
        invocation: &ToolInvocation,
        cancel: CancellationToken,
    ) -> Result<ToolOutput, RunError> {
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        tokio::select! {
            result = child.wait_with_output() => {
                let output = result?;
                Ok(ToolOutput {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            _ = tokio::time::sleep(invocation.timeout) => Err(RunError::Timeout(invocation.timeout)),
            _ = cancel.cancelled() => Err(RunError::Cancelled),
        }
    }
}

/// First line of `program --version`, or None if the program cannot run
pub async fn probe_version(runner: &dyn ToolRunner, program: &str) -> Option<String> {
    let invocation = ToolInvocation {
        program: program.to_string(),
        args: vec!["--version".to_string()],
        timeout: Duration::from_secs(10),
    };
    match runner.run(&invocation, CancellationToken::new()).await {
        Ok(output) if output.success => output
            .stdout
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty()),
        _ => None,
    }
}
