//! External-process execution behind an injectable trait.
//!
//! The transcode stage never talks to [`tokio::process`] directly; it goes
//! through [`ToolRunner`] so tests can substitute a fake that fabricates the
//! tool's side effects on disk without any external binary installed.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::TranscodeError;

/// One invocation of an external tool: the program plus its full argument
/// list, already rendered to strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
}

/// What a finished tool run reports back.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

impl ToolOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr: String::new(),
        }
    }

    /// Human-readable exit disposition for error messages.
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs an external tool to completion.
///
/// Implementations must honor `cancel`: once the token fires, the spawned
/// process is terminated and the run resolves to
/// [`TranscodeError::Cancelled`].
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(
        &self,
        invocation: ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, TranscodeError>;
}

/// Production runner: spawns the real process with stdout discarded and
/// stderr captured for diagnostics.
pub struct SystemToolRunner;

#[async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(
        &self,
        invocation: ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, TranscodeError> {
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TranscodeError::Process {
                program: invocation.program.clone(),
                source,
            })?;

        // kill_on_drop tears the process down when the cancelled branch wins
        // and the wait future is dropped.
        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.map_err(|source| TranscodeError::Process {
                    program: invocation.program.clone(),
                    source,
                })?;

                Ok(ToolOutput {
                    success: output.status.success(),
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            _ = cancel.cancelled() => {
                tracing::warn!(program = %invocation.program, "Tool run cancelled; process terminated");
                Err(TranscodeError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_distinguishes_signal_from_exit() {
        let by_code = ToolOutput {
            success: false,
            code: Some(187),
            stderr: String::new(),
        };
        assert_eq!(by_code.status_label(), "exit code 187");

        let by_signal = ToolOutput {
            success: false,
            code: None,
            stderr: String::new(),
        };
        assert_eq!(by_signal.status_label(), "terminated by signal");
    }

    #[tokio::test]
    async fn test_missing_program_is_a_process_error() {
        let runner = SystemToolRunner;
        let invocation = ToolInvocation {
            program: "/nonexistent/definitely-not-a-tool".to_string(),
            args: vec![],
        };

        let err = runner
            .run(invocation, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Process { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation_terminates_a_running_process() {
        let runner = SystemToolRunner;
        let invocation = ToolInvocation {
            program: "sleep".to_string(),
            args: vec!["30".to_string()],
        };

        let cancel = CancellationToken::new();
        let run = runner.run(invocation, &cancel);
        tokio::pin!(run);

        // Give the process a moment to spawn, then cancel.
        tokio::select! {
            _ = &mut run => panic!("sleep should not finish first"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
        }
        cancel.cancel();

        let err = run.await.unwrap_err();
        assert!(matches!(err, TranscodeError::Cancelled));
    }
}
