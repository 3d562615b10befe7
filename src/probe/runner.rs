//! External command execution for probes.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::{ProbeCommand, ProbeError, ProbeKind, ProbeOutcome, RawProbeOutput};

/// Runs a probe command and captures its stdout.
pub trait CommandRunner: Send + Sync {
    fn execute(
        &self,
        command: &ProbeCommand,
    ) -> impl Future<Output = Result<String, ProbeError>> + Send;
}

/// Runs probes as local child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn execute(&self, command: &ProbeCommand) -> Result<String, ProbeError> {
        // kill_on_drop: a timed-out or cancelled probe must not leave the child running
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProbeError::Spawn {
                program: command.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::Command(format!(
                "{} exited with {}: {}",
                command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Run a single probe, bounded by `timeout`.
///
/// Never fails: any error is logged and degrades to an empty output whose
/// outcome records the reason.
pub async fn run_probe<R: CommandRunner>(
    runner: &R,
    kind: ProbeKind,
    command: &ProbeCommand,
    timeout: Duration,
) -> RawProbeOutput {
    tracing::debug!(probe = %kind, "Running `{}`", command);

    let result = match tokio::time::timeout(timeout, runner.execute(command)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(timeout)),
    };

    match result {
        Ok(text) if text.trim().is_empty() => {
            tracing::debug!(probe = %kind, "Probe produced no output");
            RawProbeOutput {
                kind,
                text: String::new(),
                outcome: ProbeOutcome::Degraded,
            }
        }
        Ok(text) => RawProbeOutput {
            kind,
            text,
            outcome: ProbeOutcome::Succeeded,
        },
        Err(e) => {
            tracing::warn!(probe = %kind, "Probe degraded to empty output: {}", e);
            RawProbeOutput::failed(kind, e.to_string())
        }
    }
}
