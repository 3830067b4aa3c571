// Shell command runner

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use hooktail_core::domain::HookDefinition;
use hooktail_core::port::{CommandRunner, LineSink, RunOutcome};

use crate::line_framer::LineFramer;

/// Read size for output pipes
const READ_CHUNK: usize = 1024;

const DEFAULT_SHELL: &str = "bash";

/// Outcome line written when the process exits with status zero
pub const SUCCESS_LINE: &str = "Command finished successfully";

/// Runs hook commands through a shell and streams their output
///
/// stdout and stderr are read concurrently, each through its own
/// [`LineFramer`]; lines keep their order within a stream but the two
/// streams interleave freely.
pub struct ShellCommandRunner {
    shell: String,
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellCommandRunner {
    /// Create a runner that executes `<shell> -c <command>`
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    fn command(&self, hook: &HookDefinition) -> Command {
        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(&hook.execute_command)
            .current_dir(&hook.command_working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, hook: &HookDefinition, sink: &dyn LineSink) -> RunOutcome {
        let started = Instant::now();

        let mut child = match self.command(hook).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(hook_id = %hook.id, error = %e, "Failed to spawn command");
                sink.emit(format!("Error starting command: {}", e)).await;
                return RunOutcome::SpawnFailed(e.to_string());
            }
        };

        info!(
            hook_id = %hook.id,
            pid = ?child.id(),
            "Command started"
        );

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            // Unreachable with piped stdio; the process must not outlive the run.
            let reason = "output pipes unavailable".to_string();
            sink.emit(format!("Error starting command: {}", reason)).await;
            if let Err(e) = child.kill().await {
                warn!(hook_id = %hook.id, error = %e, "Failed to kill command without pipes");
            }
            return RunOutcome::SpawnFailed(reason);
        };

        tokio::join!(
            pump(&hook.id, "stdout", stdout, sink),
            pump(&hook.id, "stderr", stderr, sink),
        );

        let outcome = match child.wait().await {
            Ok(status) => finish_line(status, sink).await,
            Err(e) => {
                sink.emit(format!("Command finished with error: {}", e)).await;
                RunOutcome::Failed { exit_code: None }
            }
        };

        info!(
            hook_id = %hook.id,
            duration_ms = %started.elapsed().as_millis(),
            outcome = ?outcome,
            "Command completed"
        );

        outcome
    }
}

async fn finish_line(status: ExitStatus, sink: &dyn LineSink) -> RunOutcome {
    if status.success() {
        sink.emit(SUCCESS_LINE.to_string()).await;
        RunOutcome::Succeeded
    } else {
        sink.emit(format!("Command finished with error: {}", status)).await;
        RunOutcome::Failed {
            exit_code: status.code(),
        }
    }
}

/// Stream one pipe into the sink until EOF or a read error
///
/// A trailing line without `\n` is discarded at EOF.
async fn pump<R>(hook_id: &str, stream: &'static str, mut reader: R, sink: &dyn LineSink)
where
    R: AsyncRead + Unpin,
{
    let mut framer = LineFramer::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                for line in framer.push(&buf[..n]) {
                    sink.emit(line).await;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(hook_id = %hook_id, stream, error = %e, "Failed to read command output");
                sink.emit(format!("Error reading output: {}", e)).await;
                break;
            }
        }
    }

    if let Some(partial) = framer.finish() {
        debug!(
            hook_id = %hook_id,
            stream,
            bytes = partial.len(),
            "Discarding output not terminated by a newline"
        );
    }
}
