//! Reload command invocation.
//!
//! # Responsibilities
//! - Run the operator's reload command through a shell
//! - Capture stdout, stderr and exit status as a `ReloadResult`
//! - Bound the wait, killing the child's whole process group when the bound
//!   is hit
//!
//! # Design Decisions
//! - A non-zero exit is data, not an error; only spawn failures and
//!   timeouts are errors at this layer
//! - The child sees `RELAY_CONFIG_PATH` so scripts can validate or copy the
//!   file that was just written

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

#[cfg(unix)]
use nix::sys::signal::{killpg, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::relay::RelayError;

/// Environment variable carrying the written config path to the reload command.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG_PATH";

/// Outcome of a reload command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadResult {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `<shell> -c <command>`.
#[derive(Debug, Clone)]
pub struct ReloadInvoker {
    shell: PathBuf,
    command: String,
    timeout: Option<Duration>,
    config_path: Option<PathBuf>,
}

impl ReloadInvoker {
    pub fn new(shell: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            command: command.into(),
            timeout: None,
            config_path: None,
        }
    }

    /// Bound the wait for the child. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Spawn the reload command and wait for it.
    pub async fn reload(&self) -> Result<ReloadResult, RelayError> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout can take down everything the shell started.
        #[cfg(unix)]
        cmd.process_group(0);
        if let Some(path) = &self.config_path {
            cmd.env(CONFIG_PATH_ENV, path);
        }

        let mut child = cmd.spawn().map_err(|source| self.execution_error(source))?;

        let output = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, collect_output(&mut child)).await;
                match waited {
                    Ok(output) => output,
                    Err(_) => {
                        self.terminate(&mut child).await;
                        return Err(RelayError::ReloadTimeout {
                            command: self.command.clone(),
                            secs: limit.as_secs(),
                        });
                    }
                }
            }
            None => collect_output(&mut child).await,
        }
        .map_err(|source| self.execution_error(source))?;

        let result = ReloadResult {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            command = %self.command,
            code = ?result.code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            stdout = %result.stdout.trim_end(),
            stderr = %result.stderr.trim_end(),
            "Reload command finished"
        );

        Ok(result)
    }

    /// Kill the child's whole process group and reap the child.
    async fn terminate(&self, child: &mut Child) {
        #[cfg(unix)]
        if let Some(pgid) = child.id().and_then(|id| i32::try_from(id).ok()) {
            if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                tracing::warn!(command = %self.command, error = %e, "Failed to kill reload process group");
            }
        }

        if let Err(e) = child.start_kill() {
            tracing::debug!(command = %self.command, error = %e, "Reload child already gone");
        }
        if let Err(e) = child.wait().await {
            tracing::warn!(command = %self.command, error = %e, "Failed to reap reload child");
        }
        tracing::warn!(command = %self.command, "Reload command killed after timeout");
    }

    fn execution_error(&self, source: std::io::Error) -> RelayError {
        RelayError::Execution {
            command: self.command.clone(),
            source,
        }
    }
}

/// Drain both pipes while waiting, so a chatty child cannot block on a full pipe.
async fn collect_output(child: &mut Child) -> std::io::Result<Output> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr, status) = tokio::try_join!(read_pipe(stdout), read_pipe(stderr), child.wait())?;
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
