//! Process-presence check: lists processes through a shell pipeline and looks
//! for the configured name.

use std::os::unix::process::CommandExt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tracing::debug;

use status_platform::{CheckError, ServiceStatus, StatusChecker};

/// Used when the configured timeout is zero
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct CommandChecker {
    process_name: String,
    timeout: Duration,
}

impl CommandChecker {
    pub fn new(process_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            process_name: process_name.into(),
            timeout,
        }
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// `ps ax | grep -F -- '<name>' | grep -v grep`
    fn probe_script(&self) -> String {
        format!(
            "ps ax | grep -F -- {} | grep -v grep",
            shell_quote(&self.process_name)
        )
    }
}

#[async_trait]
impl StatusChecker for CommandChecker {
    async fn check_status(&self) -> Result<ServiceStatus, CheckError> {
        if self.process_name.is_empty() {
            return Err(CheckError::EmptyProcessName);
        }

        let timeout = self.effective_timeout();
        let outcome = run_shell(&self.probe_script(), timeout)
            .await
            .map_err(|source| CheckError::Spawn {
                process: self.process_name.clone(),
                source,
            })?;

        match outcome {
            ShellOutcome::Succeeded => Ok(ServiceStatus::Online),
            ShellOutcome::Failed(reason) => Err(CheckError::ProcessNotRunning {
                process: self.process_name.clone(),
                reason,
            }),
            ShellOutcome::TimedOut => Err(CheckError::Timeout {
                target: self.process_name.clone(),
                timeout,
            }),
        }
    }

    fn describe(&self) -> String {
        format!("process {}", self.process_name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ShellOutcome {
    Succeeded,
    Failed(String),
    TimedOut,
}

/// Runs `script` under `sh -c` in its own process group, racing it against
/// `timeout`. On timeout the whole group is killed and the shell reaped before
/// returning.
pub(crate) async fn run_shell(script: &str, timeout: Duration) -> std::io::Result<ShellOutcome> {
    let mut cmd = std::process::Command::new("sh");
    cmd.arg("-c")
        .arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0);

    let mut child = Command::from(cmd).kill_on_drop(true).spawn()?;

    // Group id equals the shell's pid because of process_group(0).
    let pgid = child.id().map(|id| Pid::from_raw(id as i32));

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) if status.success() => Ok(ShellOutcome::Succeeded),
        Ok(Ok(status)) => Ok(ShellOutcome::Failed(status.to_string())),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            match pgid.map(|pgid| signal::killpg(pgid, Signal::SIGKILL)) {
                Some(Ok(())) => {
                    if let Err(e) = child.wait().await {
                        debug!("failed to reap timed-out probe: {}", e);
                    }
                }
                other => {
                    if let Some(Err(e)) = other {
                        debug!("killpg failed, killing shell only: {}", e);
                    }
                    if let Err(e) = child.kill().await {
                        debug!("failed to kill timed-out probe: {}", e);
                    }
                }
            }
            Ok(ShellOutcome::TimedOut)
        }
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
