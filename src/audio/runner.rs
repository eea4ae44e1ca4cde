use std::{path::Path, process::Stdio, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Captured result of one external process invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Last non-empty stderr line, which is where yt-dlp puts its error.
    pub fn error_line(&self) -> String {
        self.stderr
            .lines()
            .map(str::trim)
            .rev()
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| match self.code {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            })
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

/// Process-spawn seam for the external search and transcode tools.
///
/// The production implementation is [`TokioCommandRunner`]; tests inject
/// fakes that return canned output and write files themselves.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RunError>;
}

/// Runs commands with `tokio::process`, argv only, no shell.
///
/// The child is spawned with `kill_on_drop`, so a timeout or a dropped
/// request future kills it instead of leaving it running.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RunError> {
        let program_name = program.display().to_string();

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Io {
                program: program_name.clone(),
                source,
            })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                success: output.status.success(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(source)) => Err(RunError::Io {
                program: program_name,
                source,
            }),
            Err(_) => Err(RunError::TimedOut {
                program: program_name,
                timeout,
            }),
        }
    }
}
