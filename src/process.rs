//! Process execution for external tools (`mvn`, `gh`)

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A command to run, with its working directory and time budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ProcessRequest {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            timeout: None,
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The command line as it would be typed in a shell
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Everything the tool said, stderr first, for error reporting
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        match (stderr.is_empty(), stdout.is_empty()) {
            (false, false) => format!("{stderr}\n{stdout}"),
            (false, true) => stderr.to_string(),
            (true, false) => stdout.to_string(),
            (true, true) => format!(
                "exited with code {} ({})",
                self.exit_code,
                get_exit_code_description(self.exit_code)
            ),
        }
    }
}

/// Failures that prevent a process from producing an exit code
#[derive(Debug)]
pub enum ProcessError {
    /// The program could not be started
    Spawn {
        command: String,
        source: std::io::Error,
    },
    /// The program ran past its time budget and was killed
    TimedOut { command: String, timeout: Duration },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { command, source } => {
                write!(f, "Failed to execute '{}': {}", command, source)
            }
            ProcessError::TimedOut { command, timeout } => {
                write!(
                    f,
                    "'{}' timed out after {}s",
                    command,
                    timeout.as_secs_f64()
                )
            }
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn { source, .. } => Some(source),
            ProcessError::TimedOut { .. } => None,
        }
    }
}

/// Runs external commands
///
/// A non-zero exit is not an error at this level: callers inspect
/// `exit_code` themselves, or use [`run_checked`] when any failure is fatal.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput, ProcessError>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput, ProcessError> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }

        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            command: request.display(),
            source,
        })?;

        let output = match request.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| ProcessError::TimedOut {
                    command: request.display(),
                    timeout,
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| ProcessError::Spawn {
            command: request.display(),
            source,
        })?;

        Ok(ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command and treat a non-zero exit as an error
pub async fn run_checked(
    runner: &dyn ProcessRunner,
    request: &ProcessRequest,
) -> Result<ProcessOutput> {
    let output = runner.run(request).await?;
    if !output.success() {
        anyhow::bail!(
            "'{}' ended with exit code {} ({}): {}",
            request.display(),
            output.exit_code,
            get_exit_code_description(output.exit_code),
            output.diagnostic()
        );
    }
    Ok(output)
}

/// Get a human-readable description for an exit code
pub fn get_exit_code_description(exit_code: i32) -> &'static str {
    match exit_code {
        0 => "success",
        1 => "general error",
        2 => "shell builtin misuse",
        126 => "command invoked cannot execute",
        127 => "command not found",
        128 => "invalid argument to exit",
        130 => "script terminated by Control-C",
        131..=255 => "terminated by signal",
        _ => "error",
    }
}
