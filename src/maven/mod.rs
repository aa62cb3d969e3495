//! Maven invocation for evaluation, validation and version updates
//!
//! Maven is slow to start, so the pipeline only reaches for it when
//! structural parsing of a POM is not enough.

pub mod failure;

pub use failure::{ToolFailure, classify_failure};

use crate::constants::maven::{DEFAULT_EXECUTABLE, DEFAULT_TIMEOUT_SECS};
use crate::pom::Gav;
use crate::process::{
    ProcessError, ProcessOutput, ProcessRequest, ProcessRunner, SystemProcessRunner,
    get_exit_code_description,
};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Errors from a Maven invocation
#[derive(Debug)]
pub enum MavenError {
    /// Maven could not be started
    Launch { command: String, message: String },
    /// Maven exceeded its time budget
    TimedOut { command: String, timeout: Duration },
    /// Maven exited with a non-zero code
    Failed {
        command: String,
        exit_code: i32,
        diagnostic: String,
    },
    /// Maven succeeded but printed no usable value
    EmptyResult { command: String, expression: String },
}

impl MavenError {
    /// Classification callers use to decide between skip and report
    pub fn failure(&self) -> ToolFailure {
        match self {
            MavenError::Failed { diagnostic, .. } => classify_failure(diagnostic),
            MavenError::EmptyResult { .. } | MavenError::Launch { .. } | MavenError::TimedOut { .. } => {
                ToolFailure::Generic
            }
        }
    }
}

impl fmt::Display for MavenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MavenError::Launch { command, message } => {
                write!(f, "Failed to launch '{}': {}", command, message)
            }
            MavenError::TimedOut { command, timeout } => {
                write!(f, "'{}' timed out after {}s", command, timeout.as_secs())
            }
            MavenError::Failed {
                command,
                exit_code,
                diagnostic,
            } => write!(
                f,
                "'{}' ended with exit code {} ({}): {}",
                command,
                exit_code,
                get_exit_code_description(*exit_code),
                diagnostic
            ),
            MavenError::EmptyResult {
                command,
                expression,
            } => write!(f, "'{}' printed no value for {}", command, expression),
        }
    }
}

impl std::error::Error for MavenError {}

impl From<ProcessError> for MavenError {
    fn from(error: ProcessError) -> Self {
        match error {
            ProcessError::Spawn { command, source } => MavenError::Launch {
                command,
                message: source.to_string(),
            },
            ProcessError::TimedOut { command, timeout } => MavenError::TimedOut { command, timeout },
        }
    }
}

/// Handle on the Maven executable
#[derive(Clone)]
pub struct Maven {
    executable: String,
    timeout: Duration,
    runner: Arc<dyn ProcessRunner>,
}

impl Default for Maven {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXECUTABLE,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

impl Maven {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self::with_runner(executable, timeout, Arc::new(SystemProcessRunner))
    }

    pub fn with_runner(
        executable: impl Into<String>,
        timeout: Duration,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            executable: executable.into(),
            timeout,
            runner,
        }
    }

    /// Run Maven from the POM's directory, with `-f` relative to it
    async fn invoke(&self, pom: &Path, goal_args: &[String]) -> Result<ProcessOutput, MavenError> {
        let dir = pom.parent().filter(|dir| !dir.as_os_str().is_empty());
        let pom_arg = match (dir, pom.file_name()) {
            (Some(_), Some(file_name)) => Path::new(file_name),
            _ => pom,
        };

        let mut args = vec![
            "-B".to_string(),
            "-q".to_string(),
            "-f".to_string(),
            pom_arg.to_string_lossy().into_owned(),
        ];
        args.extend_from_slice(goal_args);

        let mut request =
            ProcessRequest::new(self.executable.clone(), args).with_timeout(self.timeout);
        if let Some(dir) = dir {
            request = request.in_dir(dir);
        }

        let output = self.runner.run(&request).await?;
        if !output.success() {
            return Err(MavenError::Failed {
                command: request.display(),
                exit_code: output.exit_code,
                diagnostic: output.diagnostic(),
            });
        }
        Ok(output)
    }

    /// Evaluate a project expression such as `project.version` for `pom`
    pub async fn evaluate(&self, pom: &Path, expression: &str) -> Result<String, MavenError> {
        let args = vec![
            "help:evaluate".to_string(),
            format!("-Dexpression={expression}"),
            "-DforceStdout".to_string(),
        ];
        let output = self.invoke(pom, &args).await?;

        parse_evaluate_output(&output.stdout).ok_or_else(|| MavenError::EmptyResult {
            command: format!("{} help:evaluate", self.executable),
            expression: expression.to_string(),
        })
    }

    /// Run the `validate` phase for the project rooted at `dir`
    pub async fn validate(&self, dir: &Path) -> Result<(), MavenError> {
        let pom = dir.join(crate::constants::maven::POM_FILE);
        self.invoke(&pom, &["validate".to_string()]).await?;
        Ok(())
    }

    /// Force every reference to `gav`'s group:artifact in `pom` to its version
    pub async fn use_dep_version(&self, pom: &Path, gav: &Gav) -> Result<(), MavenError> {
        let args = vec![
            "versions:use-dep-version".to_string(),
            format!("-Dincludes={}", gav.management_key()),
            format!("-DdepVersion={}", gav.version()),
            "-DforceVersion=true".to_string(),
            "-DgenerateBackupPoms=false".to_string(),
        ];
        let output = self.invoke(pom, &args).await?;

        // The plugin exits 0 even when nothing matched
        let text = format!("{}\n{}", output.stdout, output.stderr);
        if classify_failure(&text) == ToolFailure::NoMatchingDependency {
            return Err(MavenError::Failed {
                command: format!("{} versions:use-dep-version", self.executable),
                exit_code: output.exit_code,
                diagnostic: text.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Pick the evaluated value out of `help:evaluate` output
///
/// Maven may print download progress and log lines even in quiet mode; the
/// value is the last line that is none of those.
pub fn parse_evaluate_output(output: &str) -> Option<String> {
    let mut last = None;
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || is_maven_noise_line(line) || is_maven_null_value(line) {
            continue;
        }
        last = Some(line.trim_matches('"').to_string());
    }
    last
}

fn is_maven_noise_line(line: &str) -> bool {
    line.starts_with("[INFO]")
        || line.starts_with("[WARNING]")
        || line.starts_with("[ERROR]")
        || line.starts_with("[DEBUG]")
        || line.starts_with("Downloading from")
        || line.starts_with("Downloaded from")
        || line.starts_with("Progress (")
        || line.starts_with("Picked up JAVA_TOOL_OPTIONS")
}

fn is_maven_null_value(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower == "null" || lower.contains("null object") || lower.contains("invalid expression")
}
