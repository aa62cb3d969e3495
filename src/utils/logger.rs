//! Logging capability injected into every pipeline component
//!
//! Components never print directly. They receive an `Arc<dyn Logger>` and
//! report through it, so the same pipeline runs behind the CLI, inside a
//! library call, or headless in tests.

use colored::*;
use std::sync::Mutex;

/// Severity of a recorded log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
}

/// Logger for pipeline operations with consistent formatting
///
/// Every message carries a scope label (a repository, a POM path, or a
/// pipeline stage) so interleaved output from concurrent work stays readable.
pub trait Logger: Send + Sync {
    fn info(&self, scope: &str, msg: &str);
    fn success(&self, scope: &str, msg: &str);
    fn warn(&self, scope: &str, msg: &str);
    fn error(&self, scope: &str, msg: &str);
}

/// Colored logger writing to stderr
///
/// Stdout is left untouched so JSON results can be piped to the next
/// command. Informational lines are only shown in verbose mode.
///
/// ## Example
///
/// ```rust
/// use repos_maven::utils::logger::{ConsoleLogger, Logger};
///
/// let logger = ConsoleLogger::new(true);
/// logger.info("owner/repo", "Discovering modules");
/// logger.success("owner/repo", "Found 3 modules");
/// ```
#[derive(Debug, Default, Clone)]
pub struct ConsoleLogger {
    verbose: bool,
}

impl ConsoleLogger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Logger for ConsoleLogger {
    fn info(&self, scope: &str, msg: &str) {
        if self.verbose {
            eprintln!("{} | {}", scope.cyan().bold(), msg);
        }
    }

    fn success(&self, scope: &str, msg: &str) {
        eprintln!("{} | {}", scope.cyan().bold(), msg.green());
    }

    fn warn(&self, scope: &str, msg: &str) {
        eprintln!("{} | {}", scope.cyan().bold(), msg.yellow());
    }

    fn error(&self, scope: &str, msg: &str) {
        eprintln!("{} | {}", scope.cyan().bold(), msg.red());
    }
}

/// A single entry captured by [`MemoryLogger`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub scope: String,
    pub message: String,
}

/// Logger that keeps every entry in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Entries of one level, in logging order
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| format!("{} | {}", entry.scope, entry.message))
            .collect()
    }

    fn record(&self, level: Level, scope: &str, msg: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                scope: scope.to_string(),
                message: msg.to_string(),
            });
        }
    }
}

impl Logger for MemoryLogger {
    fn info(&self, scope: &str, msg: &str) {
        self.record(Level::Info, scope, msg);
    }

    fn success(&self, scope: &str, msg: &str) {
        self.record(Level::Success, scope, msg);
    }

    fn warn(&self, scope: &str, msg: &str) {
        self.record(Level::Warn, scope, msg);
    }

    fn error(&self, scope: &str, msg: &str) {
        self.record(Level::Error, scope, msg);
    }
}
