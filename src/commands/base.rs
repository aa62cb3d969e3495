//! Base types and traits for the command pattern

use crate::config::Config;
use crate::github::RepositoryEntry;
use crate::utils::concurrency::Concurrency;
use crate::utils::logger::Logger;
use crate::utils::repository_discovery::parse_repository_list;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// Context passed to all commands containing shared configuration and options
#[derive(Clone)]
pub struct CommandContext {
    /// The loaded configuration, with CLI overrides applied
    pub config: Config,
    /// Workspace root holding `<owner>/<name>` clones and the aggregator POM
    pub root: PathBuf,
    /// Whether to execute operations in parallel
    pub parallel: bool,
    pub logger: Arc<dyn Logger>,
}

impl CommandContext {
    pub fn concurrency(&self) -> Concurrency {
        Concurrency::from_options(self.parallel, self.config.aggregation.batch_size)
    }

    /// Where a listed repository lives inside the workspace
    pub fn repository_dir(&self, entry: &RepositoryEntry) -> PathBuf {
        match &entry.path {
            Some(path) => self.root.join(path),
            None => self.root.join(&entry.owner.login).join(&entry.name),
        }
    }
}

/// Trait that all commands must implement
#[async_trait::async_trait]
pub trait Command {
    /// Execute the command with the given context
    async fn execute(&self, context: &CommandContext) -> Result<()>;
}

/// Read a repository list piped on stdin
///
/// Returns `None` when stdin is a terminal or the pipe is empty.
pub fn read_piped_list() -> Result<Option<Vec<RepositoryEntry>>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut input = String::new();
    stdin
        .read_to_string(&mut input)
        .context("Failed to read repository list from stdin")?;
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_repository_list(&input).map(Some)
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
