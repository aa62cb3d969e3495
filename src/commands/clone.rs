//! Clone command implementation

use super::{Command, CommandContext, print_json};
use crate::github::{GhCli, RepositoryEntry};
use crate::utils::concurrency::bounded_map;
use crate::utils::filesystem::{ensure_directory_exists, to_slash};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Clones listed repositories into `<root>/<owner>/<name>`
pub struct CloneCommand {
    pub entries: Vec<RepositoryEntry>,
    pub gh: GhCli,
}

/// Clone one entry and record where it lives relative to the workspace root
async fn clone_entry(
    gh: GhCli,
    context: Arc<CommandContext>,
    mut entry: RepositoryEntry,
) -> RepositoryEntry {
    let full_name = entry.full_name();
    let destination = context.repository_dir(&entry);
    let relative = destination
        .strip_prefix(&context.root)
        .map(to_slash)
        .unwrap_or_else(|_| destination.to_string_lossy().into_owned());
    entry.path = Some(relative);

    if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
        context
            .logger
            .info(&full_name, "Already cloned, keeping existing directory");
        return entry;
    }

    let result = match destination.parent() {
        Some(parent) => ensure_directory_exists(parent),
        None => Ok(()),
    };
    let result = match result {
        Ok(()) => gh.clone(&full_name, &destination).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => context.logger.success(&full_name, "Cloned"),
        Err(e) => {
            context.logger.error(&full_name, &format!("{e:#}"));
            entry.mark_invalid(format!("clone failed: {e:#}"));
        }
    }
    entry
}

#[async_trait]
impl Command for CloneCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        if self.entries.is_empty() {
            context.logger.warn("clone", "No repositories to clone");
            return print_json(&self.entries);
        }

        context.logger.info(
            "clone",
            &format!("Cloning {} repositories...", self.entries.len()),
        );
        ensure_directory_exists(&context.root)?;

        let shared = Arc::new(context.clone());
        let gh = Clone::clone(&self.gh);
        let cloned = bounded_map(self.entries.clone(), context.concurrency(), move |entry| {
            clone_entry(Clone::clone(&gh), Arc::clone(&shared), entry)
        })
        .await;

        let failed = cloned.iter().filter(|e| e.valid == Some(false)).count();
        print_json(&cloned)?;

        if failed > 0 {
            context.logger.warn(
                "clone",
                &format!(
                    "Completed with {} successful, {} failed",
                    cloned.len() - failed,
                    failed
                ),
            );
            // If all operations failed, return an error to propagate to main
            if failed == cloned.len() {
                anyhow::bail!("All clone operations failed");
            }
        }
        Ok(())
    }
}
