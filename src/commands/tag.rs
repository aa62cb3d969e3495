//! Tag command implementation

use super::{Command, CommandContext};
use crate::github::{GhCli, RepositoryEntry};
use crate::utils::concurrency::bounded_map;
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

/// Adds a GitHub topic to every valid repository in a list
pub struct TagCommand {
    pub entries: Vec<RepositoryEntry>,
    pub topic: String,
    pub gh: GhCli,
}

#[async_trait]
impl Command for TagCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let valid: Vec<RepositoryEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.is_valid())
            .cloned()
            .collect();

        if valid.is_empty() {
            println!("{}", "No valid repositories to tag".yellow());
            return Ok(());
        }

        let gh = Clone::clone(&self.gh);
        let topic = self.topic.clone();
        let results = bounded_map(valid, context.concurrency(), move |entry| {
            let gh = Clone::clone(&gh);
            let topic = topic.clone();
            async move {
                let full_name = entry.full_name();
                let result = gh.add_topic(&full_name, &topic).await;
                (full_name, result)
            }
        })
        .await;

        let mut errors = Vec::new();
        let mut successful = 0;
        for (full_name, result) in results {
            match result {
                Ok(()) => {
                    context
                        .logger
                        .success(&full_name, &format!("Tagged with '{}'", self.topic));
                    successful += 1;
                }
                Err(e) => {
                    context.logger.error(&full_name, &format!("{e:#}"));
                    errors.push((full_name, e));
                }
            }
        }

        // Report summary
        if errors.is_empty() {
            println!("{}", format!("Tagged {} repositories", successful).green());
        } else {
            println!(
                "{}",
                format!(
                    "Completed with {} successful, {} failed",
                    successful,
                    errors.len()
                )
                .yellow()
            );

            // If all operations failed, return an error to propagate to main
            if successful == 0 {
                return Err(anyhow::anyhow!(
                    "All tag operations failed. First error: {:#}",
                    errors[0].1
                ));
            }
        }

        Ok(())
    }
}
