//! List command implementation

use super::{Command, CommandContext, print_json};
use crate::github::GhCli;
use anyhow::Result;
use async_trait::async_trait;

/// Lists an owner's repositories as a structured JSON list
pub struct ListCommand {
    pub owner: String,
    pub topic: Option<String>,
    pub limit: usize,
    pub gh: GhCli,
}

#[async_trait]
impl Command for ListCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let entries = self
            .gh
            .list_repositories(&self.owner, self.topic.as_deref(), self.limit)
            .await?;

        let filter = match &self.topic {
            Some(topic) => format!(" with topic '{topic}'"),
            None => String::new(),
        };
        context.logger.success(
            &self.owner,
            &format!("Found {} repositories{}", entries.len(), filter),
        );

        print_json(&entries)
    }
}
