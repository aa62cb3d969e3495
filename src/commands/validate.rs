//! Validate command implementation

use super::{Command, CommandContext, print_json};
use crate::constants::maven::POM_FILE;
use crate::github::RepositoryEntry;
use crate::maven::{Maven, MavenError};
use crate::maven::failure::ToolFailure;
use crate::utils::concurrency::bounded_map;
use crate::utils::filesystem::is_file;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs `mvn validate` in each listed repository and records the verdict
pub struct ValidateCommand {
    pub entries: Vec<RepositoryEntry>,
    pub maven: Maven,
}

fn failure_reason(error: &MavenError) -> String {
    match error.failure() {
        ToolFailure::Generic => error.to_string(),
        failure => failure.describe().to_string(),
    }
}

async fn validate_entry(
    maven: Maven,
    context: Arc<CommandContext>,
    mut entry: RepositoryEntry,
) -> RepositoryEntry {
    let full_name = entry.full_name();

    if entry.valid == Some(false) {
        context.logger.info(&full_name, "Already marked invalid, skipping");
        return entry;
    }

    let dir = context.repository_dir(&entry);
    if !is_file(&dir.join(POM_FILE)).await {
        context.logger.warn(&full_name, "No pom.xml at repository root");
        entry.mark_invalid("no pom.xml at repository root");
        return entry;
    }

    match maven.validate(&dir).await {
        Ok(()) => {
            context.logger.success(&full_name, "Valid");
            entry.mark_valid();
        }
        Err(e) => {
            let reason = failure_reason(&e);
            context.logger.warn(&full_name, &format!("Invalid: {reason}"));
            entry.mark_invalid(reason);
        }
    }
    entry
}

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let shared = Arc::new(context.clone());
        let maven = self.maven.clone();
        let validated = bounded_map(self.entries.clone(), context.concurrency(), move |entry| {
            validate_entry(maven.clone(), Arc::clone(&shared), entry)
        })
        .await;

        let valid = validated.iter().filter(|e| e.is_valid()).count();
        context.logger.info(
            "validate",
            &format!("{} of {} repositories are valid", valid, validated.len()),
        );
        print_json(&validated)
    }
}
