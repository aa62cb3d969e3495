//! Aggregate command implementation

use super::{Command, CommandContext, print_json};
use crate::pipeline::{AggregateReport, Pipeline, RepositorySource};
use crate::pom::RewriteReport;
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

/// Runs the full pipeline and writes the aggregator POM
pub struct AggregateCommand {
    pub source: RepositorySource,
    /// Print the report as JSON instead of a summary
    pub json: bool,
}

#[async_trait]
impl Command for AggregateCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let pipeline = Pipeline::new(
            context.root.clone(),
            context.config.clone(),
            context.logger.clone(),
        );
        let report = pipeline.run(self.source.clone()).await?;

        if self.json {
            print_json(&report)?;
        } else {
            print_summary(&report);
        }

        if !report.success {
            return Err(anyhow::anyhow!(
                "{}",
                report
                    .error
                    .as_deref()
                    .unwrap_or("Aggregation did not succeed")
            ));
        }
        Ok(())
    }
}

fn print_summary(report: &AggregateReport) {
    let coordinates = &report.maven_coordinates;
    println!(
        "{} {}:{}:{}",
        "Aggregator".bold(),
        coordinates.group_id,
        coordinates.artifact_id,
        coordinates.version
    );
    if let Some(path) = &report.pom_path {
        println!("  POM: {}", path);
    }
    println!(
        "  Repositories: {} valid, {} skipped",
        report.stats.valid_repositories.to_string().green(),
        report.stats.skipped_repositories.to_string().yellow()
    );
    for module in report.modules.iter().filter(|m| !m.valid) {
        println!(
            "    {} {} ({})",
            "•".yellow(),
            module.path,
            module.reason.as_deref().unwrap_or("invalid")
        );
    }
    println!(
        "  Managed dependencies: {}",
        report.managed_dependencies.len()
    );
    if !report.skipped_modules.is_empty() {
        println!(
            "  Unresolved modules: {}",
            report.skipped_modules.len().to_string().yellow()
        );
    }
    if let Some(rewrite) = &report.rewrite {
        print_rewrite_summary(rewrite);
    }
    if !report.warnings.is_empty() {
        println!("  Warnings: {}", report.warnings.len().to_string().yellow());
    }

    if report.success {
        println!("{}", "Done aggregating repositories".green());
    }
}

pub(crate) fn print_rewrite_summary(rewrite: &RewriteReport) {
    println!(
        "  Rewrite: {} rewritten, {} unchanged, {} need fallback",
        rewrite.rewritten.len().to_string().green(),
        rewrite.unchanged.len(),
        rewrite.unresolved.len().to_string().yellow()
    );
    for module in &rewrite.unresolved {
        println!("    {} {}: {}", "•".yellow(), module.module, module.reason);
    }
    for error in &rewrite.errors {
        println!("    {} {}", "•".red(), error);
    }
    if let Some(fallback) = &rewrite.fallback {
        println!(
            "  Fallback: {} applied, {} not applicable, {} failed",
            fallback.applied,
            fallback.not_applicable,
            fallback.failures.len()
        );
    }
}
