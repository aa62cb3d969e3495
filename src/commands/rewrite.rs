//! Rewrite command implementation
//!
//! Re-aligns module POMs with an aggregator POM that already exists, without
//! rescanning repositories or resolving coordinates again.

use super::aggregate::print_rewrite_summary;
use super::{Command, CommandContext, print_json};
use crate::constants::maven::POM_FILE;
use crate::pipeline::Pipeline;
use crate::pom::parser::{managed_dependencies_from_xml, modules_from_xml};
use crate::pom::{Gav, ModuleDiscoverer};
use crate::utils::concurrency::bounded_map;
use crate::utils::filesystem::normalize_relative;
use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use std::path::Path;

/// Rewrites module dependency versions from the aggregator's dependencyManagement
pub struct RewriteCommand {
    pub json: bool,
}

/// Coordinates and top-level modules declared by an aggregator POM
pub async fn read_aggregator(path: &Path) -> Result<(Vec<Gav>, Vec<String>)> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read aggregator POM {}", path.display()))?;

    let coordinates = managed_dependencies_from_xml(&content)
        .map_err(|e| anyhow::anyhow!("Malformed aggregator POM {}: {}", path.display(), e))?;
    let modules = modules_from_xml(&content);
    if !modules.success {
        anyhow::bail!("Malformed aggregator POM {}", path.display());
    }
    Ok((coordinates, modules.modules))
}

/// Expand top-level modules into every module directory of their reactors
pub async fn expand_modules(context: &CommandContext, modules: &[String]) -> Vec<String> {
    let discoverer = ModuleDiscoverer::new(
        context.parallel,
        context.config.discovery.batch_size,
        context.logger.clone(),
    );

    let root = context.root.clone();
    let discoveries = bounded_map(modules.to_vec(), context.concurrency(), move |module| {
        let discoverer = discoverer.clone();
        let module_root = root.join(&module);
        async move {
            let discovery = discoverer.discover(&module_root, &module).await;
            (module, discovery)
        }
    })
    .await;

    let mut directories = Vec::new();
    for (module, discovery) in discoveries {
        for warning in &discovery.warnings {
            context.logger.warn(&module, &warning.to_string());
        }
        if discovery.is_empty() {
            // Let the rewriter report it as missing
            directories.push(module.clone());
        }
        directories.extend(
            discovery
                .poms
                .iter()
                .map(|pom| normalize_relative(&format!("{}/{}", module, pom.directory()))),
        );
    }
    directories
}

#[async_trait]
impl Command for RewriteCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let (coordinates, modules) = read_aggregator(&context.root.join(POM_FILE)).await?;
        if coordinates.is_empty() {
            println!("{}", "Aggregator POM manages no dependencies".yellow());
            return Ok(());
        }

        let directories = expand_modules(context, &modules).await;
        let pipeline = Pipeline::new(
            context.root.clone(),
            context.config.clone(),
            context.logger.clone(),
        );
        let report = pipeline.rewrite(&coordinates, &directories).await;

        if self.json {
            print_json(&report)?;
        } else {
            print_rewrite_summary(&report);
        }

        if !report.errors.is_empty() && report.rewritten.is_empty() && report.unchanged.is_empty() {
            anyhow::bail!("All rewrite operations failed. First error: {}", report.errors[0]);
        }
        Ok(())
    }
}
