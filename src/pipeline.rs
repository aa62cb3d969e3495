//! The aggregation pipeline
//!
//! repository set → validation → module discovery → coordinate aggregation
//! → aggregator POM synthesis → dependency rewrite.
//!
//! Per-repository and per-module problems end up in the report; only an
//! empty repository set or a failed write of the aggregator POM stop a run.

use crate::config::{Config, ParentConfig, RepositoryDescriptor};
use crate::constants::maven::POM_FILE;
use crate::github::RepositoryEntry;
use crate::pom::{
    AggregationOptions, AttributeResolver, CoordinateAggregator, DependencyRewriter,
    DependencyVersionSetter, Gav, RewriteReport, SkippedModule, synthesize,
};
use crate::registry::{MavenRegistry, VersionLookup};
use crate::utils::concurrency::Concurrency;
use crate::utils::logger::Logger;
use crate::utils::repository_discovery::{
    descriptors_from_entries, scan_repositories, validate_repository,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SCOPE: &str = "aggregate";

/// Where the repository set comes from
#[derive(Debug, Clone)]
pub enum RepositorySource {
    /// Scan `<root>/<owner>/<name>` directories
    Scan,
    /// A structured list, typically piped from `validate`
    Entries(Vec<RepositoryEntry>),
}

/// Validation outcome of one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatus {
    pub path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_scanned: usize,
    pub valid_repositories: usize,
    pub skipped_repositories: usize,
}

/// Coordinates of the synthesized aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// Everything a run produced, printed as JSON on stdout
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub success: bool,
    pub pom_path: Option<String>,
    pub modules: Vec<ModuleStatus>,
    pub stats: ScanStats,
    pub maven_coordinates: MavenCoordinates,
    pub managed_dependencies: Vec<Gav>,
    pub warnings: Vec<String>,
    pub skipped_modules: Vec<SkippedModule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AggregateReport {
    fn new(config: &Config) -> Self {
        Self {
            success: false,
            pom_path: None,
            modules: Vec::new(),
            stats: ScanStats::default(),
            maven_coordinates: MavenCoordinates {
                group_id: config.project.group_id.clone(),
                artifact_id: config.project.artifact_id.clone(),
                version: config.project.version.clone(),
            },
            managed_dependencies: Vec::new(),
            warnings: Vec::new(),
            skipped_modules: Vec::new(),
            rewrite: None,
            error: None,
        }
    }

    fn fail(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

pub struct Pipeline {
    root: PathBuf,
    config: Config,
    logger: Arc<dyn Logger>,
    resolver: Arc<dyn AttributeResolver>,
    version_setter: Arc<dyn DependencyVersionSetter>,
    registry: Arc<dyn VersionLookup>,
}

impl Pipeline {
    /// Pipeline backed by the configured Maven executable and Maven Central
    pub fn new(root: impl Into<PathBuf>, config: Config, logger: Arc<dyn Logger>) -> Self {
        let maven = Arc::new(config.maven_tool());
        Self {
            root: root.into(),
            config,
            logger,
            resolver: maven.clone(),
            version_setter: maven,
            registry: Arc::new(MavenRegistry::default()),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AttributeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_version_setter(mut self, setter: Arc<dyn DependencyVersionSetter>) -> Self {
        self.version_setter = setter;
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn VersionLookup>) -> Self {
        self.registry = registry;
        self
    }

    pub fn pom_path(&self) -> PathBuf {
        self.root.join(POM_FILE)
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::from_options(
            self.config.aggregation.parallel,
            self.config.aggregation.batch_size,
        )
    }

    /// Run the whole pipeline
    ///
    /// `Err` is reserved for failures the operator has to fix before any
    /// retry: an unreadable scan root or an aggregator POM that cannot be
    /// written. An empty repository set comes back as an unsuccessful report.
    pub async fn run(&self, source: RepositorySource) -> Result<AggregateReport> {
        let mut report = AggregateReport::new(&self.config);

        let (candidates, mut statuses) = match source {
            RepositorySource::Scan => (scan_repositories(&self.root)?, Vec::new()),
            RepositorySource::Entries(entries) => {
                let rejected: Vec<ModuleStatus> = entries
                    .iter()
                    .filter(|entry| entry.valid == Some(false))
                    .map(|entry| ModuleStatus {
                        path: entry
                            .path
                            .clone()
                            .unwrap_or_else(|| entry.full_name()),
                        valid: false,
                        reason: Some(
                            entry
                                .reason
                                .clone()
                                .unwrap_or_else(|| "marked invalid upstream".to_string()),
                        ),
                    })
                    .collect();
                (descriptors_from_entries(&entries, &self.root), rejected)
            }
        };

        let mut repositories = Vec::new();
        for repository in candidates {
            match validate_repository(&repository).await {
                Ok(()) => {
                    statuses.push(ModuleStatus {
                        path: repository.relative_path.clone(),
                        valid: true,
                        reason: None,
                    });
                    repositories.push(repository);
                }
                Err(reason) => {
                    self.logger.warn(
                        &repository.relative_path,
                        &format!("Skipping repository: {reason}"),
                    );
                    statuses.push(ModuleStatus {
                        path: repository.relative_path.clone(),
                        valid: false,
                        reason: Some(reason),
                    });
                }
            }
        }

        report.stats = ScanStats {
            total_scanned: statuses.len(),
            valid_repositories: repositories.len(),
            skipped_repositories: statuses.len() - repositories.len(),
        };
        report.modules = statuses;

        if repositories.is_empty() {
            let message = format!("No valid repositories found under {}", self.root.display());
            self.logger.error(SCOPE, &message);
            return Ok(report.fail(message));
        }
        self.logger.info(
            SCOPE,
            &format!("Aggregating {} repositories", repositories.len()),
        );

        let aggregation = self.aggregate(&repositories).await;
        report.warnings.extend(aggregation.warnings.iter().cloned());
        report.skipped_modules = aggregation.skipped.clone();
        if aggregation.module_directories.is_empty() {
            let message = "No Maven modules found in any repository".to_string();
            self.logger.error(SCOPE, &message);
            return Ok(report.fail(message));
        }

        let mut project = self.config.aggregator_project();
        if let Some(parent) = &self.config.parent {
            match self.resolve_parent(parent).await {
                Ok(gav) => project.parent = Some(gav),
                Err(e) => {
                    let warning = format!("Parent omitted: {e:#}");
                    self.logger.warn(SCOPE, &warning);
                    report.warnings.push(warning);
                }
            }
        }

        let modules: Vec<String> = repositories
            .iter()
            .map(|repository| repository.relative_path.clone())
            .collect();
        let xml = synthesize(&project, &modules, &aggregation.coordinates);
        let pom_path = self.pom_path();
        write_if_changed(&pom_path, &xml, self.logger.as_ref()).await?;
        report.pom_path = Some(pom_path.to_string_lossy().into_owned());
        report.managed_dependencies = aggregation.coordinates.clone();

        if self.config.rewrite.enabled {
            report.rewrite = Some(
                self.rewrite(&aggregation.coordinates, &aggregation.module_directories)
                    .await,
            );
        }

        self.logger.success(
            SCOPE,
            &format!(
                "Wrote {} with {} modules and {} managed dependencies",
                pom_path.display(),
                modules.len(),
                aggregation.coordinates.len()
            ),
        );
        report.success = true;
        Ok(report)
    }

    async fn aggregate(&self, repositories: &[RepositoryDescriptor]) -> crate::pom::Aggregation {
        let options = AggregationOptions {
            mode: self.config.aggregation.mode,
            parallel: self.config.aggregation.parallel,
            batch_size: self.config.aggregation.batch_size,
            discovery_batch_width: self.config.discovery.batch_size,
            external_evaluation: self.config.maven.evaluation,
        };
        CoordinateAggregator::new(
            Arc::clone(&self.resolver),
            Arc::clone(&self.logger),
            options,
        )
        .aggregate(repositories)
        .await
    }

    async fn resolve_parent(&self, parent: &ParentConfig) -> Result<Gav> {
        let version = match &parent.version {
            Some(version) if !parent.needs_lookup() => version.clone(),
            _ => {
                let version = self
                    .registry
                    .latest_version(&parent.group_id, &parent.artifact_id)
                    .await?;
                self.logger.info(
                    SCOPE,
                    &format!(
                        "Parent {}:{} resolved to {}",
                        parent.group_id, parent.artifact_id, version
                    ),
                );
                version
            }
        };
        Gav::new(&parent.group_id, &parent.artifact_id, version)
    }

    /// Align module POMs with `coordinates`
    pub async fn rewrite(&self, coordinates: &[Gav], modules: &[String]) -> RewriteReport {
        let rewriter = DependencyRewriter::new(Arc::clone(&self.logger), self.concurrency());
        let mut report = rewriter.rewrite(&self.root, coordinates, modules).await;

        if self.config.rewrite.external_fallback && !report.unresolved.is_empty() {
            self.logger.info(
                SCOPE,
                &format!(
                    "Handing {} module(s) to versions:use-dep-version",
                    report.unresolved.len()
                ),
            );
            report.fallback = Some(
                rewriter
                    .apply_fallback(
                        Arc::clone(&self.version_setter),
                        &self.root,
                        coordinates,
                        &report.unresolved,
                    )
                    .await,
            );
        }
        report
    }
}

/// Write `content` unless the file already holds exactly that
pub async fn write_if_changed(path: &Path, content: &str, logger: &dyn Logger) -> Result<bool> {
    if let Ok(existing) = tokio::fs::read_to_string(path).await
        && existing == content
    {
        logger.info(SCOPE, &format!("{} is up to date", path.display()));
        return Ok(false);
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}
