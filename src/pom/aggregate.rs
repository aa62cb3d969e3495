//! Coordinate aggregation across repositories
//!
//! Every repository is walked with [`ModuleDiscoverer`], the selected POMs
//! are resolved (structurally first, through Maven second) and the results
//! are de-duplicated by `groupId:artifactId:version`, first seen wins.

use super::discovery::{ModuleDiscoverer, PomDescriptor};
use super::gav::{Gav, dedupe_coordinates};
use super::parser::parse_for_gav;
use super::resolver::{AttributeResolver, resolve_coordinates};
use crate::config::RepositoryDescriptor;
use crate::constants::maven::LIBRARY_PACKAGING;
use crate::constants::pipeline::DISCOVERY_BATCH_WIDTH;
use crate::maven::ToolFailure;
use crate::utils::concurrency::{Concurrency, bounded_map};
use crate::utils::filesystem::normalize_relative;
use crate::utils::logger::Logger;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which discovered POMs contribute coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Every POM, whatever its packaging
    Reactor,
    /// Only `jar` and `bundle` packaged POMs
    #[default]
    Library,
}

impl SelectionMode {
    pub fn selects(&self, packaging: &str) -> bool {
        match self {
            SelectionMode::Reactor => true,
            SelectionMode::Library => LIBRARY_PACKAGING.contains(&packaging),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Reactor => f.write_str("reactor"),
            SelectionMode::Library => f.write_str("library"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AggregationOptions {
    pub mode: SelectionMode,
    pub parallel: bool,
    /// Width of parallel batches; `None` runs everything at once
    pub batch_size: Option<usize>,
    pub discovery_batch_width: usize,
    /// Whether Maven may be asked when structural parsing falls short
    pub external_evaluation: bool,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            mode: SelectionMode::default(),
            parallel: false,
            batch_size: None,
            discovery_batch_width: DISCOVERY_BATCH_WIDTH,
            external_evaluation: true,
        }
    }
}

/// A POM whose coordinates could not be determined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedModule {
    /// POM path relative to the aggregation root
    pub pom: String,
    pub failure: ToolFailure,
    pub reason: String,
}

/// Result of aggregating a repository set
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Unique coordinates in first-seen order
    pub coordinates: Vec<Gav>,
    /// Number of successful resolutions before de-duplication
    pub resolved: usize,
    /// Directory of every discovered POM, relative to the aggregation root
    pub module_directories: Vec<String>,
    pub warnings: Vec<String>,
    pub skipped: Vec<SkippedModule>,
}

struct Candidate {
    repository: RepositoryDescriptor,
    pom: PomDescriptor,
}

impl Candidate {
    fn display_path(&self) -> String {
        normalize_relative(&format!(
            "{}/{}",
            self.repository.relative_path, self.pom.relative_path
        ))
    }
}

#[derive(Clone)]
pub struct CoordinateAggregator {
    resolver: Arc<dyn AttributeResolver>,
    logger: Arc<dyn Logger>,
    options: AggregationOptions,
}

impl CoordinateAggregator {
    pub fn new(
        resolver: Arc<dyn AttributeResolver>,
        logger: Arc<dyn Logger>,
        options: AggregationOptions,
    ) -> Self {
        Self {
            resolver,
            logger,
            options,
        }
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::from_options(self.options.parallel, self.options.batch_size)
    }

    /// Discover and resolve the coordinates of every repository
    ///
    /// Per-module failures never abort the run; they end up in
    /// [`Aggregation::skipped`].
    pub async fn aggregate(&self, repositories: &[RepositoryDescriptor]) -> Aggregation {
        let discoverer = ModuleDiscoverer::new(
            self.options.parallel,
            self.options.discovery_batch_width,
            Arc::clone(&self.logger),
        );
        let discoveries = bounded_map(repositories.to_vec(), self.concurrency(), move |repository| {
            let discoverer = discoverer.clone();
            async move {
                let discovery = discoverer
                    .discover(&repository.path, &repository.relative_path)
                    .await;
                (repository, discovery)
            }
        })
        .await;

        let mut aggregation = Aggregation::default();
        let mut candidates = Vec::new();
        for (repository, discovery) in discoveries {
            aggregation.warnings.extend(
                discovery
                    .warnings
                    .iter()
                    .map(|warning| format!("{}: {}", repository.relative_path, warning)),
            );

            for pom in discovery.poms {
                aggregation.module_directories.push(normalize_relative(&format!(
                    "{}/{}",
                    repository.relative_path,
                    pom.directory()
                )));

                let candidate = Candidate {
                    repository: repository.clone(),
                    pom,
                };
                if self.options.mode.selects(&candidate.pom.packaging) {
                    candidates.push(candidate);
                } else {
                    self.logger.info(
                        &candidate.display_path(),
                        &format!(
                            "Not resolving {} packaging in {} mode",
                            candidate.pom.packaging, self.options.mode
                        ),
                    );
                }
            }
        }

        let aggregator = self.clone();
        let outcomes = bounded_map(candidates, self.concurrency(), move |candidate| {
            let aggregator = aggregator.clone();
            async move { aggregator.resolve(candidate).await }
        })
        .await;

        let mut resolved = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(gav) => resolved.push(gav),
                Err(skipped) => aggregation.skipped.push(skipped),
            }
        }
        aggregation.resolved = resolved.len();
        aggregation.coordinates = dedupe_coordinates(resolved);

        if aggregation.coordinates.len() < aggregation.resolved {
            self.logger.info(
                "aggregate",
                &format!(
                    "Collapsed {} resolution(s) into {} unique coordinate(s)",
                    aggregation.resolved,
                    aggregation.coordinates.len()
                ),
            );
        }
        aggregation
    }

    async fn resolve(&self, candidate: Candidate) -> Result<Gav, SkippedModule> {
        let scope = candidate.display_path();
        let pom_path = candidate.repository.path.join(&candidate.pom.relative_path);
        let parsed = parse_for_gav(&pom_path).await;

        if parsed.needs_external_fallback {
            let reason = parsed.reason.clone().unwrap_or_default();
            if !self.options.external_evaluation {
                self.logger.warn(
                    &scope,
                    &format!("Skipping, {reason} and Maven evaluation is disabled"),
                );
                return Err(SkippedModule {
                    pom: scope,
                    failure: ToolFailure::Generic,
                    reason,
                });
            }
            self.logger
                .info(&scope, &format!("Asking Maven for coordinates: {reason}"));
        }

        match resolve_coordinates(self.resolver.as_ref(), &pom_path, &parsed).await {
            Ok(gav) => {
                self.logger.info(&scope, &format!("Resolved {gav}"));
                Ok(gav)
            }
            Err(unresolved) => {
                if unresolved.failure.is_skippable() {
                    self.logger
                        .warn(&scope, &format!("Skipping, {}", unresolved.failure));
                } else {
                    self.logger.error(
                        &scope,
                        &format!("Unexpected Maven error: {}", unresolved.message),
                    );
                }
                Err(SkippedModule {
                    pom: scope,
                    failure: unresolved.failure,
                    reason: unresolved.message,
                })
            }
        }
    }
}
