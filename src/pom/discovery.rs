//! Transitive discovery of the Maven modules in a repository
//!
//! Starting at the root `pom.xml`, every declared `<module>` is followed
//! round by round. Paths are tracked as normalized strings in a set, so a
//! module declaration that leads back to an already seen POM ends the walk
//! instead of looping.

use super::parser::{PomSummary, summarize_xml};
use crate::constants::maven::{DEFAULT_PACKAGING, POM_FILE};
use crate::utils::concurrency::{Concurrency, bounded_map};
use crate::utils::filesystem::{is_file, module_pom_path, pom_directory};
use crate::utils::logger::Logger;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// One POM found during discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PomDescriptor {
    /// `/`-separated path of the POM relative to the repository root
    pub relative_path: String,
    pub packaging: String,
    pub declared_modules: Vec<String>,
}

impl PomDescriptor {
    /// Directory holding the POM, relative to the repository root
    pub fn directory(&self) -> &str {
        pom_directory(&self.relative_path)
    }
}

/// Something discovery noticed but walked past
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiscoveryWarning {
    /// A `<module>` whose POM does not exist
    #[serde(rename_all = "camelCase")]
    MissingModule {
        declared_in: String,
        module: String,
        expected_path: String,
    },
    /// A POM that exists but could not be parsed
    #[serde(rename_all = "camelCase")]
    UnreadablePom { path: String, reason: String },
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryWarning::MissingModule {
                declared_in,
                module,
                expected_path,
            } => write!(
                f,
                "Module '{}' declared in {} has no POM at {}",
                module, declared_in, expected_path
            ),
            DiscoveryWarning::UnreadablePom { path, reason } => {
                write!(f, "Cannot read modules of {}: {}", path, reason)
            }
        }
    }
}

/// All POMs reachable from a repository root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleDiscovery {
    pub poms: Vec<PomDescriptor>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl ModuleDiscovery {
    /// Relative POM paths in discovery order
    pub fn paths(&self) -> Vec<String> {
        self.poms
            .iter()
            .map(|pom| pom.relative_path.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.poms.is_empty()
    }
}

struct Visit {
    descriptor: PomDescriptor,
    children: Vec<String>,
    warnings: Vec<DiscoveryWarning>,
}

/// Walks `<modules>` declarations breadth first
#[derive(Clone)]
pub struct ModuleDiscoverer {
    concurrency: Concurrency,
    logger: Arc<dyn Logger>,
}

impl ModuleDiscoverer {
    /// `batch_width` bounds how many POMs are read at once in parallel mode
    pub fn new(parallel: bool, batch_width: usize, logger: Arc<dyn Logger>) -> Self {
        Self {
            concurrency: Concurrency::from_options(parallel, Some(batch_width)),
            logger,
        }
    }

    /// Discover every POM reachable from `repo_root/pom.xml`
    ///
    /// A repository without a root POM yields an empty result; whether that
    /// makes the repository invalid is up to the caller.
    pub async fn discover(&self, repo_root: &Path, scope: &str) -> ModuleDiscovery {
        let mut discovery = ModuleDiscovery::default();
        if !is_file(&repo_root.join(POM_FILE)).await {
            self.logger.info(scope, "No root pom.xml, nothing to discover");
            return discovery;
        }

        let mut seen: HashSet<String> = HashSet::from([POM_FILE.to_string()]);
        let mut frontier = vec![POM_FILE.to_string()];
        let mut round = 0;

        while !frontier.is_empty() {
            round += 1;
            self.logger.info(
                scope,
                &format!("Discovery round {}: {} POM(s)", round, frontier.len()),
            );

            let batch = std::mem::take(&mut frontier);
            let root = repo_root.to_path_buf();
            let visits = bounded_map(batch, self.concurrency, move |relative| {
                let root = root.clone();
                async move { visit(&root, relative).await }
            })
            .await;

            for visit in visits {
                for warning in &visit.warnings {
                    self.logger.warn(scope, &warning.to_string());
                }
                discovery.warnings.extend(visit.warnings);

                for child in visit.children {
                    if seen.insert(child.clone()) {
                        frontier.push(child);
                    }
                }
                discovery.poms.push(visit.descriptor);
            }
        }

        self.logger.info(
            scope,
            &format!("Discovered {} POM(s)", discovery.poms.len()),
        );
        discovery
    }
}

async fn visit(repo_root: &Path, relative: String) -> Visit {
    let mut warnings = Vec::new();

    let summary = match tokio::fs::read_to_string(repo_root.join(&relative)).await {
        Ok(xml) => summarize_xml(&xml),
        Err(e) => Err(e.to_string()),
    };
    let summary = summary.unwrap_or_else(|reason| {
        warnings.push(DiscoveryWarning::UnreadablePom {
            path: relative.clone(),
            reason,
        });
        PomSummary {
            packaging: DEFAULT_PACKAGING.to_string(),
            modules: Vec::new(),
        }
    });

    let base_dir = pom_directory(&relative).to_string();
    let mut children = Vec::new();
    for module in &summary.modules {
        let child = module_pom_path(&base_dir, module);
        if is_file(&repo_root.join(&child)).await {
            children.push(child);
        } else {
            warnings.push(DiscoveryWarning::MissingModule {
                declared_in: relative.clone(),
                module: module.clone(),
                expected_path: child,
            });
        }
    }

    Visit {
        descriptor: PomDescriptor {
            relative_path: relative,
            packaging: summary.packaging,
            declared_modules: summary.modules,
        },
        children,
        warnings,
    }
}
