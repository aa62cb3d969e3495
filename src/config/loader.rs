//! Configuration file loading

use crate::constants::config::{
    DEFAULT_ARTIFACT_ID, DEFAULT_GROUP_ID, DEFAULT_VERSION, LATEST_VERSION_MARKER,
};
use crate::constants::github::DEFAULT_LIST_LIMIT;
use crate::constants::maven::{DEFAULT_EXECUTABLE, DEFAULT_TIMEOUT_SECS};
use crate::constants::pipeline::DISCOVERY_BATCH_WIDTH;
use crate::maven::Maven;
use crate::pom::{AggregatorProject, SelectionMode};
use crate::utils::validators;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Identity of the synthesized aggregator project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_goal: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            group_id: DEFAULT_GROUP_ID.to_string(),
            artifact_id: DEFAULT_ARTIFACT_ID.to_string(),
            version: DEFAULT_VERSION.to_string(),
            name: None,
            description: None,
            default_goal: None,
        }
    }
}

/// Shared parent the aggregator chains to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentConfig {
    pub group_id: String,
    pub artifact_id: String,
    /// Absent or `LATEST` means "ask the registry"
    #[serde(default)]
    pub version: Option<String>,
}

impl ParentConfig {
    pub fn needs_lookup(&self) -> bool {
        match self.version.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(version) => version.eq_ignore_ascii_case(LATEST_VERSION_MARKER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MavenConfig {
    pub executable: String,
    pub timeout_secs: u64,
    /// Allow `help:evaluate` when structural parsing falls short
    pub evaluation: bool,
}

impl Default for MavenConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            evaluation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryConfig {
    pub batch_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            batch_size: DISCOVERY_BATCH_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregationConfig {
    pub mode: SelectionMode,
    pub parallel: bool,
    /// Width of parallel batches; unset runs everything at once
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteConfig {
    pub enabled: bool,
    /// Hand POMs the structural rewrite gives up on to `versions:use-dep-version`
    pub external_fallback: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            external_fallback: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GithubConfig {
    pub owner: Option<String>,
    pub topic: Option<String>,
    pub limit: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: None,
            topic: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub parent: Option<ParentConfig>,
    pub maven: MavenConfig,
    pub discovery: DiscoveryConfig,
    pub aggregation: AggregationConfig,
    pub rewrite: RewriteConfig,
    pub github: GithubConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or fall back to defaults when it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        validators::validate_config(self).map_err(validators::validation_errors_to_anyhow)
    }

    /// Aggregator identity without the parent, whose version may need a lookup
    pub fn aggregator_project(&self) -> AggregatorProject {
        let project = &self.project;
        let mut aggregator = AggregatorProject::new(
            project.group_id.clone(),
            project.artifact_id.clone(),
            project.version.clone(),
        );
        aggregator.name = project.name.clone();
        aggregator.description = project.description.clone();
        aggregator.default_goal = project.default_goal.clone();
        aggregator
    }

    pub fn maven_tool(&self) -> Maven {
        Maven::new(
            self.maven.executable.clone(),
            Duration::from_secs(self.maven.timeout_secs),
        )
    }
}
