//! Group:Artifact:Version coordinates

use crate::constants::maven::PLACEHOLDER_OPEN;
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A fully resolved Maven coordinate
///
/// Construction fails unless all three parts are non-empty and free of
/// property placeholders, so every `Gav` in the pipeline is usable as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gav {
    group_id: String,
    artifact_id: String,
    version: String,
}

impl Gav {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let gav = Self {
            group_id: group_id.into().trim().to_string(),
            artifact_id: artifact_id.into().trim().to_string(),
            version: version.into().trim().to_string(),
        };

        for (field, value) in [
            ("groupId", &gav.group_id),
            ("artifactId", &gav.artifact_id),
            ("version", &gav.version),
        ] {
            if value.is_empty() {
                bail!("Coordinate {} is empty", field);
            }
            if value.contains(PLACEHOLDER_OPEN) {
                bail!("Coordinate {} '{}' contains a property placeholder", field, value);
            }
        }

        Ok(gav)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// De-duplication key: `groupId:artifactId:version`
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// Identity of the dependency regardless of version: `groupId:artifactId`
    pub fn management_key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Whether both coordinates name the same dependency
    pub fn same_dependency(&self, other: &Gav) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Coordinate parts as found in a POM, any of which may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialGav {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PartialGav {
    /// Names of the parts that are absent
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.group_id.is_none() {
            missing.push("groupId");
        }
        if self.artifact_id.is_none() {
            missing.push("artifactId");
        }
        if self.version.is_none() {
            missing.push("version");
        }
        missing
    }

    /// Whether any present part still holds a `${...}` reference
    pub fn has_placeholders(&self) -> bool {
        [&self.group_id, &self.artifact_id, &self.version]
            .into_iter()
            .flatten()
            .any(|value| value.contains(PLACEHOLDER_OPEN))
    }

    /// Promote to a [`Gav`] when every part is present and literal
    pub fn complete(&self) -> Option<Gav> {
        match (&self.group_id, &self.artifact_id, &self.version) {
            (Some(group), Some(artifact), Some(version)) => Gav::new(group, artifact, version).ok(),
            _ => None,
        }
    }
}

/// Drop repeated coordinates, keeping the first occurrence of each key
pub fn dedupe_coordinates<I>(coordinates: I) -> Vec<Gav>
where
    I: IntoIterator<Item = Gav>,
{
    let mut seen = HashSet::new();
    coordinates
        .into_iter()
        .filter(|gav| seen.insert(gav.key()))
        .collect()
}
