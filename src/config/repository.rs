//! Repository descriptors

use crate::constants::maven::POM_FILE;
use serde::Serialize;
use std::path::PathBuf;

/// A cloned repository taking part in aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDescriptor {
    /// Location on disk
    pub path: PathBuf,
    /// Identifier relative to the scan root, `owner/name` by convention
    pub relative_path: String,
    pub owner: String,
    pub name: String,
}

impl RepositoryDescriptor {
    pub fn new(
        path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name` as GitHub spells it
    pub fn full_name(&self) -> String {
        if self.owner.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.owner, self.name)
        }
    }

    /// The repository's root POM
    pub fn pom_path(&self) -> PathBuf {
        self.path.join(POM_FILE)
    }
}
