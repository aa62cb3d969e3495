//! Repository builder utilities

use super::RepositoryDescriptor;
use crate::utils::filesystem::to_slash;
use std::path::{Path, PathBuf};

/// Builder for repository descriptors
///
/// By default a repository lives at `<root>/<owner>/<name>` and is
/// identified by `owner/name`; either can be overridden.
pub struct RepositoryBuilder {
    owner: String,
    name: String,
    root: Option<PathBuf>,
    path: Option<PathBuf>,
    relative_path: Option<String>,
}

impl RepositoryBuilder {
    /// Create a new repository builder
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            root: None,
            path: None,
            relative_path: None,
        }
    }

    /// Set the scan root the repository lives under
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set an explicit location on disk
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set an explicit identifier relative to the scan root
    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    fn default_relative(&self) -> String {
        if self.owner.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.owner, self.name)
        }
    }

    /// Build the descriptor
    pub fn build(self) -> RepositoryDescriptor {
        let relative_path = match (&self.relative_path, &self.path, &self.root) {
            (Some(relative), _, _) => relative.clone(),
            (None, Some(path), Some(root)) => path
                .strip_prefix(root)
                .map(to_slash)
                .unwrap_or_else(|_| self.default_relative()),
            _ => self.default_relative(),
        };

        let path = match (&self.path, &self.root) {
            (Some(path), _) => path.clone(),
            (None, Some(root)) => root.join(&relative_path),
            (None, None) => Path::new(&relative_path).to_path_buf(),
        };

        RepositoryDescriptor {
            path,
            relative_path,
            owner: self.owner,
            name: self.name,
        }
    }
}
