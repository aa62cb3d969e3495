//! Repository list types
//!
//! The same shape is produced by `gh repo list --json name,owner,url`, by
//! the `list`, `clone` and `validate` commands, and consumed from a pipe by
//! `aggregate`. Unknown fields are ignored so richer producers still fit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// One repository in a structured list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    pub name: String,
    #[serde(default)]
    pub owner: Owner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local clone location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Set once the repository went through validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RepositoryEntry {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: Owner {
                login: owner.into(),
            },
            ..Self::default()
        }
    }

    /// `owner/name`, or just the name when the owner is unknown
    pub fn full_name(&self) -> String {
        if self.owner.login.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.owner.login, self.name)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    pub fn mark_valid(&mut self) {
        self.valid = Some(true);
        self.reason = None;
    }

    pub fn mark_invalid(&mut self, reason: impl Into<String>) {
        self.valid = Some(false);
        self.reason = Some(reason.into());
    }
}
