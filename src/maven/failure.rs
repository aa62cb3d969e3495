//! Classification of Maven failures
//!
//! Maven only reports why it failed through its console text. This is the
//! one place that text is inspected; everything else matches on
//! [`ToolFailure`].

use serde::Serialize;
use std::fmt;

/// Known kinds of Maven failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolFailure {
    /// The parent POM cannot be resolved from any repository
    ParentUnresolvable,
    /// A required artifact is not available
    ArtifactNotFound,
    /// `<parent><relativePath>` points at the wrong file
    RelativePathBroken,
    /// A dependency-version update found nothing to update
    NoMatchingDependency,
    /// Anything else, including timeouts
    Generic,
}

impl ToolFailure {
    /// Whether the module can be skipped as a known, expected failure
    pub fn is_skippable(&self) -> bool {
        !matches!(self, ToolFailure::Generic)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ToolFailure::ParentUnresolvable => "parent POM is not resolvable",
            ToolFailure::ArtifactNotFound => "artifact not found",
            ToolFailure::RelativePathBroken => "parent relative path is broken",
            ToolFailure::NoMatchingDependency => "no matching dependency",
            ToolFailure::Generic => "unexpected Maven failure",
        }
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Classify Maven diagnostic output
///
/// Maven often reports a broken relative path and a missing artifact as
/// causes of an unresolvable parent, so the parent check comes first.
pub fn classify_failure(text: &str) -> ToolFailure {
    let lower = text.to_ascii_lowercase();

    if lower.contains("non-resolvable parent pom") {
        ToolFailure::ParentUnresolvable
    } else if lower.contains("parent.relativepath") {
        ToolFailure::RelativePathBroken
    } else if lower.contains("could not find artifact") || lower.contains("was not found in") {
        ToolFailure::ArtifactNotFound
    } else if lower.contains("no matching dependenc")
        || lower.contains("no dependencies matched")
        || lower.contains("did not match any")
    {
        ToolFailure::NoMatchingDependency
    } else {
        ToolFailure::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_parent_unresolvable() {
        let text = "[FATAL] Non-resolvable parent POM for com.example:child:1.0: \
                    Could not find artifact com.example:parent:pom:1.0 and \
                    'parent.relativePath' points at wrong local POM @ line 5";
        assert_eq!(classify_failure(text), ToolFailure::ParentUnresolvable);
    }

    #[test]
    fn test_classify_relative_path() {
        let text = "[WARNING] 'parent.relativePath' of POM g:a points at g:b instead of g:c";
        assert_eq!(classify_failure(text), ToolFailure::RelativePathBroken);
    }

    #[test]
    fn test_classify_artifact_not_found() {
        assert_eq!(
            classify_failure("Could not find artifact org.example:lib:jar:1.0"),
            ToolFailure::ArtifactNotFound
        );
        assert_eq!(
            classify_failure("org.example:lib:pom:1.0 was not found in https://repo"),
            ToolFailure::ArtifactNotFound
        );
    }

    #[test]
    fn test_classify_no_matching_dependency() {
        assert_eq!(
            classify_failure("[INFO] No matching dependencies for com.example:a"),
            ToolFailure::NoMatchingDependency
        );
    }

    #[test]
    fn test_classify_generic() {
        let failure = classify_failure("BUILD FAILURE: compilation error");
        assert_eq!(failure, ToolFailure::Generic);
        assert!(!failure.is_skippable());
        assert!(ToolFailure::ArtifactNotFound.is_skippable());
    }
}
