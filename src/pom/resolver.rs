//! External coordinate resolution
//!
//! When a POM cannot be understood structurally, its coordinates are asked
//! of Maven itself, one expression at a time.

use super::gav::Gav;
use super::parser::GavParse;
use crate::constants::maven::{ARTIFACT_ID_EXPRESSION, GROUP_ID_EXPRESSION, VERSION_EXPRESSION};
use crate::maven::{Maven, MavenError, ToolFailure};
use async_trait::async_trait;
use std::path::Path;

/// Evaluates a project expression for a POM
#[async_trait]
pub trait AttributeResolver: Send + Sync {
    async fn resolve_attribute(&self, pom: &Path, expression: &str) -> Result<String, MavenError>;
}

#[async_trait]
impl AttributeResolver for Maven {
    async fn resolve_attribute(&self, pom: &Path, expression: &str) -> Result<String, MavenError> {
        self.evaluate(pom, expression).await
    }
}

/// Why a module's coordinates could not be determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub failure: ToolFailure,
    pub message: String,
}

/// Resolve all three coordinates of `pom` through `resolver`
///
/// Stops at the first failing expression; the rest would fail the same way.
pub async fn resolve_externally(
    resolver: &dyn AttributeResolver,
    pom: &Path,
) -> Result<Gav, Unresolved> {
    let mut values = Vec::with_capacity(3);
    for expression in [GROUP_ID_EXPRESSION, ARTIFACT_ID_EXPRESSION, VERSION_EXPRESSION] {
        match resolver.resolve_attribute(pom, expression).await {
            Ok(value) => values.push(value),
            Err(error) => {
                return Err(Unresolved {
                    failure: error.failure(),
                    message: error.to_string(),
                });
            }
        }
    }

    Gav::new(&values[0], &values[1], &values[2]).map_err(|error| Unresolved {
        failure: ToolFailure::Generic,
        message: format!("Maven returned an unusable coordinate: {error}"),
    })
}

/// Coordinates of `pom`, from the structural parse when possible
pub async fn resolve_coordinates(
    resolver: &dyn AttributeResolver,
    pom: &Path,
    parsed: &GavParse,
) -> Result<Gav, Unresolved> {
    if !parsed.needs_external_fallback
        && let Some(gav) = parsed.gav.complete()
    {
        return Ok(gav);
    }
    resolve_externally(resolver, pom).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::parser::gav_from_xml;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MapResolver {
        values: HashMap<&'static str, Result<&'static str, &'static str>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AttributeResolver for MapResolver {
        async fn resolve_attribute(
            &self,
            _pom: &Path,
            expression: &str,
        ) -> Result<String, MavenError> {
            self.calls.lock().unwrap().push(expression.to_string());
            match self.values.get(expression) {
                Some(Ok(value)) => Ok(value.to_string()),
                Some(Err(diagnostic)) => Err(MavenError::Failed {
                    command: "mvn help:evaluate".to_string(),
                    exit_code: 1,
                    diagnostic: diagnostic.to_string(),
                }),
                None => Err(MavenError::EmptyResult {
                    command: "mvn help:evaluate".to_string(),
                    expression: expression.to_string(),
                }),
            }
        }
    }

    fn resolver(entries: &[(&'static str, Result<&'static str, &'static str>)]) -> MapResolver {
        MapResolver {
            values: entries.iter().cloned().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_structural_result_skips_maven() {
        let resolver = resolver(&[]);
        let parsed = gav_from_xml(
            "<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>",
        );
        let gav = resolve_coordinates(&resolver, Path::new("pom.xml"), &parsed)
            .await
            .unwrap();
        assert_eq!(gav.key(), "g:a:1");
        assert!(resolver.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_falls_back_to_all_three_expressions() {
        let resolver = resolver(&[
            ("project.groupId", Ok("g")),
            ("project.artifactId", Ok("a")),
            ("project.version", Ok("1.0.0")),
        ]);
        let parsed = gav_from_xml(
            "<project><groupId>g</groupId><artifactId>a</artifactId><version>${revision}</version></project>",
        );
        let gav = resolve_coordinates(&resolver, Path::new("pom.xml"), &parsed)
            .await
            .unwrap();
        assert_eq!(gav.key(), "g:a:1.0.0");
        assert_eq!(
            *resolver.calls.lock().unwrap(),
            vec!["project.groupId", "project.artifactId", "project.version"]
        );
    }

    #[tokio::test]
    async fn test_classified_failure_short_circuits() {
        let resolver = resolver(&[(
            "project.groupId",
            Err("Non-resolvable parent POM for g:a:1"),
        )]);
        let unresolved = resolve_externally(&resolver, Path::new("pom.xml"))
            .await
            .unwrap_err();
        assert_eq!(unresolved.failure, ToolFailure::ParentUnresolvable);
        assert_eq!(resolver.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_from_maven_is_rejected() {
        let resolver = resolver(&[
            ("project.groupId", Ok("g")),
            ("project.artifactId", Ok("a")),
            ("project.version", Ok("${revision}")),
        ]);
        let unresolved = resolve_externally(&resolver, Path::new("pom.xml"))
            .await
            .unwrap_err();
        assert_eq!(unresolved.failure, ToolFailure::Generic);
        assert!(unresolved.message.contains("placeholder"));
    }
}
