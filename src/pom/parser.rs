//! Structural POM parsing without invoking Maven
//!
//! Every function here is total: malformed or missing files come back as a
//! result that says "ask Maven instead", never as an error the caller has to
//! propagate.

use super::gav::{Gav, PartialGav};
use super::xml::{child_element, child_elements, child_text, descend};
use crate::constants::maven::DEFAULT_PACKAGING;
use serde::Serialize;
use std::path::Path;

/// Coordinates extracted from a POM and whether Maven must be consulted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GavParse {
    pub gav: PartialGav,
    pub needs_external_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GavParse {
    fn failed(reason: String) -> Self {
        Self {
            gav: PartialGav::default(),
            needs_external_fallback: true,
            reason: Some(reason),
        }
    }
}

/// Declared `<modules>` of a POM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulesParse {
    pub modules: Vec<String>,
    pub success: bool,
}

/// What discovery needs to know about a POM, read in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomSummary {
    pub packaging: String,
    pub modules: Vec<String>,
}

fn parse_project(xml: &str) -> Result<roxmltree::Document<'_>, String> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| e.to_string())?;
    let root = doc.root_element().tag_name().name();
    if root != "project" {
        return Err(format!("root element is <{root}>, expected <project>"));
    }
    Ok(doc)
}

async fn read_pom(path: &Path) -> Result<String, String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))
}

/// Extract the coordinates of a POM from its XML text
///
/// `groupId` and `version` fall back to the `<parent>` values when the
/// project omits them; `artifactId` is never inherited.
pub fn gav_from_xml(xml: &str) -> GavParse {
    let doc = match parse_project(xml) {
        Ok(doc) => doc,
        Err(e) => return GavParse::failed(format!("failed to parse POM: {e}")),
    };
    let project = doc.root_element();
    let parent = child_element(&project, "parent");

    let gav = PartialGav {
        group_id: child_text(&project, "groupId")
            .or_else(|| parent.and_then(|p| child_text(&p, "groupId"))),
        artifact_id: child_text(&project, "artifactId"),
        version: child_text(&project, "version")
            .or_else(|| parent.and_then(|p| child_text(&p, "version"))),
    };

    let missing = gav.missing_fields();
    let reason = if !missing.is_empty() {
        Some(format!("missing {}", missing.join(", ")))
    } else if gav.has_placeholders() {
        Some("contains property placeholders".to_string())
    } else {
        None
    };

    GavParse {
        gav,
        needs_external_fallback: reason.is_some(),
        reason,
    }
}

/// Extract the coordinates of the POM at `path`
pub async fn parse_for_gav(path: &Path) -> GavParse {
    match read_pom(path).await {
        Ok(xml) => gav_from_xml(&xml),
        Err(e) => GavParse::failed(e),
    }
}

/// Ordered `<modules><module>` values; empty when the POM declares none
pub fn modules_from_xml(xml: &str) -> ModulesParse {
    match parse_project(xml) {
        Ok(doc) => ModulesParse {
            modules: declared_modules(&doc.root_element()),
            success: true,
        },
        Err(_) => ModulesParse::default(),
    }
}

/// Declared modules of the POM at `path`
pub async fn parse_for_modules(path: &Path) -> ModulesParse {
    match read_pom(path).await {
        Ok(xml) => modules_from_xml(&xml),
        Err(_) => ModulesParse::default(),
    }
}

/// Declared packaging, or Maven's implicit `jar`
pub fn packaging_from_xml(xml: &str) -> String {
    parse_project(xml)
        .ok()
        .and_then(|doc| child_text(&doc.root_element(), "packaging"))
        .unwrap_or_else(|| DEFAULT_PACKAGING.to_string())
}

/// Packaging of the POM at `path`, `jar` when unreadable
pub async fn parse_for_packaging(path: &Path) -> String {
    match read_pom(path).await {
        Ok(xml) => packaging_from_xml(&xml),
        Err(_) => DEFAULT_PACKAGING.to_string(),
    }
}

/// Packaging and modules in a single parse
pub fn summarize_xml(xml: &str) -> Result<PomSummary, String> {
    let doc = parse_project(xml)?;
    let project = doc.root_element();
    Ok(PomSummary {
        packaging: child_text(&project, "packaging")
            .unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
        modules: declared_modules(&project),
    })
}

/// Check that text is a well-formed POM, returning the parser's complaint
pub fn check_well_formed(xml: &str) -> Result<(), String> {
    parse_project(xml).map(|_| ())
}

/// Literal coordinates listed under `<dependencyManagement><dependencies>`
///
/// Entries with missing parts or placeholder versions are left out.
pub fn managed_dependencies_from_xml(xml: &str) -> Result<Vec<Gav>, String> {
    let doc = parse_project(xml)?;
    let Some(dependencies) = descend(
        &doc.root_element(),
        &["dependencyManagement", "dependencies"],
    ) else {
        return Ok(Vec::new());
    };

    Ok(child_elements(dependencies, "dependency")
        .filter_map(|dep| {
            Gav::new(
                child_text(&dep, "groupId")?,
                child_text(&dep, "artifactId")?,
                child_text(&dep, "version")?,
            )
            .ok()
        })
        .collect())
}

fn declared_modules(project: &roxmltree::Node<'_, '_>) -> Vec<String> {
    let Some(modules) = child_element(project, "modules") else {
        return Vec::new();
    };
    child_elements(modules, "module")
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FULL: &str = r#"<?xml version="1.0"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>lib</artifactId>
  <version>1.2.3</version>
</project>"#;

    #[test]
    fn test_gav_from_complete_pom() {
        let parsed = gav_from_xml(FULL);
        assert!(!parsed.needs_external_fallback);
        assert!(parsed.reason.is_none());
        assert_eq!(
            parsed.gav.complete().unwrap(),
            Gav::new("com.example", "lib", "1.2.3").unwrap()
        );
    }

    #[test]
    fn test_gav_inherits_group_and_version_from_parent() {
        let xml = r#"<project>
  <parent>
    <groupId>com.example</groupId>
    <artifactId>parent</artifactId>
    <version>2.0.0</version>
  </parent>
  <artifactId>child</artifactId>
</project>"#;
        let parsed = gav_from_xml(xml);
        assert!(!parsed.needs_external_fallback);
        assert_eq!(parsed.gav.group_id.as_deref(), Some("com.example"));
        assert_eq!(parsed.gav.artifact_id.as_deref(), Some("child"));
        assert_eq!(parsed.gav.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_artifact_id_is_not_inherited() {
        let xml = r#"<project>
  <parent><groupId>g</groupId><artifactId>parent</artifactId><version>1</version></parent>
</project>"#;
        let parsed = gav_from_xml(xml);
        assert!(parsed.needs_external_fallback);
        assert_eq!(parsed.reason.as_deref(), Some("missing artifactId"));
        assert!(parsed.gav.artifact_id.is_none());
    }

    #[test]
    fn test_placeholder_version_requests_fallback_and_keeps_raw_value() {
        let xml = r#"<project>
  <groupId>g</groupId>
  <artifactId>a</artifactId>
  <version>${some.property}</version>
</project>"#;
        let parsed = gav_from_xml(xml);
        assert!(parsed.needs_external_fallback);
        assert!(parsed.reason.unwrap().contains("property placeholders"));
        assert_eq!(parsed.gav.version.as_deref(), Some("${some.property}"));
    }

    #[test]
    fn test_missing_fields_take_precedence_in_reason() {
        let parsed = gav_from_xml("<project><artifactId>${x}</artifactId></project>");
        assert_eq!(parsed.reason.as_deref(), Some("missing groupId, version"));
    }

    #[test]
    fn test_malformed_xml_never_panics() {
        let parsed = gav_from_xml("<project><groupId>g</project>");
        assert!(parsed.needs_external_fallback);
        assert_eq!(parsed.gav, PartialGav::default());
        assert!(parsed.reason.unwrap().starts_with("failed to parse POM"));

        let wrong_root = gav_from_xml("<settings/>");
        assert!(wrong_root.reason.unwrap().contains("expected <project>"));
    }

    #[test]
    fn test_modules_single_and_list() {
        let single = modules_from_xml("<project><modules><module>core</module></modules></project>");
        assert!(single.success);
        assert_eq!(single.modules, vec!["core"]);

        let list = modules_from_xml(
            "<project><modules><module> a </module><module>b</module><module/></modules></project>",
        );
        assert_eq!(list.modules, vec!["a", "b"]);

        let none = modules_from_xml("<project/>");
        assert!(none.success);
        assert!(none.modules.is_empty());

        let broken = modules_from_xml("<project>");
        assert!(!broken.success);
    }

    #[test]
    fn test_packaging_defaults_to_jar() {
        assert_eq!(packaging_from_xml("<project><packaging>pom</packaging></project>"), "pom");
        assert_eq!(packaging_from_xml("<project/>"), "jar");
        assert_eq!(packaging_from_xml("not xml"), "jar");
    }

    #[test]
    fn test_summarize_and_managed_dependencies() {
        let xml = r#"<project>
  <packaging>pom</packaging>
  <modules><module>a</module></modules>
  <dependencyManagement>
    <dependencies>
      <dependency><groupId>g</groupId><artifactId>a</artifactId><version>1</version></dependency>
      <dependency><groupId>g</groupId><artifactId>b</artifactId><version>${v}</version></dependency>
    </dependencies>
  </dependencyManagement>
</project>"#;
        let summary = summarize_xml(xml).unwrap();
        assert_eq!(summary.packaging, "pom");
        assert_eq!(summary.modules, vec!["a"]);

        let managed = managed_dependencies_from_xml(xml).unwrap();
        assert_eq!(managed, vec![Gav::new("g", "a", "1").unwrap()]);
    }

    #[tokio::test]
    async fn test_path_variants_handle_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("pom.xml");

        let parsed = parse_for_gav(&missing).await;
        assert!(parsed.needs_external_fallback);
        assert!(parsed.reason.unwrap().contains("failed to read"));
        assert!(!parse_for_modules(&missing).await.success);
        assert_eq!(parse_for_packaging(&missing).await, "jar");

        fs::write(&missing, FULL).unwrap();
        assert!(!parse_for_gav(&missing).await.needs_external_fallback);
    }
}
