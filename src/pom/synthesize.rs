//! Aggregator POM synthesis

use super::gav::{Gav, dedupe_coordinates};
use super::xml::XmlWriter;
use crate::constants::maven::{MODEL_VERSION, POM_NAMESPACE, POM_SCHEMA_LOCATION};

/// Identity and extras of the synthesized aggregator project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorProject {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Parent with an already resolved version
    pub parent: Option<Gav>,
    pub default_goal: Option<String>,
}

impl AggregatorProject {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            name: None,
            description: None,
            parent: None,
            default_goal: None,
        }
    }
}

/// Render the aggregator POM
///
/// `modules` are written in the order given. Coordinates are de-duplicated
/// once more by full key, so the `dependencyManagement` block never holds
/// the same triple twice.
pub fn synthesize(project: &AggregatorProject, modules: &[String], coordinates: &[Gav]) -> String {
    let coordinates = dedupe_coordinates(coordinates.iter().cloned());

    let mut xml = XmlWriter::new();
    xml.open_with_attributes(
        "project",
        &[
            ("xmlns", POM_NAMESPACE),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ("xsi:schemaLocation", POM_SCHEMA_LOCATION),
        ],
    );
    xml.leaf("modelVersion", MODEL_VERSION);
    xml.blank_line();

    if let Some(parent) = &project.parent {
        xml.open("parent");
        xml.leaf("groupId", parent.group_id());
        xml.leaf("artifactId", parent.artifact_id());
        xml.leaf("version", parent.version());
        xml.close("parent");
        xml.blank_line();
    }

    xml.leaf("groupId", &project.group_id);
    xml.leaf("artifactId", &project.artifact_id);
    xml.leaf("version", &project.version);
    xml.leaf("packaging", "pom");
    xml.blank_line();

    let name = project
        .name
        .clone()
        .unwrap_or_else(|| format!("{} (aggregator)", project.artifact_id));
    let description = project.description.clone().unwrap_or_else(|| {
        format!(
            "Aggregates {} module(s) and manages {} dependency version(s)",
            modules.len(),
            coordinates.len()
        )
    });
    xml.leaf("name", &name);
    xml.leaf("description", &description);

    if !modules.is_empty() {
        xml.blank_line();
        xml.open("modules");
        for module in modules {
            xml.leaf("module", module);
        }
        xml.close("modules");
    }

    if !coordinates.is_empty() {
        xml.blank_line();
        xml.open("dependencyManagement");
        xml.open("dependencies");
        for gav in &coordinates {
            xml.open("dependency");
            xml.leaf("groupId", gav.group_id());
            xml.leaf("artifactId", gav.artifact_id());
            xml.leaf("version", gav.version());
            xml.close("dependency");
        }
        xml.close("dependencies");
        xml.close("dependencyManagement");
    }

    if let Some(goal) = &project.default_goal {
        xml.blank_line();
        xml.open("build");
        xml.leaf("defaultGoal", goal);
        xml.close("build");
    }

    xml.close("project");
    xml.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::parser::{managed_dependencies_from_xml, modules_from_xml};

    fn gav(artifact: &str, version: &str) -> Gav {
        Gav::new("com.example", artifact, version).unwrap()
    }

    fn modules(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_synthesize_is_deterministic_and_well_formed() {
        let project = AggregatorProject::new("io.example", "all", "1.0.0-SNAPSHOT");
        let modules = modules(&["acme/a", "acme/b"]);
        let coordinates = vec![gav("a", "1.0.0"), gav("b", "2.0.0")];

        let first = synthesize(&project, &modules, &coordinates);
        let second = synthesize(&project, &modules, &coordinates);
        assert_eq!(first, second);

        let doc = roxmltree::Document::parse(&first).unwrap();
        assert_eq!(doc.root_element().tag_name().namespace(), Some(POM_NAMESPACE));
        assert!(first.contains("<packaging>pom</packaging>"));
        assert!(first.contains("<modelVersion>4.0.0</modelVersion>"));
        assert!(!first.contains("<parent>"));
        assert!(!first.contains("<build>"));

        assert_eq!(modules_from_xml(&first).modules, modules);
        let managed = managed_dependencies_from_xml(&first).unwrap();
        assert_eq!(managed, coordinates);
    }

    #[test]
    fn test_dependency_management_holds_each_triple_once() {
        let project = AggregatorProject::new("io.example", "all", "1");
        let coordinates = vec![
            gav("a", "1.0.0"),
            gav("b", "2.0.0"),
            gav("a", "1.0.0"),
            gav("a", "1.1.0"),
            gav("b", "2.0.0"),
        ];
        let xml = synthesize(&project, &modules(&["x"]), &coordinates);
        assert_eq!(xml.matches("<dependency>").count(), 3);
        assert!(xml.contains("manages 3 dependency version(s)"));
    }

    #[test]
    fn test_parent_and_default_goal() {
        let project = AggregatorProject {
            parent: Some(Gav::new("io.example", "profile-parent", "7").unwrap()),
            default_goal: Some("install".to_string()),
            name: Some("Everything & more".to_string()),
            ..AggregatorProject::new("io.example", "all", "1")
        };
        let xml = synthesize(&project, &modules(&["x"]), &[]);

        let parent_at = xml.find("<parent>").unwrap();
        let group_at = xml.find("<groupId>io.example</groupId>\n    <artifactId>all").unwrap();
        assert!(parent_at < group_at);
        assert!(xml.contains("        <artifactId>profile-parent</artifactId>"));
        assert!(xml.contains("<defaultGoal>install</defaultGoal>"));
        assert!(xml.contains("<name>Everything &amp; more</name>"));
        assert!(!xml.contains("<dependencyManagement>"));
        roxmltree::Document::parse(&xml).unwrap();
    }
}
