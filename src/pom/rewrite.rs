//! Structural alignment of child POM versions with the aggregated ones
//!
//! The POM text is never re-serialized. Each version that has to change is
//! located through the parsed tree, and only its text span is replaced in
//! the original string, so formatting, comments and element order survive
//! untouched and a POM that needs no change is byte-for-byte the same.

use super::gav::Gav;
use super::xml::{child_element, child_elements, child_text, descend, escape_text};
use crate::constants::maven::{PLACEHOLDER_OPEN, POM_FILE};
use crate::maven::{Maven, MavenError, ToolFailure};
use crate::utils::concurrency::{Concurrency, bounded_map};
use crate::utils::filesystem::module_pom_path;
use crate::utils::logger::Logger;
use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use roxmltree::Node;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// Target version per `groupId:artifactId`
///
/// When several coordinates share a group and artifact, the first one wins,
/// matching the order coordinates were aggregated in.
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    versions: HashMap<String, String>,
    artifacts: HashSet<String>,
}

impl VersionTable {
    pub fn from_coordinates(coordinates: &[Gav]) -> Self {
        let mut table = Self::default();
        for gav in coordinates {
            table
                .versions
                .entry(gav.management_key())
                .or_insert_with(|| gav.version().to_string());
            table.artifacts.insert(gav.artifact_id().to_string());
        }
        table
    }

    pub fn get(&self, group_id: &str, artifact_id: &str) -> Option<&str> {
        self.versions
            .get(&format!("{group_id}:{artifact_id}"))
            .map(String::as_str)
    }

    fn knows_artifact(&self, artifact_id: &str) -> bool {
        self.artifacts.contains(artifact_id)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Why a POM cannot be rewritten structurally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteBlocker {
    /// The POM is not well-formed XML or not a project
    Malformed(String),
    /// A groupId or artifactId uses a property this POM does not define
    UnresolvedProperty { location: String, value: String },
    /// A matching version element holds markup or nothing at all
    StructuredVersion { location: String, coordinate: String },
}

impl fmt::Display for RewriteBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteBlocker::Malformed(reason) => write!(f, "POM cannot be parsed: {}", reason),
            RewriteBlocker::UnresolvedProperty { location, value } => write!(
                f,
                "'{}' in {} refers to a property defined outside this POM",
                value, location
            ),
            RewriteBlocker::StructuredVersion {
                location,
                coordinate,
            } => write!(
                f,
                "version of {} in {} is not plain text",
                coordinate, location
            ),
        }
    }
}

impl std::error::Error for RewriteBlocker {}

/// One version reference that was changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionChange {
    pub location: String,
    pub group_id: String,
    pub artifact_id: String,
    pub from: String,
    pub to: String,
}

/// Result of rewriting a POM's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomEdit {
    pub content: String,
    pub changes: Vec<VersionChange>,
}

impl PomEdit {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Properties visible to placeholders in one part of a POM
#[derive(Debug, Clone, Default)]
struct PropertyScope {
    values: HashMap<String, String>,
}

impl PropertyScope {
    fn for_project(project: &Node<'_, '_>) -> Self {
        let mut scope = Self::default();
        let parent = child_element(project, "parent");

        let group = child_text(project, "groupId")
            .or_else(|| parent.and_then(|p| child_text(&p, "groupId")));
        let version = child_text(project, "version")
            .or_else(|| parent.and_then(|p| child_text(&p, "version")));
        let artifact = child_text(project, "artifactId");

        for (key, value) in [
            ("project.groupId", group),
            ("project.artifactId", artifact),
            ("project.version", version),
            ("project.parent.groupId", parent.and_then(|p| child_text(&p, "groupId"))),
            ("project.parent.version", parent.and_then(|p| child_text(&p, "version"))),
        ] {
            if let Some(value) = value {
                scope.values.insert(key.to_string(), value.clone());
                // Maven 2 spelling, still common in older POMs
                if let Some(rest) = key.strip_prefix("project.") {
                    scope.values.insert(format!("pom.{rest}"), value);
                }
            }
        }

        scope.overlay(project);
        scope
    }

    /// Scope with the `<properties>` of `node` layered on top
    fn overlay(&mut self, node: &Node<'_, '_>) {
        if let Some(properties) = child_element(node, "properties") {
            for property in properties.children().filter(|n| n.is_element()) {
                let value = property.text().map(str::trim).unwrap_or_default();
                self.values
                    .insert(property.tag_name().name().to_string(), value.to_string());
            }
        }
    }

    fn with_overlay(&self, node: &Node<'_, '_>) -> Self {
        let mut scope = self.clone();
        scope.overlay(node);
        scope
    }

    /// Substitute known placeholders; unknown ones are left in place
    fn interpolate(&self, text: &str) -> String {
        static PLACEHOLDER: LazyLock<Option<Regex>> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").ok());
        let Some(re) = PLACEHOLDER.as_ref() else {
            return text.to_string();
        };

        let mut current = text.to_string();
        // Properties may refer to properties; a few passes settle real POMs
        for _ in 0..5 {
            if !current.contains(PLACEHOLDER_OPEN) {
                break;
            }
            let next = re
                .replace_all(&current, |caps: &regex::Captures<'_>| {
                    self.values
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// Dependency-like elements carrying a version, with a label for each
fn version_entries<'a, 'input>(
    project: Node<'a, 'input>,
    base: &PropertyScope,
) -> Vec<(String, Node<'a, 'input>, PropertyScope)> {
    let mut entries = Vec::new();

    if let Some(parent) = child_element(&project, "parent") {
        entries.push(("parent".to_string(), parent, base.clone()));
    }
    collect_dependency_sections(project, "", base, &mut entries);

    if let Some(profiles) = child_element(&project, "profiles") {
        for profile in child_elements(profiles, "profile") {
            let id = child_text(&profile, "id").unwrap_or_else(|| "?".to_string());
            let scope = base.with_overlay(&profile);
            collect_dependency_sections(profile, &format!("profile '{id}' "), &scope, &mut entries);
        }
    }
    entries
}

fn collect_dependency_sections<'a, 'input>(
    container: Node<'a, 'input>,
    prefix: &str,
    scope: &PropertyScope,
    entries: &mut Vec<(String, Node<'a, 'input>, PropertyScope)>,
) {
    let mut push_all = |label: &str, dependencies: Option<Node<'a, 'input>>| {
        if let Some(dependencies) = dependencies {
            for dependency in child_elements(dependencies, "dependency") {
                entries.push((format!("{prefix}{label}"), dependency, scope.clone()));
            }
        }
    };

    push_all("dependencies", descend(&container, &["dependencies"]));
    push_all(
        "dependencyManagement",
        descend(&container, &["dependencyManagement", "dependencies"]),
    );

    for plugins_path in [
        &["build", "plugins"][..],
        &["build", "pluginManagement", "plugins"][..],
    ] {
        if let Some(plugins) = descend(&container, plugins_path) {
            for plugin in child_elements(plugins, "plugin") {
                let plugin_id = child_text(&plugin, "artifactId").unwrap_or_else(|| "?".to_string());
                push_all(
                    &format!("plugin '{plugin_id}' dependencies"),
                    child_element(&plugin, "dependencies"),
                );
            }
        }
    }
}

/// The one text node of a version element, if that is all it holds
fn plain_text_child<'a, 'input>(version: &Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    let mut children = version.children();
    let text = children.next().filter(|n| n.is_text())?;
    if children.next().is_some() {
        return None;
    }
    Some(text)
}

fn plan_entry(
    xml: &str,
    location: &str,
    entry: &Node<'_, '_>,
    scope: &PropertyScope,
    table: &VersionTable,
) -> Result<Option<(Edit, VersionChange)>, RewriteBlocker> {
    let (Some(raw_group), Some(raw_artifact)) =
        (child_text(entry, "groupId"), child_text(entry, "artifactId"))
    else {
        return Ok(None);
    };
    let group = scope.interpolate(&raw_group);
    let artifact = scope.interpolate(&raw_artifact);

    if artifact.contains(PLACEHOLDER_OPEN) {
        return Err(RewriteBlocker::UnresolvedProperty {
            location: location.to_string(),
            value: raw_artifact,
        });
    }
    if group.contains(PLACEHOLDER_OPEN) {
        if !table.knows_artifact(&artifact) {
            return Ok(None);
        }
        return Err(RewriteBlocker::UnresolvedProperty {
            location: location.to_string(),
            value: raw_group,
        });
    }

    let Some(target) = table.get(&group, &artifact) else {
        return Ok(None);
    };
    // No version here means it is managed elsewhere
    let Some(version) = child_element(entry, "version") else {
        return Ok(None);
    };

    let text = plain_text_child(&version)
        .filter(|n| n.text().is_some_and(|t| !t.trim().is_empty()))
        .ok_or_else(|| RewriteBlocker::StructuredVersion {
            location: location.to_string(),
            coordinate: format!("{group}:{artifact}"),
        })?;

    let current = text.text().unwrap_or_default().trim();
    if current == target {
        return Ok(None);
    }
    if current.contains(PLACEHOLDER_OPEN) && scope.interpolate(current) == target {
        return Ok(None);
    }

    let range = text.range();
    let raw = &xml[range.clone()];
    let leading = raw.len() - raw.trim_start().len();
    let trailing = raw.len() - raw.trim_end().len();

    Ok(Some((
        Edit {
            range: range.start + leading..range.end - trailing,
            replacement: escape_text(target),
        },
        VersionChange {
            location: location.to_string(),
            group_id: group,
            artifact_id: artifact,
            from: current.to_string(),
            to: target.to_string(),
        },
    )))
}

/// Align every matching version in `xml` with `table`
///
/// Placeholder references are replaced by the literal version; the property
/// definitions they pointed at are left as they are.
pub fn rewrite_pom_xml(xml: &str, table: &VersionTable) -> Result<PomEdit, RewriteBlocker> {
    let doc =
        roxmltree::Document::parse(xml).map_err(|e| RewriteBlocker::Malformed(e.to_string()))?;
    let project = doc.root_element();
    if project.tag_name().name() != "project" {
        return Err(RewriteBlocker::Malformed(format!(
            "root element is <{}>",
            project.tag_name().name()
        )));
    }

    let base = PropertyScope::for_project(&project);
    let mut edits = Vec::new();
    let mut changes = Vec::new();
    for (location, entry, scope) in version_entries(project, &base) {
        if let Some((edit, change)) = plan_entry(xml, &location, &entry, &scope, table)? {
            edits.push(edit);
            changes.push(change);
        }
    }

    // Back to front, so earlier offsets stay valid
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut content = xml.to_string();
    for edit in edits {
        content.replace_range(edit.range, &edit.replacement);
    }

    Ok(PomEdit { content, changes })
}

/// Sets a dependency version in a POM without structural help
#[async_trait]
pub trait DependencyVersionSetter: Send + Sync {
    async fn set_dependency_version(&self, pom: &Path, gav: &Gav) -> Result<(), MavenError>;
}

#[async_trait]
impl DependencyVersionSetter for Maven {
    async fn set_dependency_version(&self, pom: &Path, gav: &Gav) -> Result<(), MavenError> {
        self.use_dep_version(pom, gav).await
    }
}

/// A module whose POM needs the external fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedModule {
    pub module: String,
    pub reason: String,
}

/// Outcome of the external fallback across all unresolved modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackReport {
    /// Coordinates Maven applied
    pub applied: usize,
    /// Coordinates that matched nothing in their module
    pub not_applicable: usize,
    pub failures: Vec<String>,
}

/// Outcome of a rewrite pass
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteReport {
    pub rewritten: Vec<String>,
    pub unchanged: Vec<String>,
    pub unresolved: Vec<UnresolvedModule>,
    /// Modules without a POM on disk
    pub missing: Vec<String>,
    pub errors: Vec<String>,
    pub changes: Vec<VersionChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReport>,
}

enum ModuleOutcome {
    Rewritten(Vec<VersionChange>),
    Unchanged,
    Unresolved(RewriteBlocker),
    Missing,
    Failed(String),
}

/// Rewrites module POMs below an aggregation root
#[derive(Clone)]
pub struct DependencyRewriter {
    logger: Arc<dyn Logger>,
    concurrency: Concurrency,
}

impl DependencyRewriter {
    pub fn new(logger: Arc<dyn Logger>, concurrency: Concurrency) -> Self {
        Self {
            logger,
            concurrency,
        }
    }

    /// Rewrite the POM of every module in `modules`
    ///
    /// Modules are directories (or `.xml` files) relative to `root`. A POM is
    /// only written when at least one version changed.
    pub async fn rewrite(&self, root: &Path, coordinates: &[Gav], modules: &[String]) -> RewriteReport {
        let table = Arc::new(VersionTable::from_coordinates(coordinates));
        let mut seen = HashSet::new();
        let poms: Vec<String> = modules
            .iter()
            .map(|module| module_pom_path("", module))
            .filter(|pom| seen.insert(pom.clone()))
            .collect();

        let rewriter = self.clone();
        let root = root.to_path_buf();
        let outcomes = bounded_map(poms, self.concurrency, move |pom| {
            let rewriter = rewriter.clone();
            let root = root.clone();
            let table = Arc::clone(&table);
            async move {
                let outcome = rewriter.rewrite_one(&root, &pom, &table).await;
                (pom, outcome)
            }
        })
        .await;

        let mut report = RewriteReport::default();
        for (pom, outcome) in outcomes {
            match outcome {
                ModuleOutcome::Rewritten(changes) => {
                    report.rewritten.push(pom);
                    report.changes.extend(changes);
                }
                ModuleOutcome::Unchanged => report.unchanged.push(pom),
                ModuleOutcome::Unresolved(blocker) => report.unresolved.push(UnresolvedModule {
                    module: pom,
                    reason: blocker.to_string(),
                }),
                ModuleOutcome::Missing => report.missing.push(pom),
                ModuleOutcome::Failed(error) => report.errors.push(error),
            }
        }

        self.logger.info(
            "rewrite",
            &format!(
                "{} rewritten, {} unchanged, {} need Maven, {} missing",
                report.rewritten.len(),
                report.unchanged.len(),
                report.unresolved.len(),
                report.missing.len()
            ),
        );
        report
    }

    async fn rewrite_one(&self, root: &Path, pom: &str, table: &VersionTable) -> ModuleOutcome {
        let path = root.join(pom);
        let xml = match tokio::fs::read_to_string(&path).await {
            Ok(xml) => xml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.logger.warn(pom, "No POM found, skipping");
                return ModuleOutcome::Missing;
            }
            Err(e) => {
                let message = format!("Failed to read {}: {}", path.display(), e);
                self.logger.error(pom, &message);
                return ModuleOutcome::Failed(message);
            }
        };

        let edit = match rewrite_pom_xml(&xml, table) {
            Ok(edit) => edit,
            Err(blocker) => {
                self.logger
                    .warn(pom, &format!("Cannot rewrite structurally: {blocker}"));
                return ModuleOutcome::Unresolved(blocker);
            }
        };
        if !edit.is_changed() {
            return ModuleOutcome::Unchanged;
        }

        let written = tokio::fs::write(&path, &edit.content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()));
        if let Err(e) = written {
            let message = format!("{e:#}");
            self.logger.error(pom, &message);
            return ModuleOutcome::Failed(message);
        }

        for change in &edit.changes {
            self.logger.success(
                pom,
                &format!(
                    "{}:{} {} -> {} ({})",
                    change.group_id, change.artifact_id, change.from, change.to, change.location
                ),
            );
        }
        ModuleOutcome::Rewritten(edit.changes)
    }

    /// Let Maven set every coordinate in the modules the rewrite gave up on
    ///
    /// Coordinates are applied one after another per POM, since each run
    /// edits the same file; POMs are processed with the configured
    /// concurrency.
    pub async fn apply_fallback(
        &self,
        setter: Arc<dyn DependencyVersionSetter>,
        root: &Path,
        coordinates: &[Gav],
        unresolved: &[UnresolvedModule],
    ) -> FallbackReport {
        let coordinates: Arc<[Gav]> = coordinates.into();
        let root = root.to_path_buf();
        let logger = Arc::clone(&self.logger);
        let per_module = bounded_map(unresolved.to_vec(), self.concurrency, move |module| {
            let setter = Arc::clone(&setter);
            let coordinates = Arc::clone(&coordinates);
            let logger = Arc::clone(&logger);
            let path = root.join(if module.module.is_empty() {
                POM_FILE
            } else {
                module.module.as_str()
            });
            async move {
                let mut report = FallbackReport::default();
                for gav in coordinates.iter() {
                    match setter.set_dependency_version(&path, gav).await {
                        Ok(()) => report.applied += 1,
                        Err(error) if error.failure() == ToolFailure::NoMatchingDependency => {
                            logger.info(
                                &module.module,
                                &format!("{} does not apply", gav.management_key()),
                            );
                            report.not_applicable += 1;
                        }
                        Err(error) => {
                            logger.error(&module.module, &error.to_string());
                            report
                                .failures
                                .push(format!("{}: {}: {}", module.module, gav, error));
                        }
                    }
                }
                report
            }
        })
        .await;

        per_module
            .into_iter()
            .fold(FallbackReport::default(), |mut total, report| {
                total.applied += report.applied;
                total.not_applicable += report.not_applicable;
                total.failures.extend(report.failures);
                total
            })
    }
}
