//! Common test support utilities and fixtures
//!
//! Builds throwaway workspaces of `<owner>/<name>` Maven repositories and
//! offers fakes for the external tools the pipeline talks to.

#![allow(dead_code)]

use async_trait::async_trait;
use repos_maven::config::Config;
use repos_maven::maven::MavenError;
use repos_maven::pipeline::Pipeline;
use repos_maven::pom::AttributeResolver;
use repos_maven::registry::VersionLookup;
use repos_maven::utils::MemoryLogger;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::fs;
use tempfile::TempDir;

/// Result of running a CLI command
#[derive(Debug)]
pub struct CliOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A test workspace holding cloned repositories and the aggregator POM
pub struct Workspace {
    pub root: TempDir,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create a new temporary workspace
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        Self { root }
    }

    /// Get the workspace root path
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a file relative to the workspace root, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Read a file relative to the workspace root
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).expect("Failed to read file")
    }

    /// Create a single-module repository with the given coordinates
    pub fn add_repo(&self, owner: &str, name: &str, gav: (&str, &str, &str)) {
        self.write(
            &format!("{owner}/{name}/pom.xml"),
            &pom(gav, None, &[], &[]),
        );
    }

    /// A pipeline over this workspace with Maven and the registry faked out
    pub fn pipeline(&self, config: Config) -> (Pipeline, Arc<MemoryLogger>, Arc<ScriptedResolver>) {
        let logger = Arc::new(MemoryLogger::new());
        let resolver = Arc::new(ScriptedResolver::default());
        let pipeline = Pipeline::new(self.path(), config, logger.clone())
            .with_resolver(resolver.clone())
            .with_registry(Arc::new(FixedRegistry("1.0.0")));
        (pipeline, logger, resolver)
    }
}

/// Render a POM with coordinates, optional packaging, modules and dependencies
pub fn pom(
    (group_id, artifact_id, version): (&str, &str, &str),
    packaging: Option<&str>,
    modules: &[&str],
    dependencies: &[(&str, &str, &str)],
) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project>\n");
    xml.push_str("  <modelVersion>4.0.0</modelVersion>\n");
    xml.push_str(&format!("  <groupId>{group_id}</groupId>\n"));
    xml.push_str(&format!("  <artifactId>{artifact_id}</artifactId>\n"));
    xml.push_str(&format!("  <version>{version}</version>\n"));
    if let Some(packaging) = packaging {
        xml.push_str(&format!("  <packaging>{packaging}</packaging>\n"));
    }
    if !modules.is_empty() {
        xml.push_str("  <modules>\n");
        for module in modules {
            xml.push_str(&format!("    <module>{module}</module>\n"));
        }
        xml.push_str("  </modules>\n");
    }
    if !dependencies.is_empty() {
        xml.push_str("  <dependencies>\n");
        for (g, a, v) in dependencies {
            xml.push_str(&format!(
                "    <dependency>\n      <groupId>{g}</groupId>\n      <artifactId>{a}</artifactId>\n      <version>{v}</version>\n    </dependency>\n"
            ));
        }
        xml.push_str("  </dependencies>\n");
    }
    xml.push_str("</project>\n");
    xml
}

/// Answers Maven evaluations from a table keyed by POM directory name
#[derive(Default)]
pub struct ScriptedResolver {
    pub answers: Mutex<HashMap<(String, String), String>>,
    pub calls: Mutex<Vec<(PathBuf, String)>>,
}

impl ScriptedResolver {
    pub fn answer(&self, dir_name: &str, expression: &str, value: &str) {
        self.answers.lock().unwrap().insert(
            (dir_name.to_string(), expression.to_string()),
            value.to_string(),
        );
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AttributeResolver for ScriptedResolver {
    async fn resolve_attribute(&self, pom: &Path, expression: &str) -> Result<String, MavenError> {
        self.calls
            .lock()
            .unwrap()
            .push((pom.to_path_buf(), expression.to_string()));

        let dir_name = pom
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.answers
            .lock()
            .unwrap()
            .get(&(dir_name, expression.to_string()))
            .cloned()
            .ok_or_else(|| MavenError::Failed {
                command: "mvn help:evaluate".to_string(),
                exit_code: 1,
                diagnostic: "[ERROR] Non-resolvable parent POM".to_string(),
            })
    }
}

/// Registry that always reports the same version
pub struct FixedRegistry(pub &'static str);

#[async_trait]
impl VersionLookup for FixedRegistry {
    async fn latest_version(&self, _group_id: &str, _artifact_id: &str) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Run the CLI with given arguments
pub fn run_cli(args: &[&str], cwd: Option<&Path>) -> CliOutput {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--quiet", "--manifest-path"]);
    cmd.arg(Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"));
    cmd.arg("--");
    cmd.args(args);

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().expect("Failed to execute cargo run");

    CliOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
