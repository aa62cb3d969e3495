//! `gh` command wrappers
//!
//! Listing, cloning and topic tagging all go through the GitHub CLI, so
//! authentication is whatever `gh auth` has set up.

use super::types::RepositoryEntry;
use crate::constants::github::{DEFAULT_TIMEOUT_SECS, GH_EXECUTABLE};
use crate::process::{ProcessRequest, ProcessRunner, SystemProcessRunner, run_checked};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Handle on the `gh` executable
#[derive(Clone)]
pub struct GhCli {
    executable: String,
    timeout: Duration,
    runner: Arc<dyn ProcessRunner>,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::with_runner(Arc::new(SystemProcessRunner))
    }
}

impl GhCli {
    pub fn with_runner(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            executable: GH_EXECUTABLE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            runner,
        }
    }

    fn request(&self, args: Vec<String>) -> ProcessRequest {
        ProcessRequest::new(self.executable.clone(), args).with_timeout(self.timeout)
    }

    /// List the repositories of `owner`
    ///
    /// # Arguments
    /// * `owner` - User or organization
    /// * `topic` - Only repositories carrying this topic
    /// * `limit` - Maximum number of repositories returned
    pub async fn list_repositories(
        &self,
        owner: &str,
        topic: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RepositoryEntry>> {
        let mut args = vec![
            "repo".to_string(),
            "list".to_string(),
            owner.to_string(),
            "--limit".to_string(),
            limit.to_string(),
            "--json".to_string(),
            "name,owner,url".to_string(),
        ];
        if let Some(topic) = topic {
            args.push("--topic".to_string());
            args.push(topic.to_string());
        }

        let output = run_checked(self.runner.as_ref(), &self.request(args)).await?;
        serde_json::from_str(&output.stdout)
            .with_context(|| format!("Failed to parse repository list for {}", owner))
    }

    /// Clone `full_name` into `destination`
    pub async fn clone(&self, full_name: &str, destination: &Path) -> Result<()> {
        let args = vec![
            "repo".to_string(),
            "clone".to_string(),
            full_name.to_string(),
            destination.to_string_lossy().into_owned(),
        ];
        run_checked(self.runner.as_ref(), &self.request(args))
            .await
            .with_context(|| format!("Failed to clone {}", full_name))?;
        Ok(())
    }

    /// Add a topic to `full_name` on GitHub
    pub async fn add_topic(&self, full_name: &str, topic: &str) -> Result<()> {
        let args = vec![
            "repo".to_string(),
            "edit".to_string(),
            full_name.to_string(),
            "--add-topic".to_string(),
            topic.to_string(),
        ];
        run_checked(self.runner.as_ref(), &self.request(args))
            .await
            .with_context(|| format!("Failed to tag {} with '{}'", full_name, topic))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessError, ProcessOutput};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedRunner {
        output: ProcessOutput,
        requests: Mutex<Vec<ProcessRequest>>,
    }

    impl CannedRunner {
        fn new(exit_code: i32, stdout: &str) -> Arc<Self> {
            Arc::new(Self {
                output: ProcessOutput {
                    exit_code,
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_args(&self) -> Vec<String> {
            self.requests.lock().unwrap().last().unwrap().args.clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for CannedRunner {
        async fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput, ProcessError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.output.clone())
        }
    }

    #[tokio::test]
    async fn test_list_repositories_parses_json() {
        let runner = CannedRunner::new(
            0,
            r#"[{"name":"a","owner":{"login":"acme"},"url":"u1"},{"name":"b","owner":{"login":"acme"},"url":"u2"}]"#,
        );
        let gh = GhCli::with_runner(runner.clone());
        let repos = gh
            .list_repositories("acme", Some("maven"), 50)
            .await
            .unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[1].full_name(), "acme/b");
        assert_eq!(
            runner.last_args(),
            vec![
                "repo", "list", "acme", "--limit", "50", "--json", "name,owner,url", "--topic",
                "maven"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_commands_carry_context() {
        let runner = CannedRunner::new(1, "");
        let gh = GhCli::with_runner(runner.clone());

        let err = gh.add_topic("acme/a", "maven").await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to tag acme/a with 'maven'"));
        assert_eq!(
            runner.last_args(),
            vec!["repo", "edit", "acme/a", "--add-topic", "maven"]
        );

        let err = gh.clone("acme/a", Path::new("/tmp/x")).await.unwrap_err();
        assert!(format!("{err:#}").contains("exit code 1"));
    }

    #[tokio::test]
    async fn test_unparseable_list_is_an_error() {
        let gh = GhCli::with_runner(CannedRunner::new(0, "not json"));
        let err = gh.list_repositories("acme", None, 10).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse repository list for acme"));
    }
}
