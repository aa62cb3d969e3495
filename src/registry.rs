//! Maven registry lookups
//!
//! The aggregator can chain to a shared parent POM whose version is not
//! pinned in configuration. This module asks a Maven repository for the
//! newest published version of such a coordinate by reading its
//! `maven-metadata.xml`.

use crate::constants::maven::CENTRAL_BASE_URL;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Finds the newest published version of a coordinate
#[async_trait]
pub trait VersionLookup: Send + Sync {
    async fn latest_version(&self, group_id: &str, artifact_id: &str) -> Result<String>;
}

/// Client for a Maven repository's metadata
pub struct MavenRegistry {
    client: Client,
    base_url: String,
}

impl Default for MavenRegistry {
    fn default() -> Self {
        Self::new(CENTRAL_BASE_URL)
    }
}

impl MavenRegistry {
    /// Create a registry client
    ///
    /// # Arguments
    /// * `base_url` - Root of the repository layout, e.g. Maven Central
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of the metadata document for `group_id:artifact_id`
    pub fn metadata_url(&self, group_id: &str, artifact_id: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            self.base_url,
            group_id.replace('.', "/"),
            artifact_id
        )
    }

    /// Look up the newest version of an artifact
    ///
    /// # Arguments
    /// * `group_id` - Group of the artifact
    /// * `artifact_id` - Artifact name
    ///
    /// # Returns
    /// The `<release>` version, else `<latest>`, else the last listed version
    ///
    /// # Example
    /// ```rust,no_run
    /// use repos_maven::registry::MavenRegistry;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let registry = MavenRegistry::default();
    /// let version = registry.latest_version("org.apache.maven", "maven-core").await?;
    /// println!("maven-core {}", version);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn latest_version(&self, group_id: &str, artifact_id: &str) -> Result<String> {
        let url = self.metadata_url(group_id, artifact_id);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", concat!("repos-maven/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow::anyhow!(
                "Failed to fetch metadata for {}:{} ({})",
                group_id,
                artifact_id,
                status
            ));
        }

        let body = response.text().await?;
        parse_metadata(&body).with_context(|| {
            format!("No version published for {}:{} at {}", group_id, artifact_id, url)
        })
    }
}

#[async_trait]
impl VersionLookup for MavenRegistry {
    async fn latest_version(&self, group_id: &str, artifact_id: &str) -> Result<String> {
        MavenRegistry::latest_version(self, group_id, artifact_id).await
    }
}

/// Pick the newest version out of a `maven-metadata.xml` document
pub fn parse_metadata(xml: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(xml).ok()?;
    let versioning = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("versioning"))?;

    let text_of = |name: &str| {
        versioning
            .children()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    };

    text_of("release").or_else(|| text_of("latest")).or_else(|| {
        versioning
            .children()
            .find(|n| n.has_tag_name("versions"))?
            .children()
            .filter(|n| n.has_tag_name("version"))
            .filter_map(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .last()
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_url() {
        let registry = MavenRegistry::new("https://repo.example/maven2/");
        assert_eq!(
            registry.metadata_url("io.liftwizard", "liftwizard-parent"),
            "https://repo.example/maven2/io/liftwizard/liftwizard-parent/maven-metadata.xml"
        );
    }

    #[test]
    fn test_parse_metadata_prefers_release() {
        let xml = r#"<metadata>
  <groupId>g</groupId>
  <artifactId>a</artifactId>
  <versioning>
    <latest>2.1.0-SNAPSHOT</latest>
    <release>2.0.0</release>
    <versions><version>1.0.0</version><version>2.0.0</version></versions>
  </versioning>
</metadata>"#;
        assert_eq!(parse_metadata(xml).as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_parse_metadata_falls_back() {
        let latest = "<metadata><versioning><latest>3</latest></versioning></metadata>";
        assert_eq!(parse_metadata(latest).as_deref(), Some("3"));

        let listed = "<metadata><versioning><versions><version>1</version><version>4</version></versions></versioning></metadata>";
        assert_eq!(parse_metadata(listed).as_deref(), Some("4"));

        assert_eq!(parse_metadata("<metadata/>"), None);
        assert_eq!(parse_metadata("not xml"), None);
    }
}
