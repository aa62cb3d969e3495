//! Central constants for the repos-maven application

/// Default values for Maven operations
pub mod maven {
    /// File name of a Maven project descriptor
    pub const POM_FILE: &str = "pom.xml";

    /// POM model version written into synthesized projects
    pub const MODEL_VERSION: &str = "4.0.0";

    /// Packaging Maven assumes when a POM declares none
    pub const DEFAULT_PACKAGING: &str = "jar";

    /// Packaging types treated as importable libraries
    pub const LIBRARY_PACKAGING: &[&str] = &["jar", "bundle"];

    /// Default executable used to invoke Maven
    pub const DEFAULT_EXECUTABLE: &str = "mvn";

    /// Upper bound for a single Maven invocation, in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Expressions evaluated when structural parsing is not enough
    pub const GROUP_ID_EXPRESSION: &str = "project.groupId";
    pub const ARTIFACT_ID_EXPRESSION: &str = "project.artifactId";
    pub const VERSION_EXPRESSION: &str = "project.version";

    /// Marker that opens a property placeholder
    pub const PLACEHOLDER_OPEN: &str = "${";

    /// Base URL of the registry used for parent version lookups
    pub const CENTRAL_BASE_URL: &str = "https://repo1.maven.org/maven2";

    /// XML namespace of POM 4.0.0
    pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

    /// Schema location of POM 4.0.0
    pub const POM_SCHEMA_LOCATION: &str =
        "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd";
}

/// Default values for module discovery and aggregation
pub mod pipeline {
    /// Number of POMs read concurrently per discovery round
    pub const DISCOVERY_BATCH_WIDTH: usize = 10;
}

/// Default values for GitHub operations
pub mod github {
    /// Executable of the GitHub CLI
    pub const GH_EXECUTABLE: &str = "gh";

    /// Default number of repositories requested from `gh repo list`
    pub const DEFAULT_LIST_LIMIT: usize = 100;

    /// Upper bound for a single `gh` invocation, in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
}

/// Default values for configuration
pub mod config {
    /// Default configuration file name
    pub const DEFAULT_CONFIG_FILE: &str = "aggregator.yaml";

    /// Coordinates of the synthesized aggregator when none are configured
    pub const DEFAULT_GROUP_ID: &str = "io.github.aggregator";
    pub const DEFAULT_ARTIFACT_ID: &str = "aggregator";
    pub const DEFAULT_VERSION: &str = "1.0.0-SNAPSHOT";

    /// Parent version value that requests a registry lookup
    pub const LATEST_VERSION_MARKER: &str = "LATEST";
}
