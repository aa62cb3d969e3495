//! Configuration management module

pub mod builder;
pub mod loader;
pub mod repository;

pub use builder::RepositoryBuilder;
pub use loader::{
    AggregationConfig, Config, DiscoveryConfig, GithubConfig, MavenConfig, ParentConfig,
    ProjectConfig, RewriteConfig,
};
pub use repository::RepositoryDescriptor;
