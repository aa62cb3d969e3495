//! Repos Maven - aggregate Maven projects from many GitHub repositories

pub mod commands;
pub mod config;
pub mod constants;
pub mod github;
pub mod maven;
pub mod pipeline;
pub mod pom;
pub mod process;
pub mod registry;
pub mod utils;

pub type Result<T> = anyhow::Result<T>;

// Re-export commonly used types
pub use commands::{Command, CommandContext};
pub use config::{Config, RepositoryDescriptor};
pub use pipeline::{AggregateReport, Pipeline, RepositorySource};
pub use pom::Gav;

