//! GitHub integration through the `gh` CLI
//!
//! - [`cli`]: listing, cloning and topic tagging via `gh`
//! - [`types`]: the structured repository list exchanged between commands

pub mod cli;
pub mod types;

pub use cli::GhCli;
pub use types::{Owner, RepositoryEntry};
