//! Utility modules for common functionality

pub mod concurrency;
pub mod filesystem;
pub mod logger;
pub mod repository_discovery;
pub mod validators;

// Re-export commonly used functions
pub use concurrency::{Concurrency, bounded_map};
pub use filesystem::ensure_directory_exists;
pub use logger::{ConsoleLogger, Logger, MemoryLogger};
pub use repository_discovery::{
    descriptors_from_entries, parse_repository_list, scan_repositories, validate_repository,
};
