//! Command implementations

pub mod aggregate;
pub mod base;
pub mod clone;
pub mod list;
pub mod rewrite;
pub mod tag;
pub mod validate;
pub mod validators;

pub use aggregate::AggregateCommand;
pub use base::{Command, CommandContext, print_json, read_piped_list};
pub use clone::CloneCommand;
pub use list::ListCommand;
pub use rewrite::RewriteCommand;
pub use tag::TagCommand;
pub use validate::ValidateCommand;
