//! Command argument validation utilities
//!
//! This module provides centralized validation logic for command arguments
//! after clap parsing. It handles domain-specific validation rules that
//! go beyond basic argument parsing.

use anyhow::{Result, anyhow};

/// Validation errors for command arguments
#[derive(Debug, PartialEq)]
pub enum CommandValidationError {
    /// Mutually exclusive arguments were both provided
    MutualExclusivity { first: String, second: String },
    /// Required argument was not provided
    MissingRequired {
        argument: String,
        alternatives: Vec<String>,
    },
    /// Invalid argument value
    InvalidValue {
        argument: String,
        value: String,
        reason: String,
    },
}

impl std::fmt::Display for CommandValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandValidationError::MutualExclusivity { first, second } => {
                write!(f, "Cannot specify both {} and {}", first, second)
            }
            CommandValidationError::MissingRequired {
                argument,
                alternatives,
            } => {
                if alternatives.is_empty() {
                    write!(f, "{} is required", argument)
                } else {
                    write!(
                        f,
                        "Either {} or {} must be provided",
                        alternatives.join(", "),
                        argument
                    )
                }
            }
            CommandValidationError::InvalidValue {
                argument,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for {}: {}", value, argument, reason)
            }
        }
    }
}

impl std::error::Error for CommandValidationError {}

/// Convert validation error to anyhow::Error
pub fn validation_error_to_anyhow(error: CommandValidationError) -> anyhow::Error {
    anyhow!(error.to_string())
}

/// Resolve the GitHub owner from the flag or the config file
pub fn require_owner(flag: Option<String>, configured: Option<&str>) -> Result<String> {
    let owner = flag.or_else(|| configured.map(str::to_string));
    match owner {
        Some(owner) if !owner.trim().is_empty() => Ok(owner),
        Some(owner) => Err(validation_error_to_anyhow(
            CommandValidationError::InvalidValue {
                argument: "owner".to_string(),
                value: owner,
                reason: "owner cannot be empty or whitespace only".to_string(),
            },
        )),
        None => Err(validation_error_to_anyhow(
            CommandValidationError::MissingRequired {
                argument: "github.owner in the config file".to_string(),
                alternatives: vec!["--owner".to_string()],
            },
        )),
    }
}

/// Validate a topic name
///
/// GitHub topics are lowercase letters, digits and hyphens.
pub fn validate_topic(topic: &str) -> Result<()> {
    let valid = !topic.is_empty()
        && topic.len() <= 50
        && !topic.starts_with('-')
        && topic
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(validation_error_to_anyhow(
            CommandValidationError::InvalidValue {
                argument: "topic".to_string(),
                value: topic.to_string(),
                reason: "use lowercase letters, digits and hyphens".to_string(),
            },
        ))
    }
}

/// Validate a batch size flag
pub fn validate_batch_size(batch_size: Option<usize>) -> Result<()> {
    if batch_size == Some(0) {
        return Err(validation_error_to_anyhow(
            CommandValidationError::InvalidValue {
                argument: "batch-size".to_string(),
                value: "0".to_string(),
                reason: "batch size must be at least 1".to_string(),
            },
        ));
    }
    Ok(())
}

/// Ensure a forced directory scan is not combined with an input list
pub fn validate_source_args(scan: bool, input: &Option<String>) -> Result<()> {
    if scan && input.is_some() {
        return Err(validation_error_to_anyhow(
            CommandValidationError::MutualExclusivity {
                first: "--scan".to_string(),
                second: "--input".to_string(),
            },
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_owner_prefers_flag() {
        assert_eq!(
            require_owner(Some("flag".to_string()), Some("config")).unwrap(),
            "flag"
        );
        assert_eq!(require_owner(None, Some("config")).unwrap(), "config");
    }

    #[test]
    fn test_require_owner_missing() {
        let result = require_owner(None, None);
        assert!(result.unwrap_err().to_string().contains("must be provided"));

        let result = require_owner(Some("  ".to_string()), None);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("owner cannot be empty")
        );
    }

    #[test]
    fn test_validate_topic() {
        assert!(validate_topic("maven-aggregated").is_ok());
        assert!(validate_topic("").is_err());
        assert!(validate_topic("Maven").is_err());
        assert!(validate_topic("-maven").is_err());
        assert!(validate_topic("has space").is_err());
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(None).is_ok());
        assert!(validate_batch_size(Some(4)).is_ok());
        let result = validate_batch_size(Some(0));
        assert!(result.unwrap_err().to_string().contains("at least 1"));
    }

    #[test]
    fn test_validate_source_args_mutual_exclusivity() {
        assert!(validate_source_args(true, &None).is_ok());
        assert!(validate_source_args(false, &Some("repos.json".to_string())).is_ok());
        let result = validate_source_args(true, &Some("repos.json".to_string()));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Cannot specify both")
        );
    }
}
