//! Configuration validation utilities
//!
//! Every rule is checked and all violations are returned together, so one
//! run of the tool reports everything wrong with a config file.

use crate::config::Config;
use anyhow::anyhow;

/// Enumeration of possible validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A coordinate field is empty
    EmptyCoordinate(&'static str),
    /// A coordinate field holds a property placeholder
    PlaceholderCoordinate(&'static str, String),
    /// A batch size is zero
    InvalidBatchSize(&'static str),
    /// The Maven timeout is zero
    InvalidTimeout,
    /// The Maven executable is empty
    EmptyExecutable,
    /// The GitHub list limit is zero
    InvalidListLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyCoordinate(field) => write!(f, "{} cannot be empty", field),
            ValidationError::PlaceholderCoordinate(field, value) => {
                write!(f, "{} cannot contain a placeholder: '{}'", field, value)
            }
            ValidationError::InvalidBatchSize(field) => {
                write!(f, "{} must be at least 1", field)
            }
            ValidationError::InvalidTimeout => write!(f, "maven.timeoutSecs must be at least 1"),
            ValidationError::EmptyExecutable => write!(f, "maven.executable cannot be empty"),
            ValidationError::InvalidListLimit => write!(f, "github.limit must be at least 1"),
        }
    }
}

fn check_coordinate(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::EmptyCoordinate(field));
    } else if value.contains("${") {
        errors.push(ValidationError::PlaceholderCoordinate(field, value.to_string()));
    }
}

/// Validates a complete configuration object
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_coordinate("project.groupId", &config.project.group_id, &mut errors);
    check_coordinate("project.artifactId", &config.project.artifact_id, &mut errors);
    check_coordinate("project.version", &config.project.version, &mut errors);

    if let Some(parent) = &config.parent {
        check_coordinate("parent.groupId", &parent.group_id, &mut errors);
        check_coordinate("parent.artifactId", &parent.artifact_id, &mut errors);
        if let Some(version) = parent.version.as_deref().filter(|v| !v.trim().is_empty()) {
            check_coordinate("parent.version", version, &mut errors);
        }
    }

    if config.maven.executable.trim().is_empty() {
        errors.push(ValidationError::EmptyExecutable);
    }
    if config.maven.timeout_secs == 0 {
        errors.push(ValidationError::InvalidTimeout);
    }
    if config.discovery.batch_size == 0 {
        errors.push(ValidationError::InvalidBatchSize("discovery.batchSize"));
    }
    if config.aggregation.batch_size == Some(0) {
        errors.push(ValidationError::InvalidBatchSize("aggregation.batchSize"));
    }
    if config.github.limit == 0 {
        errors.push(ValidationError::InvalidListLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Converts validation errors to a user-friendly anyhow error
pub fn validation_errors_to_anyhow(errors: Vec<ValidationError>) -> anyhow::Error {
    let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    anyhow!("Validation errors: {}", error_messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParentConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = Config::default();
        config.project.artifact_id = " ".to_string();
        config.project.version = "${revision}".to_string();
        config.aggregation.batch_size = Some(0);
        config.github.limit = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyCoordinate("project.artifactId"),
                ValidationError::PlaceholderCoordinate("project.version", "${revision}".to_string()),
                ValidationError::InvalidBatchSize("aggregation.batchSize"),
                ValidationError::InvalidListLimit,
            ]
        );
    }

    #[test]
    fn test_parent_without_version_is_valid() {
        let mut config = Config::default();
        config.parent = Some(ParentConfig {
            group_id: "g".to_string(),
            artifact_id: "".to_string(),
            version: None,
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyCoordinate("parent.artifactId")]);

        config.parent = Some(ParentConfig {
            group_id: "g".to_string(),
            artifact_id: "a".to_string(),
            version: None,
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_errors_to_anyhow_joins_messages() {
        let error = validation_errors_to_anyhow(vec![
            ValidationError::InvalidTimeout,
            ValidationError::EmptyExecutable,
        ]);
        assert_eq!(
            error.to_string(),
            "Validation errors: maven.timeoutSecs must be at least 1; maven.executable cannot be empty"
        );
    }
}
