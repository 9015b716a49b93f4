//! Semantic validation of the agent configuration.

use thiserror::Error;

use crate::settings::AgentConfig;

/// Errors found while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("incompatible schema version {found} (expected {expected})")]
    IncompatibleSchema { found: String, expected: String },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("invalid alias {alias}: {message}")]
    InvalidAlias { alias: String, message: String },
}

/// Result of validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check a parsed configuration for values serde cannot rule out.
pub fn validate_config(config: &AgentConfig) -> ValidationResult<()> {
    if !ck_common::schema::is_compatible(&config.schema_version) {
        return Err(ValidationError::IncompatibleSchema {
            found: config.schema_version.clone(),
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
        });
    }

    for name in config.checks.keys() {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "checks".to_string(),
                message: "check name must not be empty".to_string(),
            });
        }
    }

    for (alias, target) in &config.aliases {
        if alias.trim().is_empty() {
            return Err(ValidationError::InvalidAlias {
                alias: alias.clone(),
                message: "alias name must not be empty".to_string(),
            });
        }
        if target.command.trim().is_empty() {
            return Err(ValidationError::InvalidAlias {
                alias: alias.clone(),
                message: "command must not be empty".to_string(),
            });
        }
        if target.command == *alias {
            return Err(ValidationError::InvalidAlias {
                alias: alias.clone(),
                message: "alias refers to itself".to_string(),
            });
        }
        if config.aliases.contains_key(&target.command) {
            return Err(ValidationError::InvalidAlias {
                alias: alias.clone(),
                message: format!("alias points at another alias ({})", target.command),
            });
        }
    }

    Ok(())
}
