//! Agent configuration types.
//!
//! The configuration only carries what the check core consumes: default
//! arguments per check, checks switched off, and user-level command aliases
//! that expand into a check name plus arguments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::validate::ValidationError;

/// Complete agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default log level when neither the command line nor the environment
    /// sets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    /// Per-check settings, keyed by check name.
    #[serde(default)]
    pub checks: BTreeMap<String, CheckDefaults>,

    /// Command aliases, keyed by alias name.
    #[serde(default)]
    pub aliases: BTreeMap<String, CommandAlias>,
}

/// Settings applied to every invocation of one check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckDefaults {
    /// Arguments placed before the caller's own, so the caller can
    /// override them.
    #[serde(default)]
    pub default_args: Vec<String>,

    /// Refuse to run this check.
    #[serde(default)]
    pub disabled: bool,
}

/// A named shortcut for a check with preset arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CommandAlias {
    /// The check (or registry alias) to run.
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ValidationError::InvalidValue {
                field: "log_level".to_string(),
                message: format!("unknown log level {s:?}"),
            }),
        }
    }
}

impl AgentConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ValidationError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse_json(&content)
    }

    /// Parse and validate configuration JSON.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        let config: AgentConfig = serde_json::from_str(json)?;
        crate::validate::validate_config(&config)?;
        Ok(config)
    }

    /// Settings for one check, if any are configured.
    pub fn check(&self, name: &str) -> Option<&CheckDefaults> {
        self.checks.get(name)
    }

    /// Configured default arguments for a check.
    pub fn default_args(&self, name: &str) -> &[String] {
        self.check(name)
            .map(|c| c.default_args.as_slice())
            .unwrap_or_default()
    }

    /// Whether a check has been switched off.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.check(name).is_some_and(|c| c.disabled)
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(AgentConfig)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            log_level: None,
            checks: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "schema_version": "1.0.0",
            "log_level": "debug",
            "checks": {
                "check_memory": {"default_args": ["warn=used_pct > 70"]},
                "check_uptime": {"disabled": true}
            },
            "aliases": {
                "alias_mem": {"command": "check_memory", "args": ["show-all"]}
            }
        }"#
    }

    #[test]
    fn test_parse_sample() {
        let config = AgentConfig::parse_json(sample_json()).unwrap();
        assert_eq!(config.log_level, Some(LogLevel::Debug));
        assert_eq!(config.default_args("check_memory"), ["warn=used_pct > 70"]);
        assert!(config.default_args("check_dummy").is_empty());
        assert!(config.is_disabled("check_uptime"));
        assert!(!config.is_disabled("check_memory"));
        assert_eq!(config.aliases["alias_mem"].command, "check_memory");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AgentConfig::parse_json(r#"{"schema_version": "1.2.0"}"#).unwrap();
        assert!(config.checks.is_empty());
        assert!(config.aliases.is_empty());
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = AgentConfig::parse_json(r#"{"schema_version": "1.0.0", "bogus": 1}"#);
        assert!(matches!(err, Err(ValidationError::Parse(_))));
    }

    #[test]
    fn test_default_round_trips() {
        let config = AgentConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = AgentConfig::parse_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = serde_json::to_string(&AgentConfig::json_schema()).unwrap();
        assert!(schema.contains("default_args"));
        assert!(schema.contains("aliases"));
    }
}
