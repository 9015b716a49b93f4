//! ckagent configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the agent configuration file
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - A JSON schema of the file format

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{resolve_config, ConfigPaths, ConfigSource, ResolvedConfig, CONFIG_ENV_VAR};
pub use settings::{AgentConfig, CheckDefaults, CommandAlias, LogLevel};
pub use validate::{validate_config, ValidationError};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = ck_common::SCHEMA_VERSION;
