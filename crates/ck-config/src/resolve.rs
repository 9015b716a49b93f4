//! Configuration file resolution.
//!
//! Precedence: explicit path (`--config`) → `CKAGENT_CONFIG` → XDG config
//! directory → built-in defaults. A file named explicitly must exist; the
//! implicit XDG location is optional.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::settings::AgentConfig;
use crate::validate::ValidationError;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "CKAGENT_CONFIG";

/// File name looked up in the config directory.
const CONFIG_FILE_NAME: &str = "config.json";

/// Candidate locations for the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path given on the command line.
    pub explicit: Option<PathBuf>,
    /// Path from the environment.
    pub env: Option<PathBuf>,
    /// Per-user config directory (`~/.config/ckagent`).
    pub config_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Gather candidate paths from the environment and the platform.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            env: std::env::var_os(CONFIG_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            config_dir: dirs::config_dir().map(|d| d.join("ckagent")),
        }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    ConfigDir(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit(path) => write!(f, "{}", path.display()),
            ConfigSource::Env(path) => write!(f, "{} (from {})", path.display(), CONFIG_ENV_VAR),
            ConfigSource::ConfigDir(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// A loaded configuration together with its origin.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AgentConfig,
    pub source: ConfigSource,
}

/// Resolve and load the configuration.
pub fn resolve_config(paths: &ConfigPaths) -> Result<ResolvedConfig, ValidationError> {
    if let Some(path) = &paths.explicit {
        debug!(path = %path.display(), "loading explicit config");
        return Ok(ResolvedConfig {
            config: AgentConfig::from_file(path)?,
            source: ConfigSource::Explicit(path.clone()),
        });
    }

    if let Some(path) = &paths.env {
        debug!(path = %path.display(), "loading config from {}", CONFIG_ENV_VAR);
        return Ok(ResolvedConfig {
            config: AgentConfig::from_file(path)?,
            source: ConfigSource::Env(path.clone()),
        });
    }

    if let Some(dir) = &paths.config_dir {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!(path = %path.display(), "loading config from config dir");
            return Ok(ResolvedConfig {
                config: AgentConfig::from_file(&path)?,
                source: ConfigSource::ConfigDir(path),
            });
        }
    }

    debug!("no config file found, using defaults");
    Ok(ResolvedConfig {
        config: AgentConfig::default(),
        source: ConfigSource::Defaults,
    })
}
