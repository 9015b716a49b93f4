//! Log subscriber setup for the ckagent binary.
//!
//! Logs always go to stderr; stdout is reserved for plugin output and JSON.

use ck_common::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "CKAGENT_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Effective log directive from the CLI flags, the environment and the
/// configured level, in that order of precedence.
///
/// `-q` silences everything but errors; each `-v` raises the default `warn`
/// one step.
pub fn directive(
    explicit: Option<&str>,
    verbose: u8,
    quiet: bool,
    env: Option<&str>,
    configured: Option<&str>,
) -> String {
    if let Some(level) = explicit {
        return level.to_string();
    }
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => {}
        1 => return "info".to_string(),
        2 => return "debug".to_string(),
        _ => return "trace".to_string(),
    }
    env.filter(|e| !e.trim().is_empty())
        .or(configured)
        .unwrap_or("warn")
        .to_string()
}

/// Install the global subscriber.
pub fn init(directive: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| Error::Config(format!("invalid log filter {directive:?}: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(false),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false),
            )
            .try_init(),
    };
    installed.map_err(|e| Error::Config(format!("failed to install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence() {
        assert_eq!(directive(Some("trace"), 0, true, Some("info"), None), "trace");
        assert_eq!(directive(None, 0, true, Some("info"), None), "error");
        assert_eq!(directive(None, 1, false, Some("error"), None), "info");
        assert_eq!(directive(None, 2, false, None, None), "debug");
        assert_eq!(directive(None, 5, false, None, None), "trace");
        assert_eq!(directive(None, 0, false, Some("ck_core=debug"), Some("info")), "ck_core=debug");
        assert_eq!(directive(None, 0, false, Some(" "), Some("info")), "info");
        assert_eq!(directive(None, 0, false, None, None), "warn");
    }
}
