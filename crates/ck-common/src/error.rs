//! Error types for ckagent.

use thiserror::Error;

/// Result type alias for ckagent operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for check invocation.
///
/// Anything that prevents a check from producing a result ends up here. The
/// caller turns it into an `UNKNOWN` result, so the message is user-visible.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("check {name} is disabled by configuration")]
    CheckDisabled { name: String },

    // Registry errors (20-29)
    #[error("unknown check: {name}")]
    UnknownCheck { name: String },

    #[error("check {name} is already registered")]
    DuplicateCheck { name: String },

    #[error("check registry already initialized")]
    RegistryInitialized,

    #[error("check registry not initialized")]
    RegistryUninitialized,

    // Argument binding errors (30-39)
    #[error("unknown argument: {key}")]
    UnknownArgument { key: String },

    #[error("invalid value for argument {key}: {message}")]
    InvalidArgument { key: String, message: String },

    #[error("malformed argument: {0}")]
    MalformedArgument(String),

    #[error("unknown attribute {field} in {key} expression")]
    UnknownField { key: String, field: String },

    // Probe errors (40-49)
    #[error("{subject}: {message}")]
    Probe { subject: String, message: String },

    // Cancellation (50-59)
    #[error("check cancelled")]
    Cancelled,

    #[error("check timed out after {seconds}s")]
    Timeout { seconds: u64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Platform errors (70-79)
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    /// Build a probe error for the given subject.
    pub fn probe(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Probe {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::CheckDisabled { .. } => 11,
            Error::UnknownCheck { .. } => 20,
            Error::DuplicateCheck { .. } => 21,
            Error::RegistryInitialized => 22,
            Error::RegistryUninitialized => 23,
            Error::UnknownArgument { .. } => 30,
            Error::InvalidArgument { .. } => 31,
            Error::MalformedArgument(_) => 32,
            Error::UnknownField { .. } => 33,
            Error::Probe { .. } => 40,
            Error::Cancelled => 50,
            Error::Timeout { .. } => 51,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::UnsupportedPlatform(_) => 70,
        }
    }

    /// Whether the error stems from how the check was called rather than
    /// from the subject being probed.
    pub fn is_usage_error(&self) -> bool {
        (30..40).contains(&self.code()) || matches!(self, Error::UnknownCheck { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_family() {
        assert_eq!(Error::Config("x".into()).code(), 10);
        assert_eq!(Error::UnknownCheck { name: "x".into() }.code(), 20);
        assert_eq!(Error::UnknownArgument { key: "x".into() }.code(), 30);
        assert_eq!(Error::probe("svc", "gone").code(), 40);
        assert_eq!(Error::Cancelled.code(), 50);
    }

    #[test]
    fn probe_error_carries_cause() {
        let err = Error::probe("/proc/uptime", "No such file or directory");
        assert_eq!(err.to_string(), "/proc/uptime: No such file or directory");
    }

    #[test]
    fn usage_errors() {
        assert!(Error::UnknownArgument { key: "x".into() }.is_usage_error());
        assert!(Error::UnknownCheck { name: "x".into() }.is_usage_error());
        assert!(!Error::Cancelled.is_usage_error());
    }
}
