//! Exit codes for the ckagent CLI.
//!
//! `ckagent run` exits with the check state so the binary can stand in for
//! a monitoring plugin. Every other subcommand uses the codes from 10 up
//! for its own failures.

use ck_common::CheckState;

/// Exit codes for ckagent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Check state OK / command succeeded
    Ok = 0,

    /// Check state WARNING
    Warning = 1,

    /// Check state CRITICAL
    Critical = 2,

    /// Check state UNKNOWN
    Unknown = 3,

    /// Configuration error
    ConfigError = 10,

    /// Unknown check or bad arguments
    UsageError = 11,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        self == ExitCode::Ok
    }

    /// Check if this exit code reports a failure of ckagent itself rather
    /// than a check state.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Exit code for a command that failed with `err`.
    pub fn from_error(err: &ck_common::Error) -> Self {
        use ck_common::Error;
        match err {
            Error::Config(_) | Error::CheckDisabled { .. } => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            e if e.is_usage_error() => ExitCode::UsageError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<CheckState> for ExitCode {
    fn from(state: CheckState) -> Self {
        match state {
            CheckState::Ok => ExitCode::Ok,
            CheckState::Warning => ExitCode::Warning,
            CheckState::Critical => ExitCode::Critical,
            CheckState::Unknown => ExitCode::Unknown,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
