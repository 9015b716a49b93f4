//! Canonical check states.
//!
//! The ordinal values are the process exit codes defined by the monitoring
//! plugin convention and are stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of one check invocation.
///
/// Ordering follows severity, so aggregating several states is `max()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum CheckState {
    #[default]
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl CheckState {
    /// Map an ordinal onto a state. Anything unrecognized is `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => CheckState::Ok,
            1 => CheckState::Warning,
            2 => CheckState::Critical,
            _ => CheckState::Unknown,
        }
    }

    /// The ordinal of this state.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Process exit code for this state.
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    /// The status word used in plugin output.
    pub fn as_str(self) -> &'static str {
        match self {
            CheckState::Ok => "OK",
            CheckState::Warning => "WARNING",
            CheckState::Critical => "CRITICAL",
            CheckState::Unknown => "UNKNOWN",
        }
    }

    /// Whether this state is anything but OK.
    pub fn is_problem(self) -> bool {
        self != CheckState::Ok
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a state name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown check state: {0:?} (expected ok, warning, critical, unknown or 0-3)")]
pub struct ParseStateError(pub String);

impl FromStr for CheckState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "ok" => Ok(CheckState::Ok),
            "1" | "warn" | "warning" => Ok(CheckState::Warning),
            "2" | "crit" | "critical" => Ok(CheckState::Critical),
            "3" | "unknown" => Ok(CheckState::Unknown),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}

impl From<CheckState> for i32 {
    fn from(state: CheckState) -> Self {
        state.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ordinals_render_as_unknown() {
        assert_eq!(CheckState::from_code(0), CheckState::Ok);
        assert_eq!(CheckState::from_code(2), CheckState::Critical);
        assert_eq!(CheckState::from_code(3), CheckState::Unknown);
        assert_eq!(CheckState::from_code(-1).as_str(), "UNKNOWN");
        assert_eq!(CheckState::from_code(42).as_str(), "UNKNOWN");
    }

    #[test]
    fn severity_ordering() {
        let worst = [CheckState::Warning, CheckState::Ok, CheckState::Critical]
            .into_iter()
            .max();
        assert_eq!(worst, Some(CheckState::Critical));
        assert!(CheckState::Unknown > CheckState::Critical);
    }

    #[test]
    fn parse_names_and_digits() {
        assert_eq!("OK".parse::<CheckState>(), Ok(CheckState::Ok));
        assert_eq!("warn".parse::<CheckState>(), Ok(CheckState::Warning));
        assert_eq!("Critical".parse::<CheckState>(), Ok(CheckState::Critical));
        assert_eq!("3".parse::<CheckState>(), Ok(CheckState::Unknown));
        assert!("maybe".parse::<CheckState>().is_err());
    }

    #[test]
    fn serde_uses_status_words() {
        let json = serde_json::to_string(&CheckState::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let back: CheckState = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(back, CheckState::Critical);
    }
}
