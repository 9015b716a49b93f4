//! Check results and their plugin-output rendering.

pub mod metric;
pub mod perfdata;

pub use metric::CheckMetric;
pub use perfdata::{build_plugin_output, parse_perf_data, parse_plugin_output, split_plugin_output};

use ck_common::CheckState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one check invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub state: CheckState,
    pub output: String,
    /// Display order is insertion order.
    #[serde(default)]
    pub metrics: Vec<CheckMetric>,
}

impl CheckResult {
    pub fn new(state: CheckState, output: impl Into<String>) -> Self {
        Self {
            state,
            output: output.into(),
            metrics: Vec::new(),
        }
    }

    /// The result reported when a check could not run at all.
    pub fn unknown(error: impl fmt::Display) -> Self {
        Self::new(
            CheckState::Unknown,
            format!("{} - {}", CheckState::Unknown, error),
        )
    }

    pub fn add_metric(&mut self, metric: CheckMetric) {
        self.metrics.push(metric);
    }

    /// Raise the state to at least `state`.
    pub fn escalate(&mut self, state: CheckState) {
        self.state = self.state.max(state);
    }

    /// Render as plugin output text.
    pub fn build_plugin_output(&self) -> String {
        build_plugin_output(&self.output, &self.metrics)
    }

    /// Parse plugin output text.
    ///
    /// The state is read from a leading status word (`OK`, `WARNING`,
    /// `CRITICAL`, `UNKNOWN`); output without one is UNKNOWN.
    pub fn parse_plugin_output(raw: &str) -> Self {
        let (output, metrics) = parse_plugin_output(raw);
        let state = leading_state(&output).unwrap_or(CheckState::Unknown);
        Self {
            state,
            output,
            metrics,
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build_plugin_output())
    }
}

fn leading_state(output: &str) -> Option<CheckState> {
    let word = output
        .split(|c: char| c.is_whitespace() || c == '-' || c == ':')
        .next()?;
    match word {
        "OK" => Some(CheckState::Ok),
        "WARNING" => Some(CheckState::Warning),
        "CRITICAL" => Some(CheckState::Critical),
        "UNKNOWN" => Some(CheckState::Unknown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_result_carries_error_text() {
        let r = CheckResult::unknown("no such check: check_x");
        assert_eq!(r.state, CheckState::Unknown);
        assert_eq!(r.output, "UNKNOWN - no such check: check_x");
        assert!(r.metrics.is_empty());
    }

    #[test]
    fn escalate_only_raises() {
        let mut r = CheckResult::new(CheckState::Warning, "");
        r.escalate(CheckState::Ok);
        assert_eq!(r.state, CheckState::Warning);
        r.escalate(CheckState::Critical);
        assert_eq!(r.state, CheckState::Critical);
    }

    #[test]
    fn parse_reads_leading_state() {
        let r = CheckResult::parse_plugin_output("WARNING - disk |'free'=10GB;20:");
        assert_eq!(r.state, CheckState::Warning);
        assert_eq!(r.output, "WARNING - disk");
        assert_eq!(r.metrics[0].warning.as_deref(), Some("20:"));

        let r = CheckResult::parse_plugin_output("OK: fine");
        assert_eq!(r.state, CheckState::Ok);

        let r = CheckResult::parse_plugin_output("all good");
        assert_eq!(r.state, CheckState::Unknown);
    }

    #[test]
    fn display_renders_plugin_output() {
        let mut r = CheckResult::new(CheckState::Ok, "OK - up 3 days");
        r.add_metric(CheckMetric::new("uptime", 259200).with_unit("s"));
        assert_eq!(r.to_string(), "OK - up 3 days |'uptime'=259200s");
    }

    #[test]
    fn serializes_with_state_word() {
        let r = CheckResult::new(CheckState::Critical, "CRITICAL - x");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["state"], "CRITICAL");
        assert_eq!(json["metrics"], serde_json::json!([]));
    }
}
