//! ckagent check core.
//!
//! This crate carries the check contract shared by every probe and the
//! plugin-output protocol they report in:
//! - thresholds and ranges ([`threshold`]) and the row filter language
//!   ([`condition`]),
//! - the result model and its text codec ([`result`]),
//! - check definitions, argument binding, templates and the registry
//!   ([`check`]),
//! - the agent that runs checks by name ([`agent`]) and a few built-in
//!   checks ([`checks`]).

pub mod agent;
pub mod check;
pub mod checks;
pub mod condition;
pub mod context;
pub mod exit_codes;
pub mod logging;
pub mod result;
pub mod threshold;

pub use agent::Agent;
pub use check::{Argument, Check, CheckData, CheckHandler, Registry};
pub use ck_common::{CheckState, Error, Result};
pub use context::CheckContext;
pub use exit_codes::ExitCode;
pub use result::{CheckMetric, CheckResult};
