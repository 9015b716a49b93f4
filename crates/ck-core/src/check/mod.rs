//! The check contract.
//!
//! A check implements [`CheckHandler`]: `build()` returns a fresh
//! [`CheckData`] describing its arguments, attributes and templates, and
//! `check()` probes the subject and finalizes the data into a
//! [`CheckResult`]. The registry stores checks behind the object-safe
//! [`Check`] trait, which every handler gets through a blanket impl.

pub mod args;
pub mod data;
pub mod registry;
pub mod template;

pub use args::{Argument, BindError, CheckArgument};
pub use data::{CheckAttribute, CheckData};
pub use registry::{Registry, RegistryBuilder};

use crate::agent::Agent;
use crate::context::CheckContext;
use crate::result::CheckResult;
use ck_common::{CheckState, Result};
use serde::Serialize;
use tracing::debug;

/// Common arguments every check accepts, with their descriptions.
pub const COMMON_ARGUMENTS: [(&str, &str); 10] = [
    ("filter", "Condition selecting which items are checked"),
    ("warn", "Threshold or condition raising WARNING"),
    ("crit", "Threshold or condition raising CRITICAL"),
    ("ok", "Condition forcing an item back to OK"),
    ("show-all", "Report every metric, not only those in breach"),
    ("empty-state", "State when no item is left after filtering"),
    ("empty-syntax", "Output template when no item is left"),
    ("top-syntax", "Output template for the summary line"),
    ("ok-syntax", "Output template when everything is OK"),
    ("detail-syntax", "Template rendering a single item"),
];

/// A check implementation.
pub trait CheckHandler: Send + Sync {
    /// Values bound from check-specific arguments.
    type Settings: Send + 'static;

    /// Fresh definition with defaults. Must not probe anything.
    fn build(&self) -> CheckData<Self::Settings>;

    /// Probe the subject and produce the result.
    ///
    /// `args` holds the arguments left over by binding, which is only ever
    /// non-empty for checks with `args_passthrough` set.
    fn check(
        &self,
        ctx: &CheckContext,
        agent: &Agent,
        data: &mut CheckData<Self::Settings>,
        args: &[Argument],
    ) -> Result<CheckResult>;
}

/// Object-safe view of a [`CheckHandler`].
pub trait Check: Send + Sync {
    /// Introspection of the check's definition.
    fn info(&self) -> CheckInfo;

    /// Bind `args` onto a fresh definition and run the check.
    fn run(&self, ctx: &CheckContext, agent: &Agent, args: &[Argument]) -> Result<CheckResult>;
}

impl<H: CheckHandler> Check for H {
    fn info(&self) -> CheckInfo {
        CheckInfo::from_data(&self.build())
    }

    fn run(&self, ctx: &CheckContext, agent: &Agent, args: &[Argument]) -> Result<CheckResult> {
        let mut data = self.build();
        let rest = data.parse_args(args)?;
        debug!(
            check = %data.name,
            filters = data.filter.len(),
            warn = data.warn.len(),
            crit = data.crit.len(),
            passthrough = rest.len(),
            "arguments bound"
        );
        ctx.checkpoint()?;
        self.check(ctx, agent, &mut data, &rest)
    }
}

/// Describes one accepted argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentInfo {
    pub key: String,
    pub description: String,
}

/// Everything `build()` declares about a check, in serializable form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInfo {
    pub name: String,
    pub description: String,
    pub arguments: Vec<ArgumentInfo>,
    pub attributes: Vec<CheckAttribute>,
    pub detail_syntax: String,
    pub top_syntax: String,
    pub ok_syntax: String,
    pub empty_syntax: String,
    pub empty_state: CheckState,
    pub default_filter: String,
    pub default_warning: String,
    pub default_critical: String,
    pub args_passthrough: bool,
}

impl CheckInfo {
    pub fn from_data<S>(data: &CheckData<S>) -> Self {
        Self {
            name: data.name.clone(),
            description: data.description.clone(),
            arguments: data
                .args
                .iter()
                .map(|(key, arg)| ArgumentInfo {
                    key: key.clone(),
                    description: arg.description.clone(),
                })
                .collect(),
            attributes: data.attributes.clone(),
            detail_syntax: data.detail_syntax.clone(),
            top_syntax: data.top_syntax.clone(),
            ok_syntax: data.ok_syntax.clone(),
            empty_syntax: data.empty_syntax.clone(),
            empty_state: data.empty_state,
            default_filter: data.default_filter.clone(),
            default_warning: data.default_warning.clone(),
            default_critical: data.default_critical.clone(),
            args_passthrough: data.args_passthrough,
        }
    }
}
