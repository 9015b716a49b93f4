//! Agent state shared by check invocations.

use crate::check::{Argument, Registry};
use crate::context::CheckContext;
use crate::result::CheckResult;
use chrono::{DateTime, Utc};
use ck_common::{Error, Result};
use ck_config::AgentConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolved configuration plus the check registry.
pub struct Agent {
    config: AgentConfig,
    registry: Arc<Registry>,
    started: DateTime<Utc>,
}

impl Agent {
    pub fn new(config: AgentConfig, registry: Arc<Registry>) -> Self {
        Self {
            config,
            registry,
            started: Utc::now(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// When this agent was created.
    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Run a check without deadline. Never fails: errors become an UNKNOWN
    /// result.
    pub fn run_check<S: AsRef<str>>(&self, name: &str, args: &[S]) -> CheckResult {
        self.run_check_with(&CheckContext::new(), name, args)
    }

    /// Run a check under `ctx`. Never fails: errors become an UNKNOWN result.
    pub fn run_check_with<S: AsRef<str>>(
        &self,
        ctx: &CheckContext,
        name: &str,
        args: &[S],
    ) -> CheckResult {
        match self.try_run_check(ctx, name, args) {
            Ok(result) => {
                info!(check = name, state = %result.state, metrics = result.metrics.len(), "check finished");
                result
            }
            Err(e) => {
                warn!(check = name, error = %e, code = e.code(), "check failed");
                CheckResult::unknown(e)
            }
        }
    }

    /// Run a check, surfacing invocation errors.
    pub fn try_run_check<S: AsRef<str>>(
        &self,
        ctx: &CheckContext,
        name: &str,
        args: &[S],
    ) -> Result<CheckResult> {
        let (command, raw_args) = self.expand(name, args);
        let canonical = self.registry.canonical_name(&command)?.to_string();

        if self.config.is_disabled(&canonical) || self.config.is_disabled(&command) {
            return Err(Error::CheckDisabled { name: canonical });
        }

        let mut all_args: Vec<String> = self.config.default_args(&canonical).to_vec();
        if command != canonical {
            all_args.extend(self.config.default_args(&command).iter().cloned());
        }
        all_args.extend(raw_args);
        let args = Argument::parse_all(&all_args)?;

        debug!(check = %canonical, invoked_as = name, args = ?all_args, "running check");
        let handler = self.registry.create(&canonical)?;
        ctx.checkpoint()?;
        handler.run(ctx, self, &args)
    }

    // Expand a configured command alias into its target and preset args.
    fn expand<S: AsRef<str>>(&self, name: &str, args: &[S]) -> (String, Vec<String>) {
        let caller = args.iter().map(|a| a.as_ref().to_string());
        match self.config.aliases.get(name) {
            Some(alias) => {
                debug!(alias = name, command = %alias.command, "expanding command alias");
                let mut expanded = alias.args.clone();
                expanded.extend(caller);
                (alias.command.clone(), expanded)
            }
            None => (name.to_string(), caller.collect()),
        }
    }
}
