//! `check_dummy`: reports whatever state and text it is given.

use crate::agent::Agent;
use crate::check::{Argument, BindError, CheckArgument, CheckData, CheckHandler};
use crate::context::CheckContext;
use crate::result::CheckResult;
use ck_common::{CheckState, Result};

#[derive(Debug, Default)]
pub struct DummySettings {
    pub state: CheckState,
    pub text: String,
}

pub struct CheckDummy;

impl CheckHandler for CheckDummy {
    type Settings = DummySettings;

    fn build(&self) -> CheckData<DummySettings> {
        let mut data = CheckData::new(
            "check_dummy",
            "Returns the given state and output text. Usage: check_dummy <state> [text...]",
            DummySettings::default(),
        );
        data.args_passthrough = true;
        data.metrics_only = true;
        data.arg(
            "state",
            CheckArgument::state(
                "State to return (0-3 or ok|warning|critical|unknown)",
                |s: &mut DummySettings| &mut s.state,
            ),
        )
        .arg(
            "text",
            CheckArgument::string("Output text", |s: &mut DummySettings| &mut s.text),
        );
        data
    }

    fn check(
        &self,
        _ctx: &CheckContext,
        _agent: &Agent,
        data: &mut CheckData<DummySettings>,
        args: &[Argument],
    ) -> Result<CheckResult> {
        let (state, text) = positional(args)?;
        if let Some(state) = state {
            data.settings.state = state;
        }
        if let Some(text) = text {
            data.settings.text = text;
        }

        let state = data.settings.state;
        data.result.state = state;
        data.result.output = if data.settings.text.is_empty() {
            state.to_string()
        } else {
            format!("{} - {}", state, data.settings.text)
        };
        Ok(data.finalize())
    }
}

/// `<state> [text...]` from the passthrough arguments.
fn positional(args: &[Argument]) -> std::result::Result<(Option<CheckState>, Option<String>), BindError> {
    let Some((first, rest)) = args.split_first() else {
        return Ok((None, None));
    };
    let state = first
        .to_raw()
        .parse::<CheckState>()
        .map_err(|e| BindError::InvalidValue {
            key: "state".to_string(),
            message: e.to_string(),
        })?;
    let text = (!rest.is_empty()).then(|| {
        rest.iter()
            .map(Argument::to_raw)
            .collect::<Vec<_>>()
            .join(" ")
    });
    Ok((Some(state), text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Registry;
    use ck_config::AgentConfig;
    use std::sync::Arc;

    fn run(args: &[&str]) -> Result<CheckResult> {
        let agent = Agent::new(AgentConfig::default(), Arc::new(Registry::builtin()?));
        agent.try_run_check(&CheckContext::new(), "check_dummy", args)
    }

    #[test]
    fn positional_state_and_text() {
        let result = run(&["2", "disk", "full"]).unwrap();
        assert_eq!(result.state, CheckState::Critical);
        assert_eq!(result.output, "CRITICAL - disk full");
        assert!(result.metrics.is_empty());
    }

    #[test]
    fn state_only() {
        let result = run(&["0"]).unwrap();
        assert_eq!(result.output, "OK");
        let result = run(&["unknown"]).unwrap();
        assert_eq!(result.state, CheckState::Unknown);
    }

    #[test]
    fn defaults_to_ok_without_arguments() {
        let result = run(&[]).unwrap();
        assert_eq!(result.state, CheckState::Ok);
        assert_eq!(result.output, "OK");
    }

    #[test]
    fn named_bindings() {
        let result = run(&["state=warning", "text='two words'"]).unwrap();
        assert_eq!(result.state, CheckState::Warning);
        assert_eq!(result.output, "WARNING - two words");
    }

    #[test]
    fn text_may_contain_equals() {
        let result = run(&["1", "load=high"]).unwrap();
        assert_eq!(result.output, "WARNING - load=high");
    }

    #[test]
    fn text_words_that_name_common_arguments() {
        let result = run(&["0", "ok"]).unwrap();
        assert_eq!(result.state, CheckState::Ok);
        assert_eq!(result.output, "OK - ok");

        let result = run(&["1", "filter", "text", "warn"]).unwrap();
        assert_eq!(result.state, CheckState::Warning);
        assert_eq!(result.output, "WARNING - filter text warn");
    }

    #[test]
    fn bad_positional_state() {
        let err = run(&["seven"]).unwrap_err();
        assert!(matches!(err, ck_common::Error::InvalidArgument { .. }));
    }
}
