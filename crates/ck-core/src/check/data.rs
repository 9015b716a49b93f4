//! Declarative check definition and result finalization.

use super::args::{parse_flag, Argument, BindError, CheckArgument};
use super::template;
use crate::condition::{match_any, Condition, Row};
use crate::result::CheckResult;
use crate::threshold::{Range, Threshold};
use ck_common::CheckState;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Names available to thresholds evaluated against the aggregate row.
pub const AGGREGATE_FIELDS: [&str; 5] = [
    "count",
    "ok_count",
    "warn_count",
    "crit_count",
    "problem_count",
];

pub const DEFAULT_TOP_SYNTAX: &str = "%(status) - %(problem_list)";
pub const DEFAULT_EMPTY_SYNTAX: &str = "%(status) - no items found";

/// A list-row attribute a check documents and allows in expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckAttribute {
    pub name: String,
    pub description: String,
}

impl CheckAttribute {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// One check invocation's definition and working state.
///
/// `build()` produces it with defaults, argument binding populates it, the
/// probe appends rows and metrics, and [`CheckData::finalize`] turns it into
/// the result.
#[derive(Debug)]
pub struct CheckData<S> {
    pub name: String,
    pub description: String,

    pub detail_syntax: String,
    pub ok_syntax: String,
    pub top_syntax: String,
    pub empty_syntax: String,
    pub empty_state: CheckState,

    /// Check-specific arguments, keyed by lower-case name.
    pub args: BTreeMap<String, CheckArgument<S>>,
    pub attributes: Vec<CheckAttribute>,

    pub default_filter: String,
    pub default_warning: String,
    pub default_critical: String,
    /// Row field and metric threshold name that plain ranges apply to.
    /// Empty means ranges apply to every metric.
    pub threshold_field: String,

    pub result: CheckResult,
    pub list_data: Vec<Row>,

    pub filter: Vec<Condition>,
    pub warn: Vec<Threshold>,
    pub crit: Vec<Threshold>,
    pub ok: Vec<Condition>,

    pub show_all: bool,
    pub args_passthrough: bool,
    /// The check reports metrics only and never appends rows, so an empty
    /// list is not a reason to use `empty_syntax`.
    pub metrics_only: bool,

    /// Values bound from check-specific arguments.
    pub settings: S,
}

/// Tracks which common keys the caller supplied, so repeats combine and
/// defaults only apply when nothing was given.
#[derive(Default)]
struct Seen {
    filter: bool,
    warn: bool,
    crit: bool,
}

impl<S> CheckData<S> {
    pub fn new(name: impl Into<String>, description: impl Into<String>, settings: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            detail_syntax: String::new(),
            ok_syntax: String::new(),
            top_syntax: DEFAULT_TOP_SYNTAX.to_string(),
            empty_syntax: DEFAULT_EMPTY_SYNTAX.to_string(),
            empty_state: CheckState::Unknown,
            args: BTreeMap::new(),
            attributes: Vec::new(),
            default_filter: String::new(),
            default_warning: String::new(),
            default_critical: String::new(),
            threshold_field: String::new(),
            result: CheckResult::default(),
            list_data: Vec::new(),
            filter: Vec::new(),
            warn: Vec::new(),
            crit: Vec::new(),
            ok: Vec::new(),
            show_all: false,
            args_passthrough: false,
            metrics_only: false,
            settings,
        }
    }

    /// Register a check-specific argument.
    pub fn arg(&mut self, key: &str, argument: CheckArgument<S>) -> &mut Self {
        self.args.insert(key.to_ascii_lowercase(), argument);
        self
    }

    /// Declare a list-row attribute.
    pub fn attribute(&mut self, name: &str, description: &str) -> &mut Self {
        self.attributes.push(CheckAttribute::new(name, description));
        self
    }

    /// Bind the caller's arguments.
    ///
    /// Common arguments are handled first, then the check's own table.
    /// Unknown keys are rejected unless `args_passthrough` is set, in which
    /// case they are returned in order for the check's own parser. With
    /// passthrough, a bare word is positional unless it names a flag.
    pub fn parse_args(&mut self, args: &[Argument]) -> Result<Vec<Argument>, BindError> {
        let mut seen = Seen::default();
        let mut passthrough = Vec::new();

        for arg in args {
            let key = arg.normalized_key();
            if self.args_passthrough && arg.value.is_empty() && !self.is_flag_key(&key) {
                trace!(check = %self.name, word = %arg.key, "positional argument");
                passthrough.push(arg.clone());
                continue;
            }
            trace!(check = %self.name, key = %key, value = %arg.value, "binding argument");
            match key.as_str() {
                "filter" => {
                    if !std::mem::replace(&mut seen.filter, true) {
                        self.filter.clear();
                    }
                    if !arg.value.trim().eq_ignore_ascii_case("none") {
                        self.filter.push(parse_condition(&arg.key, &arg.value)?);
                    }
                }
                "warn" | "warning" => {
                    if !std::mem::replace(&mut seen.warn, true) {
                        self.warn.clear();
                    }
                    self.warn.extend(parse_threshold(&arg.key, &arg.value)?);
                }
                "crit" | "critical" => {
                    if !std::mem::replace(&mut seen.crit, true) {
                        self.crit.clear();
                    }
                    self.crit.extend(parse_threshold(&arg.key, &arg.value)?);
                }
                "ok" => self.ok.push(parse_condition(&arg.key, &arg.value)?),
                "show-all" => {
                    self.show_all = parse_flag(&arg.value).map_err(|message| invalid(arg, message))?
                }
                "empty-state" => {
                    self.empty_state = arg
                        .value
                        .parse::<CheckState>()
                        .map_err(|e| invalid(arg, e.to_string()))?
                }
                "empty-syntax" => self.empty_syntax = arg.value.clone(),
                "top-syntax" => self.top_syntax = arg.value.clone(),
                "ok-syntax" => self.ok_syntax = arg.value.clone(),
                "detail-syntax" => self.detail_syntax = arg.value.clone(),
                _ => match self.args.get(&key) {
                    Some(binding) => binding
                        .bind(&mut self.settings, &arg.value)
                        .map_err(|message| invalid(arg, message))?,
                    None if self.args_passthrough => passthrough.push(arg.clone()),
                    None => return Err(BindError::UnknownArgument { key: arg.key.clone() }),
                },
            }
        }

        if !seen.filter && !self.default_filter.is_empty() {
            self.filter.push(parse_condition("filter", &self.default_filter)?);
        }
        if !seen.warn {
            self.warn.extend(parse_threshold("warn", &self.default_warning)?);
        }
        if !seen.crit {
            self.crit.extend(parse_threshold("crit", &self.default_critical)?);
        }

        self.check_fields()?;
        Ok(passthrough)
    }

    fn is_flag_key(&self, key: &str) -> bool {
        key == "show-all" || self.args.get(key).is_some_and(CheckArgument::is_flag)
    }

    // Expression fields must be declared attributes when the check declares any.
    fn check_fields(&self) -> Result<(), BindError> {
        if self.attributes.is_empty() {
            return Ok(());
        }
        let known = |field: &str| {
            self.attributes.iter().any(|a| a.name == field) || AGGREGATE_FIELDS.contains(&field)
        };

        let expressions = self
            .filter
            .iter()
            .map(|c| ("filter", c.fields()))
            .chain(self.ok.iter().map(|c| ("ok", c.fields())))
            .chain(self.warn.iter().map(|t| ("warn", t.fields())))
            .chain(self.crit.iter().map(|t| ("crit", t.fields())));

        for (key, fields) in expressions {
            if let Some(field) = fields.into_iter().find(|f| !known(f)) {
                return Err(BindError::UnknownField {
                    key: key.to_string(),
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Append a list row if it passes the filter.
    pub fn add_row(&mut self, row: Row) -> bool {
        let keep = match_any(&self.filter, &row, true);
        if keep {
            self.list_data.push(row);
        }
        keep
    }

    /// State of a single row under the current thresholds.
    pub fn row_state(&self, row: &Row) -> CheckState {
        if match_any(&self.ok, row, false) {
            return CheckState::Ok;
        }
        let field = self.threshold_field.as_str();
        if self.crit.iter().any(|t| t.matches_row(row, field)) {
            CheckState::Critical
        } else if self.warn.iter().any(|t| t.matches_row(row, field)) {
            CheckState::Warning
        } else {
            CheckState::Ok
        }
    }

    /// State of the aggregate row. Only expressions confined to the
    /// aggregate counters apply; row attributes are absent there.
    fn aggregate_state(&self, aggregate: &Row) -> CheckState {
        let breached = |list: &[Threshold]| {
            list.iter().any(|t| {
                matches!(t, Threshold::Condition(_))
                    && on_aggregate(&t.fields())
                    && t.matches_row(aggregate, "")
            })
        };

        if self
            .ok
            .iter()
            .any(|c| on_aggregate(&c.fields()) && c.matches(aggregate))
        {
            CheckState::Ok
        } else if breached(&self.crit) {
            CheckState::Critical
        } else if breached(&self.warn) {
            CheckState::Warning
        } else {
            CheckState::Ok
        }
    }

    /// Render templates, evaluate thresholds and hand back the result.
    pub fn finalize(&mut self) -> CheckResult {
        let mut result = std::mem::take(&mut self.result);
        let rows = std::mem::take(&mut self.list_data);

        let states: Vec<CheckState> = rows.iter().map(|row| self.row_state(row)).collect();
        let count_of = |state: CheckState| states.iter().filter(|s| **s == state).count();
        let ok_count = count_of(CheckState::Ok);
        let warn_count = count_of(CheckState::Warning);
        let crit_count = count_of(CheckState::Critical);
        let problem_count = rows.len() - ok_count;

        let mut aggregate = Row::new();
        aggregate.insert("count".into(), rows.len().to_string());
        aggregate.insert("ok_count".into(), ok_count.to_string());
        aggregate.insert("warn_count".into(), warn_count.to_string());
        aggregate.insert("crit_count".into(), crit_count.to_string());
        aggregate.insert("problem_count".into(), problem_count.to_string());

        let mut state = states.iter().copied().max().unwrap_or(CheckState::Ok);
        state = state.max(self.aggregate_state(&aggregate));

        self.apply_metric_thresholds(&mut result, &mut state);
        result.state = result.state.max(state);

        let details: Vec<String> = rows.iter().map(|row| self.render_detail(row)).collect();
        let list = details.join(", ");
        let problem_list = details
            .iter()
            .zip(&states)
            .filter(|(_, s)| s.is_problem())
            .map(|(d, _)| d.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        aggregate.insert("list".into(), list);
        aggregate.insert("problem_list".into(), problem_list);
        aggregate.insert("check".into(), self.name.clone());
        aggregate.insert("name".into(), self.name.clone());
        aggregate.insert("empty_state".into(), self.empty_state.to_string());

        if rows.is_empty() && !self.metrics_only && !self.empty_syntax.is_empty() {
            debug!(check = %self.name, state = %self.empty_state, "no rows left after filtering");
            result.state = self.empty_state;
            aggregate.insert("status".into(), result.state.to_string());
            result.output = render_aggregate(&self.empty_syntax, &aggregate);
        } else if result.output.is_empty() {
            aggregate.insert("status".into(), result.state.to_string());
            let syntax = if result.state == CheckState::Ok && !self.ok_syntax.is_empty() {
                &self.ok_syntax
            } else {
                &self.top_syntax
            };
            result.output = render_aggregate(syntax, &aggregate);
        }

        result.output = result.output.trim().to_string();
        result
    }

    fn apply_metric_thresholds(&self, result: &mut CheckResult, state: &mut CheckState) {
        let field = self.threshold_field.as_str();
        let applies = |t: &Threshold, name: &str| match t {
            Threshold::Range(_) => field.is_empty() || field == name,
            Threshold::Condition(_) => true,
        };
        let text_for = |list: &[Threshold], name: &str| {
            list.iter()
                .filter(|t| applies(t, name))
                .find_map(|t| t.range_text(name))
        };

        let metrics = std::mem::take(&mut result.metrics);
        for mut metric in metrics {
            if metric.warning.is_none() {
                metric.warning = text_for(&self.warn, &metric.threshold_name);
            }
            if metric.critical.is_none() {
                metric.critical = text_for(&self.crit, &metric.threshold_name);
            }

            let metric_state = match metric.numeric_value() {
                Some(value) if breaches(metric.critical.as_deref(), value) => CheckState::Critical,
                Some(value) if breaches(metric.warning.as_deref(), value) => CheckState::Warning,
                _ => CheckState::Ok,
            };
            *state = (*state).max(metric_state);

            if self.show_all || metric_state.is_problem() {
                result.metrics.push(metric);
            } else {
                trace!(check = %self.name, metric = %metric.name, "dropping metric within thresholds");
            }
        }
    }

    fn render_detail(&self, row: &Row) -> String {
        template::render(&self.detail_syntax, |name| row.get(name).cloned())
    }
}

fn on_aggregate(fields: &[&str]) -> bool {
    fields.iter().all(|f| AGGREGATE_FIELDS.contains(f))
}

fn render_aggregate(syntax: &str, aggregate: &Row) -> String {
    template::render(syntax, |name| aggregate.get(name).cloned())
}

fn breaches(range: Option<&str>, value: f64) -> bool {
    match range.map(Range::parse) {
        Some(Ok(Some(range))) => range.breached(value),
        Some(Err(e)) => {
            trace!(error = %e, "ignoring unparsable metric threshold");
            false
        }
        _ => false,
    }
}

fn invalid(arg: &Argument, message: String) -> BindError {
    BindError::InvalidValue {
        key: arg.key.clone(),
        message,
    }
}

fn parse_condition(key: &str, value: &str) -> Result<Condition, BindError> {
    Condition::parse(value).map_err(|e| BindError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_threshold(key: &str, value: &str) -> Result<Option<Threshold>, BindError> {
    Threshold::parse(value).map_err(|e| BindError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
