//! `check_uptime`: time since boot.

use crate::agent::Agent;
use crate::check::{Argument, CheckData, CheckHandler};
use crate::condition::Row;
use crate::context::CheckContext;
use crate::result::{CheckMetric, CheckResult};
use chrono::{DateTime, Duration, Utc};
use ck_common::{Error, Result};

const PROC_UPTIME: &str = "/proc/uptime";

pub struct CheckUptime;

impl CheckHandler for CheckUptime {
    type Settings = ();

    fn build(&self) -> CheckData<()> {
        let mut data = CheckData::new("check_uptime", "Checks the time since the last boot.", ());
        data.detail_syntax = "uptime: %(uptime_text), boot: %(boot) (UTC)".into();
        data.top_syntax = "%(status) - %(list)".into();
        data.default_warning = "uptime < 180".into();
        data.default_critical = "uptime < 60".into();
        data.threshold_field = "uptime".into();
        data.show_all = true;
        data.attribute("uptime", "Seconds since boot")
            .attribute("uptime_text", "Time since boot as [<days>d ]<hh>:<mm>h")
            .attribute("boot", "Boot time, UTC");
        data
    }

    fn check(
        &self,
        ctx: &CheckContext,
        _agent: &Agent,
        data: &mut CheckData<()>,
        _args: &[Argument],
    ) -> Result<CheckResult> {
        let seconds = read_uptime()?;
        ctx.checkpoint()?;
        collect(data, seconds, Utc::now());
        Ok(data.finalize())
    }
}

/// Append the uptime row and metric for `seconds` since boot.
pub fn collect<S>(data: &mut CheckData<S>, seconds: f64, now: DateTime<Utc>) {
    let whole = seconds.max(0.0).trunc() as i64;
    let boot = now - Duration::seconds(whole);

    let mut row = Row::new();
    row.insert("uptime".into(), whole.to_string());
    row.insert("uptime_text".into(), format_uptime(whole));
    row.insert("boot".into(), boot.format("%Y-%m-%d %H:%M:%S").to_string());

    if data.add_row(row) {
        data.result
            .add_metric(CheckMetric::new("uptime", whole).with_unit("s"));
    }
}

#[cfg(target_os = "linux")]
fn read_uptime() -> Result<f64> {
    let content = std::fs::read_to_string(PROC_UPTIME)
        .map_err(|e| Error::probe(PROC_UPTIME, e.to_string()))?;
    parse_proc_uptime(&content)
}

#[cfg(not(target_os = "linux"))]
fn read_uptime() -> Result<f64> {
    Err(Error::UnsupportedPlatform(format!(
        "{} is only available on linux",
        PROC_UPTIME
    )))
}

/// Seconds since boot from `/proc/uptime` content (`<uptime> <idle>`).
pub fn parse_proc_uptime(content: &str) -> Result<f64> {
    let field = content
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::probe(PROC_UPTIME, "empty file"))?;
    ck_convert::to_f64(field)
        .ok()
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| Error::probe(PROC_UPTIME, format!("unexpected uptime value {field:?}")))
}

/// `[<days>d ]<hh>:<mm>h`
pub fn format_uptime(seconds: i64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{}d {:02}:{:02}h", days, hours, minutes)
    } else {
        format!("{:02}:{:02}h", hours, minutes)
    }
}
