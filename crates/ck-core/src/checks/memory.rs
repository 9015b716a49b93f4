//! `check_memory`: physical and swap usage.

use crate::agent::Agent;
use crate::check::{Argument, CheckArgument, CheckData, CheckHandler};
use crate::condition::Row;
use crate::context::CheckContext;
use crate::result::{CheckMetric, CheckResult};
use ck_common::{Error, Result};
use std::collections::HashMap;

const PROC_MEMINFO: &str = "/proc/meminfo";

/// Memory types in report order.
pub const MEMORY_TYPES: [&str; 2] = ["physical", "swap"];

#[derive(Debug)]
pub struct MemorySettings {
    /// Comma separated memory types to report.
    pub types: String,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            types: MEMORY_TYPES.join(","),
        }
    }
}

/// Size and usage of one memory type, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub size: u64,
    pub used: u64,
}

impl MemoryUsage {
    pub fn free(&self) -> u64 {
        self.size.saturating_sub(self.used)
    }

    /// Used share in percent, one decimal.
    pub fn used_pct(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        (self.used as f64 * 1000.0 / self.size as f64).round() / 10.0
    }
}

/// Physical and swap usage from `/proc/meminfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemInfo {
    pub physical: MemoryUsage,
    pub swap: MemoryUsage,
}

impl MemInfo {
    pub fn usage(&self, kind: &str) -> Option<MemoryUsage> {
        match kind {
            "physical" => Some(self.physical),
            "swap" => Some(self.swap),
            _ => None,
        }
    }
}

pub struct CheckMemory;

impl CheckHandler for CheckMemory {
    type Settings = MemorySettings;

    fn build(&self) -> CheckData<MemorySettings> {
        let mut data = CheckData::new(
            "check_memory",
            "Checks physical and swap memory usage.",
            MemorySettings::default(),
        );
        data.detail_syntax = "%(type) = %(used_hr) (%(used_pct)%)".into();
        data.top_syntax = "%(status) - %(list)".into();
        data.default_warning = "used_pct > 80".into();
        data.default_critical = "used_pct > 90".into();
        data.threshold_field = "used_pct".into();
        data.show_all = true;
        data.arg(
            "type",
            CheckArgument::string(
                "Memory types to check, comma separated (physical, swap)",
                |s: &mut MemorySettings| &mut s.types,
            ),
        );
        data.attribute("type", "Memory type: physical or swap")
            .attribute("used", "Used bytes")
            .attribute("used_hr", "Used memory, human readable")
            .attribute("free", "Free bytes")
            .attribute("size", "Total bytes")
            .attribute("used_pct", "Used memory in percent")
            .attribute("free_pct", "Free memory in percent");
        data
    }

    fn check(
        &self,
        ctx: &CheckContext,
        _agent: &Agent,
        data: &mut CheckData<MemorySettings>,
        _args: &[Argument],
    ) -> Result<CheckResult> {
        let types = selected_types(&data.settings.types)?;
        let info = read_meminfo()?;
        ctx.checkpoint()?;
        collect(data, &info, &types);
        Ok(data.finalize())
    }
}

fn selected_types(raw: &str) -> Result<Vec<&'static str>> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            MEMORY_TYPES
                .iter()
                .copied()
                .find(|known| known.eq_ignore_ascii_case(t))
                .ok_or_else(|| Error::InvalidArgument {
                    key: "type".to_string(),
                    message: format!("unknown memory type {t:?}"),
                })
        })
        .collect()
}

/// Append one row and its metrics per memory type.
pub fn collect<S>(data: &mut CheckData<S>, info: &MemInfo, types: &[&str]) {
    for kind in types {
        let Some(usage) = info.usage(kind) else {
            continue;
        };
        let used_pct = usage.used_pct();

        let mut row = Row::new();
        row.insert("type".into(), kind.to_string());
        row.insert("used".into(), usage.used.to_string());
        row.insert("used_hr".into(), format_bytes(usage.used));
        row.insert("free".into(), usage.free().to_string());
        row.insert("size".into(), usage.size.to_string());
        row.insert("used_pct".into(), ck_convert::num_to_string_or_zero(used_pct));
        row.insert(
            "free_pct".into(),
            ck_convert::num_to_string_or_zero(((100.0 - used_pct) * 10.0).round() / 10.0),
        );

        if !data.add_row(row) {
            continue;
        }
        data.result.add_metric(
            CheckMetric::new(*kind, usage.used)
                .with_unit("B")
                .with_threshold_name("used")
                .with_min(0.0)
                .with_max(usage.size as f64),
        );
        data.result.add_metric(
            CheckMetric::new(format!("{} %", kind), used_pct)
                .with_unit("%")
                .with_threshold_name("used_pct")
                .with_min(0.0)
                .with_max(100.0),
        );
    }
}

#[cfg(target_os = "linux")]
fn read_meminfo() -> Result<MemInfo> {
    let content = std::fs::read_to_string(PROC_MEMINFO)
        .map_err(|e| Error::probe(PROC_MEMINFO, e.to_string()))?;
    parse_meminfo(&content)
}

#[cfg(not(target_os = "linux"))]
fn read_meminfo() -> Result<MemInfo> {
    Err(Error::UnsupportedPlatform(format!(
        "{} is only available on linux",
        PROC_MEMINFO
    )))
}

/// Parse `/proc/meminfo` content.
///
/// Physical usage is `MemTotal - MemAvailable`; kernels without
/// `MemAvailable` fall back to free plus buffers and page cache.
pub fn parse_meminfo(content: &str) -> Result<MemInfo> {
    let values: HashMap<&str, u64> = content
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let mut parts = rest.split_whitespace();
            let value = parts.next()?.parse::<u64>().ok()?;
            let bytes = match parts.next() {
                Some(unit) if unit.eq_ignore_ascii_case("kb") => value.saturating_mul(1024),
                _ => value,
            };
            Some((key.trim(), bytes))
        })
        .collect();

    let field = |name: &str| {
        values
            .get(name)
            .copied()
            .ok_or_else(|| Error::probe(PROC_MEMINFO, format!("missing {name}")))
    };

    let total = field("MemTotal")?;
    let available = match values.get("MemAvailable") {
        Some(available) => *available,
        None => {
            let optional = |name: &str| values.get(name).copied().unwrap_or(0);
            field("MemFree")?
                .saturating_add(optional("Buffers"))
                .saturating_add(optional("Cached"))
        }
    };
    let swap_total = values.get("SwapTotal").copied().unwrap_or(0);
    let swap_free = values.get("SwapFree").copied().unwrap_or(0);

    Ok(MemInfo {
        physical: MemoryUsage {
            size: total,
            used: total.saturating_sub(available),
        },
        swap: MemoryUsage {
            size: swap_total,
            used: swap_total.saturating_sub(swap_free),
        },
    })
}

/// Human readable byte count with binary prefixes, e.g. `3.2 GiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ck_common::CheckState;

    const SAMPLE: &str = "\
MemTotal:       16384000 kB
MemFree:         1024000 kB
MemAvailable:    4096000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       2048000 kB
SwapFree:        2048000 kB
";

    const GIB: u64 = 1024 * 1024 * 1024;

    fn info(physical_used_pct: u64) -> MemInfo {
        MemInfo {
            physical: MemoryUsage {
                size: 100 * GIB,
                used: physical_used_pct * GIB,
            },
            swap: MemoryUsage { size: 0, used: 0 },
        }
    }

    fn run(info: &MemInfo, args: &[&str]) -> ck_common::Result<CheckResult> {
        let mut data = CheckMemory.build();
        data.parse_args(&Argument::parse_all(args)?)?;
        let types = selected_types(&data.settings.types)?;
        collect(&mut data, info, &types);
        Ok(data.finalize())
    }

    #[test]
    fn parses_meminfo() {
        let info = parse_meminfo(SAMPLE).unwrap();
        assert_eq!(info.physical.size, 16_384_000 * 1024);
        assert_eq!(info.physical.used, (16_384_000 - 4_096_000) * 1024);
        assert_eq!(info.physical.used_pct(), 75.0);
        assert_eq!(info.swap.used, 0);
    }

    #[test]
    fn falls_back_without_mem_available() {
        let content = SAMPLE.replace("MemAvailable:    4096000 kB\n", "");
        let info = parse_meminfo(&content).unwrap();
        let available = (1_024_000 + 512_000 + 2_048_000) * 1024;
        assert_eq!(info.physical.used, 16_384_000 * 1024 - available);
    }

    #[test]
    fn fallback_sum_saturates() {
        let content = format!(
            "MemTotal: {max}\nMemFree: {max}\nBuffers: {max}\nCached: 1\n",
            max = u64::MAX
        );
        let info = parse_meminfo(&content).unwrap();
        assert_eq!(info.physical.size, u64::MAX);
        assert_eq!(info.physical.used, 0);
    }

    #[test]
    fn missing_total_is_a_probe_error() {
        let err = parse_meminfo("MemFree: 1 kB\n").unwrap_err();
        assert_eq!(err.to_string(), "/proc/meminfo: missing MemTotal");
    }

    #[test]
    fn formats_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * GIB + GIB / 5), "3.2 GiB");
    }

    #[test]
    fn healthy_memory() {
        let result = run(&info(50), &[]).unwrap();
        assert_eq!(result.state, CheckState::Ok);
        assert_eq!(
            result.output,
            "OK - physical = 50.0 GiB (50%), swap = 0 B (0%)"
        );
        assert_eq!(result.metrics.len(), 4);
        assert_eq!(
            result.metrics[1].fragment(),
            "'physical %'=50%;80:;90:;0;100"
        );
        assert_eq!(result.metrics[0].warning, None);
    }

    #[test]
    fn high_usage_raises_state() {
        assert_eq!(run(&info(85), &[]).unwrap().state, CheckState::Warning);
        assert_eq!(run(&info(95), &[]).unwrap().state, CheckState::Critical);
        let result = run(&info(95), &["crit=used_pct > 99"]).unwrap();
        assert_eq!(result.state, CheckState::Warning);
    }

    #[test]
    fn type_selection_and_filter() {
        let result = run(&info(50), &["type=physical"]).unwrap();
        assert_eq!(result.metrics.len(), 2);
        assert_eq!(result.output, "OK - physical = 50.0 GiB (50%)");

        let result = run(&info(50), &["filter=type = swap"]).unwrap();
        assert_eq!(result.output, "OK - swap = 0 B (0%)");

        let result = run(&info(50), &["filter=type = none", "empty-state=critical"]).unwrap();
        assert_eq!(result.state, CheckState::Critical);
        assert_eq!(result.output, "CRITICAL - no items found");
    }

    #[test]
    fn rejects_unknown_type_and_attribute() {
        assert!(matches!(
            run(&info(50), &["type=video"]),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            run(&info(50), &["warn=color = red"]),
            Err(Error::UnknownField { .. })
        ));
    }
}
