//! Plugin-output text codec.
//!
//! ```text
//! <output>[ |'<metric>'=<value><unit>[;<warn>[;<crit>[;<min>[;<max>]]]] ...]
//! ```
//!
//! The first unescaped `|` separates output from performance data. `\|` is
//! literal and stays in the output as written. Parsing is tolerant: a
//! fragment that does not read as a metric is skipped and the rest of the
//! segment is still parsed.

use super::metric::CheckMetric;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

/// Render output text followed by the performance-data segment.
pub fn build_plugin_output(output: &str, metrics: &[CheckMetric]) -> String {
    let output = output.trim();
    if metrics.is_empty() {
        return output.to_string();
    }

    let perf: Vec<String> = metrics.iter().map(CheckMetric::fragment).collect();
    let perf = perf.join(" ");
    if output.is_empty() {
        format!("|{}", perf)
    } else {
        format!("{} |{}", output, perf)
    }
}

/// Split raw plugin output at the first unescaped `|`.
///
/// Returns the trimmed output and the raw performance-data segment, if any.
pub fn split_plugin_output(raw: &str) -> (&str, Option<&str>) {
    let bytes = raw.as_bytes();
    let split = bytes
        .iter()
        .enumerate()
        .position(|(idx, b)| *b == b'|' && (idx == 0 || bytes[idx - 1] != b'\\'));

    match split {
        Some(idx) => (raw[..idx].trim(), Some(&raw[idx + 1..])),
        None => (raw.trim(), None),
    }
}

/// Parse raw plugin output into the trimmed output text and its metrics.
///
/// Without a performance-data segment the metric list is empty.
pub fn parse_plugin_output(raw: &str) -> (String, Vec<CheckMetric>) {
    let (output, perf) = split_plugin_output(raw);
    let metrics = perf.map(parse_perf_data).unwrap_or_default();
    (output.to_string(), metrics)
}

/// Parse a performance-data segment, skipping fragments that are not metrics.
pub fn parse_perf_data(segment: &str) -> Vec<CheckMetric> {
    let mut metrics = Vec::new();
    let mut rest = segment;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let (name, after_name) = match read_name(rest) {
            Some(found) => found,
            None => {
                rest = skip_token(rest);
                continue;
            }
        };

        let Some(after_eq) = after_name.strip_prefix('=') else {
            trace!(fragment = %rest, "skipping perf fragment without '='");
            rest = skip_token(after_name);
            continue;
        };

        let end = after_eq
            .find(char::is_whitespace)
            .unwrap_or(after_eq.len());
        let (value, remaining) = after_eq.split_at(end);
        rest = remaining;

        match parse_value_fields(&name, value) {
            Some(metric) => metrics.push(metric),
            None => trace!(name = %name, value = %value, "skipping malformed perf value"),
        }
    }

    metrics
}

/// Read a quoted or bare metric name. Returns the name and the text after it.
fn read_name(text: &str) -> Option<(String, &str)> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;

    match first {
        '\'' => {
            // Single-quoted: '' is an embedded quote.
            let mut name = String::new();
            let body = &text[1..];
            let mut iter = body.char_indices().peekable();
            while let Some((idx, c)) = iter.next() {
                if c == '\'' {
                    if let Some((_, '\'')) = iter.peek() {
                        name.push('\'');
                        iter.next();
                        continue;
                    }
                    return Some((name, &body[idx + 1..]));
                }
                name.push(c);
            }
            None
        }
        '"' => {
            let body = &text[1..];
            let end = body.find('"')?;
            Some((body[..end].to_string(), &body[end + 1..]))
        }
        _ => {
            let end = text
                .find(|c: char| c == '=' || c.is_whitespace())
                .unwrap_or(text.len());
            if end == 0 {
                return None;
            }
            Some((text[..end].to_string(), &text[end..]))
        }
    }
}

fn skip_token(text: &str) -> &str {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    // Always make progress, even on a lone '='.
    let end = end.max(text.chars().next().map_or(0, char::len_utf8));
    &text[end..]
}

static VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?|-?\.\d+|U)([a-zA-Z%/]*)$").expect("regex")
});

fn parse_value_fields(name: &str, raw: &str) -> Option<CheckMetric> {
    let mut fields = raw.split(';');
    let head = fields.next()?;
    let caps = VALUE_RE.captures(head)?;

    let mut metric = CheckMetric::new(name, caps.get(1)?.as_str());
    metric.unit = caps.get(2).map_or("", |m| m.as_str()).to_string();

    let non_empty = |field: Option<&str>| field.filter(|f| !f.is_empty()).map(str::to_string);
    metric.warning = non_empty(fields.next());
    metric.critical = non_empty(fields.next());
    metric.min = non_empty(fields.next()).and_then(|f| f.parse::<f64>().ok());
    metric.max = non_empty(fields.next()).and_then(|f| f.parse::<f64>().ok());

    Some(metric)
}
