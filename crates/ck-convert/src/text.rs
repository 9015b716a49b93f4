//! Boolean, version and number-to-text coercions.

use crate::error::ConvertError;
use crate::numeric::to_f64;
use crate::value::Value;

/// Convert a flag-like value into a `bool`.
///
/// Accepts native booleans, and case-insensitively `1, enable, enabled,
/// true, yes, on` and `0, disable, disabled, false, no, off`.
pub fn to_bool(raw: impl Into<Value>) -> Result<bool, ConvertError> {
    let raw = raw.into();
    if let Value::Bool(v) = raw {
        return Ok(v);
    }
    match raw.to_string().trim().to_ascii_lowercase().as_str() {
        "1" | "enable" | "enabled" | "true" | "yes" | "on" => Ok(true),
        "0" | "disable" | "disabled" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConvertError::parse("bool", raw)),
    }
}

/// Like [`to_bool`], falling back to `false`.
pub fn to_bool_or_zero(raw: impl Into<Value>) -> bool {
    to_bool(raw).unwrap_or_default()
}

/// Turn a version string into a float that sorts like the version.
///
/// Takes the first run of digits, dots and hyphens, treats hyphens as dots
/// and keeps everything past the second component as extra fractional
/// digits: `"1.2.3"` becomes `1.23`, `"v10.4-1"` becomes `10.41`. This is an
/// ordinal heuristic, not a semantic version comparison.
pub fn version_f64(raw: impl Into<Value>) -> Result<f64, ConvertError> {
    let raw = raw.into();
    let text = raw.to_string();
    let is_version_char = |c: char| c.is_ascii_digit() || c == '.' || c == '-';

    let run: String = text
        .chars()
        .skip_while(|c| !is_version_char(*c))
        .take_while(|c| is_version_char(*c))
        .map(|c| if c == '-' { '.' } else { c })
        .collect();
    if run.is_empty() {
        return Err(ConvertError::parse("version", raw));
    }

    let mut parts = run.split('.');
    let mut flat = parts.next().unwrap_or_default().to_string();
    if let Some(minor) = parts.next() {
        flat.push('.');
        flat.push_str(minor);
    }
    for rest in parts {
        flat.push_str(rest);
    }

    to_f64(flat.as_str()).map_err(|_| ConvertError::parse("version", raw))
}

/// Like [`version_f64`], falling back to `0.0`.
pub fn version_f64_or_zero(raw: impl Into<Value>) -> f64 {
    version_f64(raw).unwrap_or_default()
}

/// Render a number with as few digits as represent it exactly.
///
/// Integral values print without a decimal point (`5.0` → `"5"`), others
/// with the shortest decimal that round-trips (`0.1` → `"0.1"`). Strings
/// go through the float parser first.
pub fn num_to_string(raw: impl Into<Value>) -> Result<String, ConvertError> {
    match raw.into() {
        Value::Int(v) => Ok(v.to_string()),
        Value::UInt(v) => Ok(v.to_string()),
        Value::Float(v) => Ok(float_to_string(v)),
        other => to_f64(&other)
            .map(float_to_string)
            .map_err(|_| ConvertError::parse("number", other)),
    }
}

/// Like [`num_to_string`], falling back to an empty string.
pub fn num_to_string_or_zero(raw: impl Into<Value>) -> String {
    num_to_string(raw).unwrap_or_default()
}

fn float_to_string(v: f64) -> String {
    // 2^63: beyond this an integral float no longer fits an i64.
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9_223_372_036_854_775_808.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
