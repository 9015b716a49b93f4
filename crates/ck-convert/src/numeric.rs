//! Numeric coercions with explicit range checks.
//!
//! Strings are read through the float parser, so `"3.7"` is accepted by the
//! integer conversions and truncated towards zero. Values that do not fit the
//! target width are an error, never wrapped or saturated.

use crate::error::ConvertError;
use crate::value::Value;

// 2^63 as f64; anything at or above it does not fit an i64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
// 2^64 as f64.
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

fn parse_float(target: &'static str, raw: &str) -> Result<f64, ConvertError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ConvertError::parse(target, raw))
}

/// Convert anything numeric into an `f64`.
pub fn to_f64(raw: impl Into<Value>) -> Result<f64, ConvertError> {
    match raw.into() {
        Value::Float(v) => Ok(v),
        Value::Int(v) => Ok(v as f64),
        Value::UInt(v) => Ok(v as f64),
        Value::Str(s) => parse_float("f64", &s),
        other @ Value::Bool(_) => Err(ConvertError::parse("f64", other)),
    }
}

/// Like [`to_f64`], falling back to `0.0`.
pub fn to_f64_or_zero(raw: impl Into<Value>) -> f64 {
    to_f64(raw).unwrap_or_default()
}

fn float_to_i64(target: &'static str, v: f64, raw: &Value) -> Result<i64, ConvertError> {
    if v.is_nan() {
        return Err(ConvertError::parse(target, raw));
    }
    let v = v.trunc();
    if v >= I64_BOUND {
        return Err(ConvertError::TooLarge { target });
    }
    if v < -I64_BOUND {
        return Err(ConvertError::TooSmall { target });
    }
    Ok(v as i64)
}

fn wide_i64(target: &'static str, raw: Value) -> Result<i64, ConvertError> {
    match raw {
        Value::Int(v) => Ok(v),
        Value::UInt(v) => i64::try_from(v).map_err(|_| ConvertError::TooLarge { target }),
        Value::Float(v) => float_to_i64(target, v, &raw),
        Value::Str(ref s) => {
            let v = parse_float(target, s)?;
            float_to_i64(target, v, &raw)
        }
        Value::Bool(_) => Err(ConvertError::parse(target, raw)),
    }
}

/// Convert anything numeric into an `i64`.
pub fn to_i64(raw: impl Into<Value>) -> Result<i64, ConvertError> {
    wide_i64("i64", raw.into())
}

/// Like [`to_i64`], falling back to `0`.
pub fn to_i64_or_zero(raw: impl Into<Value>) -> i64 {
    to_i64(raw).unwrap_or_default()
}

/// Convert anything numeric into a `u64`.
pub fn to_u64(raw: impl Into<Value>) -> Result<u64, ConvertError> {
    const TARGET: &str = "u64";
    let raw = raw.into();
    let v = match raw {
        Value::UInt(v) => return Ok(v),
        Value::Int(v) => {
            return u64::try_from(v).map_err(|_| ConvertError::TooSmall { target: TARGET })
        }
        Value::Float(v) => v,
        Value::Str(ref s) => parse_float(TARGET, s)?,
        Value::Bool(_) => return Err(ConvertError::parse(TARGET, raw)),
    };
    if v.is_nan() {
        return Err(ConvertError::parse(TARGET, raw));
    }
    let v = v.trunc();
    if v < 0.0 {
        return Err(ConvertError::TooSmall { target: TARGET });
    }
    if v >= U64_BOUND {
        return Err(ConvertError::TooLarge { target: TARGET });
    }
    Ok(v as u64)
}

/// Like [`to_u64`], falling back to `0`.
pub fn to_u64_or_zero(raw: impl Into<Value>) -> u64 {
    to_u64(raw).unwrap_or_default()
}

macro_rules! narrow_int {
    ($(#[$doc:meta] $name:ident, $or_zero:ident => $ty:ty;)+) => {
        $(
            #[$doc]
            pub fn $name(raw: impl Into<Value>) -> Result<$ty, ConvertError> {
                const TARGET: &str = stringify!($ty);
                let wide = wide_i64(TARGET, raw.into())?;
                <$ty>::try_from(wide).map_err(|_| {
                    if wide < 0 {
                        ConvertError::TooSmall { target: TARGET }
                    } else {
                        ConvertError::TooLarge { target: TARGET }
                    }
                })
            }

            #[doc = concat!("Like [`", stringify!($name), "`], falling back to `0`.")]
            pub fn $or_zero(raw: impl Into<Value>) -> $ty {
                $name(raw).unwrap_or_default()
            }
        )+
    };
}

narrow_int! {
    /// Convert anything numeric into a platform `isize`.
    to_isize, to_isize_or_zero => isize;
    /// Convert anything numeric into an `i32`.
    to_i32, to_i32_or_zero => i32;
    /// Convert anything numeric into a `u32`.
    to_u32, to_u32_or_zero => u32;
    /// Convert anything numeric into a `u16`.
    to_u16, to_u16_or_zero => u16;
}
