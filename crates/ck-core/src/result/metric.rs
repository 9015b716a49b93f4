//! One performance datum.

use ck_convert::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single metric as carried in the performance-data segment.
///
/// `warning`, `critical`, `min` and `max` are independent: `None` means the
/// field is absent, which is not the same as a threshold or bound of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckMetric {
    pub name: String,
    /// Formatted scalar, kept as text so it re-renders exactly.
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Key used to pick the check threshold that applies to this metric.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub threshold_name: String,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub critical: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl CheckMetric {
    /// A metric whose threshold name is its own name.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        let value = match &value {
            Value::Str(text) => text.clone(),
            // Integral floats render without a point; everything else
            // through the shortest exact decimal form.
            other => ck_convert::num_to_string_or_zero(other),
        };
        Self {
            threshold_name: name.clone(),
            name,
            value,
            unit: String::new(),
            warning: None,
            critical: None,
            min: None,
            max: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_threshold_name(mut self, name: impl Into<String>) -> Self {
        self.threshold_name = name.into();
        self
    }

    pub fn with_warning(mut self, range: impl Into<String>) -> Self {
        self.warning = Some(range.into());
        self
    }

    pub fn with_critical(mut self, range: impl Into<String>) -> Self {
        self.critical = Some(range.into());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// The value as a number, or `None` for `U` and other non-numeric text.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Render as a performance-data fragment: `'name'=value[unit][;warn[;crit[;min[;max]]]]`.
    pub fn fragment(&self) -> String {
        let mut out = format!(
            "'{}'={}{}",
            self.name.replace('\'', "''"),
            self.value,
            self.unit
        );

        let fields = [
            self.warning.clone(),
            self.critical.clone(),
            self.min.map(|v| ck_convert::num_to_string_or_zero(v)),
            self.max.map(|v| ck_convert::num_to_string_or_zero(v)),
        ];
        let last = fields.iter().rposition(Option::is_some);
        if let Some(last) = last {
            for field in &fields[..=last] {
                out.push(';');
                if let Some(text) = field {
                    out.push_str(text);
                }
            }
        }
        out
    }
}

impl fmt::Display for CheckMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}
