//! Raw argument parsing and the declarative binding table.

use ck_common::CheckState;
use std::fmt;
use thiserror::Error;

/// Errors raised while binding arguments to a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("unknown argument: {key}")]
    UnknownArgument { key: String },

    #[error("invalid value for argument {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("malformed argument: {0:?}")]
    Malformed(String),

    #[error("unknown attribute {field} in {key} expression")]
    UnknownField { key: String, field: String },
}

impl From<BindError> for ck_common::Error {
    fn from(err: BindError) -> Self {
        match err {
            BindError::UnknownArgument { key } => ck_common::Error::UnknownArgument { key },
            BindError::InvalidValue { key, message } => {
                ck_common::Error::InvalidArgument { key, message }
            }
            BindError::Malformed(raw) => ck_common::Error::MalformedArgument(raw),
            BindError::UnknownField { key, field } => ck_common::Error::UnknownField { key, field },
        }
    }
}

/// One `key=value` pair as passed to a check. Bare flags have an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub key: String,
    pub value: String,
}

impl Argument {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse `key=value` or a bare `key`. Matching surrounding quotes on the
    /// value are stripped.
    pub fn parse(raw: &str) -> Result<Self, BindError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BindError::Malformed(raw.to_string()));
        }
        let (key, value) = match trimmed.split_once('=') {
            Some((key, value)) => (key.trim(), unquote(value.trim())),
            None => (trimmed, ""),
        };
        if key.is_empty() {
            return Err(BindError::Malformed(raw.to_string()));
        }
        Ok(Self::new(key, value))
    }

    /// Parse a whole argument list.
    pub fn parse_all<I, T>(raw: I) -> Result<Vec<Self>, BindError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        raw.into_iter().map(|r| Self::parse(r.as_ref())).collect()
    }

    /// The key normalized for table lookups.
    pub fn normalized_key(&self) -> String {
        self.key.to_ascii_lowercase()
    }

    /// `key` for flags, `key=value` otherwise.
    pub fn to_raw(&self) -> String {
        if self.value.is_empty() {
            self.key.clone()
        } else {
            format!("{}={}", self.key, self.value)
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

pub(crate) fn unquote(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

type Setter<S> = Box<dyn Fn(&mut S, &str) -> Result<(), String> + Send + Sync>;

/// A binding from an argument key onto a check's settings.
///
/// The setter performs coercion and assignment, so the binding table stays
/// independent of the concrete settings type's layout.
pub struct CheckArgument<S> {
    pub description: String,
    flag: bool,
    setter: Setter<S>,
}

impl<S> CheckArgument<S> {
    pub fn new<F>(description: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut S, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            flag: false,
            setter: Box::new(setter),
        }
    }

    /// Bind a text field.
    pub fn string(description: impl Into<String>, field: fn(&mut S) -> &mut String) -> Self
    where
        S: 'static,
    {
        Self::new(description, move |settings, value| {
            *field(settings) = value.to_string();
            Ok(())
        })
    }

    /// Bind a boolean flag. A bare key sets it.
    pub fn flag(description: impl Into<String>, field: fn(&mut S) -> &mut bool) -> Self
    where
        S: 'static,
    {
        Self {
            flag: true,
            ..Self::new(description, move |settings, value| {
                *field(settings) = parse_flag(value)?;
                Ok(())
            })
        }
    }

    /// Bind an unsigned integer.
    pub fn u64(description: impl Into<String>, field: fn(&mut S) -> &mut u64) -> Self
    where
        S: 'static,
    {
        Self::new(description, move |settings, value| {
            *field(settings) = ck_convert::to_u64(value).map_err(|e| e.to_string())?;
            Ok(())
        })
    }

    /// Bind a floating-point number.
    pub fn f64(description: impl Into<String>, field: fn(&mut S) -> &mut f64) -> Self
    where
        S: 'static,
    {
        Self::new(description, move |settings, value| {
            *field(settings) = ck_convert::to_f64(value).map_err(|e| e.to_string())?;
            Ok(())
        })
    }

    /// Bind a check state given by name or ordinal.
    pub fn state(description: impl Into<String>, field: fn(&mut S) -> &mut CheckState) -> Self
    where
        S: 'static,
    {
        Self::new(description, move |settings, value| {
            *field(settings) = value.parse::<CheckState>().map_err(|e| e.to_string())?;
            Ok(())
        })
    }

    /// Whether a bare key is a complete binding.
    pub fn is_flag(&self) -> bool {
        self.flag
    }

    /// Apply `value` to `settings`.
    pub fn bind(&self, settings: &mut S, value: &str) -> Result<(), String> {
        (self.setter)(settings, value)
    }
}

impl<S> fmt::Debug for CheckArgument<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckArgument")
            .field("description", &self.description)
            .field("flag", &self.flag)
            .finish_non_exhaustive()
    }
}

pub(crate) fn parse_flag(value: &str) -> Result<bool, String> {
    if value.is_empty() {
        return Ok(true);
    }
    ck_convert::to_bool(value).map_err(|e| e.to_string())
}
