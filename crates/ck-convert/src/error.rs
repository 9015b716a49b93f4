//! Coercion errors.

use thiserror::Error;

/// Errors from value coercion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("cannot parse {target} value from {raw:?}")]
    Parse { target: &'static str, raw: String },

    #[error("number too large for {target}")]
    TooLarge { target: &'static str },

    #[error("number too small for {target}")]
    TooSmall { target: &'static str },
}

impl ConvertError {
    pub(crate) fn parse(target: &'static str, raw: impl ToString) -> Self {
        ConvertError::Parse {
            target,
            raw: raw.to_string(),
        }
    }
}
