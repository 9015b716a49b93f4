//! Loose value coercion for check arguments.
//!
//! Arguments reach a check as strings from the command line or the
//! configuration file, while probes produce numbers of varying width. The
//! helpers here turn either into the type a check actually needs.
//!
//! Every conversion comes in two flavours:
//! - `to_<type>` returns a [`ConvertError`] when the input cannot be
//!   interpreted or does not fit the target width,
//! - `to_<type>_or_zero` swallows the error and returns the zero value.
//!   Callers picking this variant accept silent data loss.

pub mod error;
pub mod numeric;
pub mod text;
pub mod value;

pub use error::ConvertError;
pub use numeric::*;
pub use text::*;
pub use value::Value;
