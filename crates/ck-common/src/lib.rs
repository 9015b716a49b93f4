//! ckagent common types and errors.
//!
//! This crate provides foundational types shared across the ck-* crates:
//! - The canonical check state (`OK`/`WARNING`/`CRITICAL`/`UNKNOWN`)
//! - The unified invocation error type
//! - Schema versioning for configuration and JSON output

pub mod error;
pub mod schema;
pub mod state;

pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
pub use state::CheckState;
