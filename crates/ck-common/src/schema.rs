//! Schema versioning and compatibility.

/// Current schema version for the configuration file and JSON output.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Extract the major component of a `MAJOR.MINOR.PATCH` version.
fn major(version: &str) -> Option<u32> {
    version.split('.').next().and_then(|s| s.trim().parse::<u32>().ok())
}

/// Check if a schema version is compatible with current.
pub fn is_compatible(version: &str) -> bool {
    match (major(SCHEMA_VERSION), major(version)) {
        (Some(current), Some(other)) => current == other,
        _ => false,
    }
}
