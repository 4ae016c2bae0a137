//! Provenance and schema descriptors attached to reduction reports.

use serde::{Deserialize, Serialize};

/// Semantic version describing the schema of serialized reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Identifies the inputs a report was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReductionProvenance {
    /// Schema of the report payload.
    pub schema_version: SchemaVersion,
    /// Version of the tool that produced the report.
    pub tool_version: String,
    /// Path of the exact stream as given by the caller.
    pub exact_path: String,
    /// Path of the sloppy stream as given by the caller.
    pub sloppy_path: String,
    /// SHA-256 of the exact stream contents.
    pub exact_sha256: String,
    /// SHA-256 of the sloppy stream contents.
    pub sloppy_sha256: String,
}
