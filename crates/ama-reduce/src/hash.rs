use ama_core::errors::{AmaError, ErrorInfo};
use ama_core::Geometry;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::report::SeparationGroup;

fn hash_json<T: Serialize>(value: &T) -> Result<String, AmaError> {
    let json = serde_json::to_vec(value)
        .map_err(|err| AmaError::Serde(ErrorInfo::new("serialize", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(json);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Computes the canonical hash of a reduction result.
///
/// Provenance is left out so identical data read from different paths hashes
/// identically.
pub fn hash_report(geometry: &Geometry, groups: &[SeparationGroup]) -> Result<String, AmaError> {
    hash_json(&(geometry, groups))
}
