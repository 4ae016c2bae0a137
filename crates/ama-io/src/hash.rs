use std::fs::File;
use std::io;
use std::path::Path;

use ama_core::errors::{AmaError, ErrorInfo};
use sha2::{Digest, Sha256};

/// SHA-256 of a file's contents as lowercase hex.
pub fn file_sha256(path: &Path) -> Result<String, AmaError> {
    let io_error = |code: &str, err: io::Error| {
        AmaError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
    };
    let mut file = File::open(path).map_err(|err| io_error("hash-open", err))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|err| io_error("hash-read", err))?;
    Ok(format!("{:x}", hasher.finalize()))
}
