//! Structured error types shared across the reduction crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`AmaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, counts, record ordinals).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the AMA reduction.
///
/// Every variant is fatal for the invocation that raised it. Sloppy blocks
/// without an exact counterpart are not errors and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum AmaError {
    /// Input stream could not be opened or read.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Malformed or truncated record.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// Stream contents disagree with the declared geometry.
    #[error("geometry error: {0}")]
    Geometry(ErrorInfo),
    /// Block averaging was asked to split a buffer unevenly.
    #[error("average error: {0}")]
    Average(ErrorInfo),
    /// Batch configuration could not be loaded.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization of a report failed.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl AmaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            AmaError::Io(info)
            | AmaError::Parse(info)
            | AmaError::Geometry(info)
            | AmaError::Average(info)
            | AmaError::Config(info)
            | AmaError::Serde(info) => info,
        }
    }

    /// Adds a context entry while keeping the error family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            AmaError::Io(info) => AmaError::Io(info.with_context(key, value)),
            AmaError::Parse(info) => AmaError::Parse(info.with_context(key, value)),
            AmaError::Geometry(info) => AmaError::Geometry(info.with_context(key, value)),
            AmaError::Average(info) => AmaError::Average(info.with_context(key, value)),
            AmaError::Config(info) => AmaError::Config(info.with_context(key, value)),
            AmaError::Serde(info) => AmaError::Serde(info.with_context(key, value)),
        }
    }

    /// Shorthand for a geometry mismatch carrying expected and observed counts.
    pub fn geometry_mismatch(
        code: &str,
        message: impl Into<String>,
        expected: usize,
        observed: usize,
    ) -> Self {
        AmaError::Geometry(
            ErrorInfo::new(code, message)
                .with_context("expected", expected)
                .with_context("observed", observed),
        )
    }
}
