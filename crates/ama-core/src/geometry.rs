//! Caller supplied geometry against which input streams are validated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AmaError, ErrorInfo};

const THREE_POINT_LABELS: [&str; 5] = ["V_x", "V_y", "V_z", "V_t", "S"];

/// Correlator layout of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Arity {
    /// Meson two-point function: one complex value per record.
    TwoPoint,
    /// Three-point function with four vector-current components and a scalar current.
    ThreePoint,
}

impl Arity {
    /// Number of independent complex channels carried by each record.
    pub const fn channels(self) -> usize {
        match self {
            Arity::TwoPoint => 1,
            Arity::ThreePoint => 5,
        }
    }

    /// Number of whitespace separated fields forming one record.
    pub const fn fields_per_record(self) -> usize {
        match self {
            Arity::TwoPoint => 4,
            Arity::ThreePoint => 3 + 2 * 5,
        }
    }

    /// Numeric code used on the command line and in configuration files.
    pub const fn code(self) -> u8 {
        match self {
            Arity::TwoPoint => 2,
            Arity::ThreePoint => 3,
        }
    }

    /// Display label of a channel.
    pub fn channel_label(self, channel: usize) -> &'static str {
        match self {
            Arity::TwoPoint => "C",
            Arity::ThreePoint => THREE_POINT_LABELS.get(channel).copied().unwrap_or("?"),
        }
    }
}

impl TryFrom<u8> for Arity {
    type Error = AmaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Arity::TwoPoint),
            3 => Ok(Arity::ThreePoint),
            other => Err(AmaError::Geometry(
                ErrorInfo::new("invalid-arity", "correlator arity must be 2 or 3")
                    .with_context("arity", other),
            )),
        }
    }
}

impl From<Arity> for u8 {
    fn from(value: Arity) -> Self {
        value.code()
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::TwoPoint => write!(f, "two-point"),
            Arity::ThreePoint => write!(f, "three-point"),
        }
    }
}

fn default_separations() -> usize {
    1
}

/// Geometry descriptor trusted as ground truth for one reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    /// Correlator layout.
    pub arity: Arity,
    /// Number of timeslices in the time direction.
    pub time_extent: usize,
    /// Number of exact source positions per separation.
    pub sources: usize,
    /// Number of distinct source-sink separations (always 1 for two-point data).
    #[serde(default = "default_separations")]
    pub separations: usize,
    /// Number of sloppy source positions per separation; the time extent when absent.
    #[serde(default)]
    pub sloppy_sources: Option<usize>,
}

impl Geometry {
    /// Geometry of a two-point reduction.
    pub fn two_point(time_extent: usize, sources: usize) -> Self {
        Self {
            arity: Arity::TwoPoint,
            time_extent,
            sources,
            separations: 1,
            sloppy_sources: None,
        }
    }

    /// Geometry of a three-point reduction.
    pub fn three_point(time_extent: usize, sources: usize, separations: usize) -> Self {
        Self {
            arity: Arity::ThreePoint,
            time_extent,
            sources,
            separations,
            sloppy_sources: None,
        }
    }

    /// Overrides the number of sloppy source positions per separation.
    pub fn with_sloppy_sources(mut self, sloppy_sources: usize) -> Self {
        self.sloppy_sources = Some(sloppy_sources);
        self
    }

    /// Sloppy source blocks expected per separation.
    pub fn sloppy_blocks(&self) -> usize {
        self.sloppy_sources.unwrap_or(self.time_extent)
    }

    /// Exact source blocks expected across all separations.
    pub fn exact_blocks(&self) -> usize {
        self.sources.saturating_mul(self.separations)
    }

    /// Exact records expected in the exact stream.
    pub fn exact_records(&self) -> usize {
        self.exact_blocks().saturating_mul(self.time_extent)
    }

    /// Sloppy records expected in the sloppy stream.
    pub fn sloppy_records(&self) -> usize {
        self.separations
            .saturating_mul(self.sloppy_blocks())
            .saturating_mul(self.time_extent)
    }

    /// Rejects descriptors that cannot describe any stream.
    pub fn validate(&self) -> Result<(), AmaError> {
        let invalid = |field: &str, message: &str| {
            Err(AmaError::Geometry(
                ErrorInfo::new("invalid-geometry", message).with_context("field", field),
            ))
        };
        if self.time_extent == 0 {
            return invalid("time_extent", "time extent must be positive");
        }
        if self.sources == 0 {
            return invalid("sources", "at least one exact source is required");
        }
        if self.separations == 0 {
            return invalid("separations", "at least one separation is required");
        }
        if self.arity == Arity::TwoPoint && self.separations != 1 {
            return invalid(
                "separations",
                "two-point geometry carries exactly one separation",
            );
        }
        if self.sloppy_blocks() == 0 {
            return invalid("sloppy_sources", "at least one sloppy source is required");
        }
        let exact_records = self
            .sources
            .checked_mul(self.separations)
            .and_then(|blocks| blocks.checked_mul(self.time_extent));
        if exact_records.is_none() {
            return invalid("sources", "exact record count overflows");
        }
        let sloppy_records = self
            .separations
            .checked_mul(self.sloppy_blocks())
            .and_then(|blocks| blocks.checked_mul(self.time_extent));
        if sloppy_records.is_none() {
            return invalid("sloppy_sources", "sloppy record count overflows");
        }
        Ok(())
    }
}
