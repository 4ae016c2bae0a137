#![deny(missing_docs)]
#![doc = "Core data types, geometry descriptor and error taxonomy for the All-Mode-Averaging correlator reduction."]

pub mod errors;
pub mod geometry;
pub mod provenance;
mod types;

pub use errors::{AmaError, ErrorInfo};
pub use geometry::{Arity, Geometry};
pub use provenance::{ReductionProvenance, SchemaVersion};
pub use types::{Complex, Correlator, ThreePointRecord, TwoPointRecord};
