#![deny(missing_docs)]
#![doc = "Input streams, batch configuration and report export for the AMA reduction."]

/// YAML batch configuration.
pub mod config;
/// Table, CSV and JSON writers.
pub mod export;
/// Input file digests.
pub mod hash;
/// Running reductions against files on disk.
pub mod job;
/// Whitespace separated record streams.
pub mod records;

pub use config::{BatchConfig, JobSpec};
pub use export::{format_scientific, write_report, OutputFormat};
pub use hash::file_sha256;
pub use job::{emit_report, reduce_files, run_batch, run_job, BatchEntry};
pub use records::{open_stream, RecordStream, StreamRecord};
