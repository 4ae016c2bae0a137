use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ama_core::errors::{AmaError, ErrorInfo};
use ama_core::{
    Arity, Geometry, ReductionProvenance, SchemaVersion, ThreePointRecord, TwoPointRecord,
};
use ama_reduce::{AmaReport, ThreePointReducer, TwoPointReducer};
use serde::Serialize;

use crate::config::{BatchConfig, JobSpec};
use crate::export::{write_report, OutputFormat};
use crate::hash::file_sha256;
use crate::records::open_stream;

/// Reduces an exact/sloppy file pair and attaches provenance.
///
/// The geometry is validated before either file is opened.
pub fn reduce_files(
    geometry: &Geometry,
    exact: &Path,
    sloppy: &Path,
) -> Result<AmaReport, AmaError> {
    let mut report = match geometry.arity {
        Arity::TwoPoint => {
            let reducer = TwoPointReducer::new(*geometry)?;
            reducer.reduce(
                open_stream::<TwoPointRecord>(exact)?,
                open_stream::<TwoPointRecord>(sloppy)?,
            )?
        }
        Arity::ThreePoint => {
            let reducer = ThreePointReducer::new(*geometry)?;
            reducer.reduce(
                open_stream::<ThreePointRecord>(exact)?,
                open_stream::<ThreePointRecord>(sloppy)?,
            )?
        }
    };
    report.provenance = Some(ReductionProvenance {
        schema_version: SchemaVersion::default(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        exact_path: exact.display().to_string(),
        sloppy_path: sloppy.display().to_string(),
        exact_sha256: file_sha256(exact)?,
        sloppy_sha256: file_sha256(sloppy)?,
    });
    Ok(report)
}

/// Writes `report` to `destination`, or to stdout when none is given.
pub fn emit_report(
    report: &AmaReport,
    format: OutputFormat,
    destination: Option<&Path>,
) -> Result<(), AmaError> {
    match destination {
        Some(path) => {
            let open_error = |err: io::Error| {
                AmaError::Io(
                    ErrorInfo::new("report-open", err.to_string())
                        .with_context("path", path.display()),
                )
            };
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(open_error)?;
            }
            let mut out = BufWriter::new(File::create(path).map_err(open_error)?);
            write_report(report, format, &mut out)?;
            out.flush().map_err(open_error)
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(report, format, &mut out)?;
            out.flush()
                .map_err(|err| AmaError::Io(ErrorInfo::new("report-write", err.to_string())))
        }
    }
}

/// Summary line for one finished batch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    /// Job name.
    pub name: String,
    /// Hash of the job's report.
    pub report_hash: String,
    /// Where the report was written; `None` for stdout.
    pub destination: Option<PathBuf>,
}

/// Reduces and writes a single configured job.
pub fn run_job(job: &JobSpec, default_format: OutputFormat) -> Result<BatchEntry, AmaError> {
    let report = reduce_files(&job.geometry(), &job.exact, &job.sloppy)
        .map_err(|err| err.with_context("job", &job.name))?;
    emit_report(&report, job.output_format(default_format), job.out.as_deref())
        .map_err(|err| err.with_context("job", &job.name))?;
    Ok(BatchEntry {
        name: job.name.clone(),
        report_hash: report.report_hash,
        destination: job.out.clone(),
    })
}

/// Runs every job in order; the first failure aborts the batch.
pub fn run_batch(config: &BatchConfig) -> Result<Vec<BatchEntry>, AmaError> {
    let mut entries = Vec::with_capacity(config.jobs.len());
    for (position, job) in config.jobs.iter().enumerate() {
        log::info!(
            "job {}/{} '{}': {} T={} sources={} separations={}",
            position + 1,
            config.jobs.len(),
            job.name,
            job.arity,
            job.time_extent,
            job.sources,
            job.separations
        );
        entries.push(run_job(job, config.format)?);
    }
    Ok(entries)
}
