use std::error::Error;
use std::path::PathBuf;

use ama_core::Geometry;
use ama_io::{emit_report, reduce_files, OutputFormat};
use clap::Args;

/// Inputs shared by both correlator layouts.
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Exact (high-precision) correlator file.
    #[arg(long)]
    pub exact: PathBuf,
    /// Sloppy (low-precision) correlator file.
    #[arg(long)]
    pub sloppy: PathBuf,
    /// Number of timeslices per source block.
    #[arg(long)]
    pub time_extent: usize,
    /// Number of exact source positions per separation.
    #[arg(long)]
    pub sources: usize,
    /// Sloppy source positions per separation; defaults to the time extent.
    #[arg(long)]
    pub sloppy_sources: Option<usize>,
    /// Output format: "table", "csv" or "json".
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TwoPointArgs {
    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Args, Debug)]
pub struct ThreePointArgs {
    #[command(flatten)]
    pub stream: StreamArgs,
    /// Number of distinct source-sink separations.
    #[arg(long)]
    pub separations: usize,
}

fn run(stream: &StreamArgs, mut geometry: Geometry) -> Result<(), Box<dyn Error>> {
    geometry.sloppy_sources = stream.sloppy_sources;
    let report = reduce_files(&geometry, &stream.exact, &stream.sloppy)?;
    emit_report(&report, stream.format, stream.out.as_deref())?;
    if let Some(out) = &stream.out {
        log::info!("wrote {} report to {}", stream.format, out.display());
    }
    Ok(())
}

pub fn run_two_point(args: &TwoPointArgs) -> Result<(), Box<dyn Error>> {
    let stream = &args.stream;
    run(stream, Geometry::two_point(stream.time_extent, stream.sources))
}

pub fn run_three_point(args: &ThreePointArgs) -> Result<(), Box<dyn Error>> {
    let stream = &args.stream;
    run(
        stream,
        Geometry::three_point(stream.time_extent, stream.sources, args.separations),
    )
}
