use std::error::Error;
use std::path::PathBuf;

use ama_io::{run_batch, BatchConfig};
use clap::Args;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// YAML file listing the jobs to run.
    #[arg(long)]
    pub config: PathBuf,
    /// Optional JSON summary of job names, report hashes and destinations.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn run(args: &BatchArgs) -> Result<(), Box<dyn Error>> {
    let config = BatchConfig::load(&args.config)?;
    let entries = run_batch(&config)?;
    log::info!("batch finished: {} jobs", entries.len());
    if let Some(path) = &args.summary {
        std::fs::write(path, serde_json::to_vec_pretty(&entries)?)?;
    }
    Ok(())
}
