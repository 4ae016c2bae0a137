use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    batch::{self, BatchArgs},
    reduce::{self, ThreePointArgs, TwoPointArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "readama",
    version,
    about = "All-Mode-Averaging reduction of exact and sloppy correlator files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reduce a pair of two-point correlator files.
    TwoPoint(TwoPointArgs),
    /// Reduce a pair of three-point correlator files.
    ThreePoint(ThreePointArgs),
    /// Run every job listed in a YAML configuration.
    Batch(BatchArgs),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::TwoPoint(args) => reduce::run_two_point(&args),
        Command::ThreePoint(args) => reduce::run_three_point(&args),
        Command::Batch(args) => batch::run(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("readama: {err}");
            ExitCode::FAILURE
        }
    }
}
