use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use ama_core::errors::{AmaError, ErrorInfo};
use ama_core::{Arity, Geometry};
use serde::{Deserialize, Serialize};

use crate::export::OutputFormat;

/// YAML file listing independent reduction jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Format used by jobs that do not pick their own.
    #[serde(default)]
    pub format: OutputFormat,
    /// Jobs in execution order.
    pub jobs: Vec<JobSpec>,
}

/// One (exact, sloppy, geometry) reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Label used in logs and the batch summary.
    pub name: String,
    /// Exact stream path.
    pub exact: PathBuf,
    /// Sloppy stream path.
    pub sloppy: PathBuf,
    /// Record layout, 2 or 3.
    pub arity: Arity,
    /// Number of timeslices per source block.
    pub time_extent: usize,
    /// Exact sources per separation.
    pub sources: usize,
    /// Distinct source-sink separations.
    #[serde(default = "default_separations")]
    pub separations: usize,
    /// Sloppy sources per separation; the time extent when absent.
    #[serde(default)]
    pub sloppy_sources: Option<usize>,
    /// Destination file; stdout when absent.
    #[serde(default)]
    pub out: Option<PathBuf>,
    /// Per-job format override.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

fn default_separations() -> usize {
    1
}

fn config_error(code: &str, message: impl Into<String>) -> AmaError {
    AmaError::Config(ErrorInfo::new(code, message))
}

impl JobSpec {
    /// Geometry described by this job.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            arity: self.arity,
            time_extent: self.time_extent,
            sources: self.sources,
            separations: self.separations,
            sloppy_sources: self.sloppy_sources,
        }
    }

    /// Format to write with, falling back to the batch default.
    pub fn output_format(&self, fallback: OutputFormat) -> OutputFormat {
        self.format.unwrap_or(fallback)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.exact);
        resolve(&mut self.sloppy);
        if let Some(out) = self.out.as_mut() {
            resolve(out);
        }
    }
}

impl BatchConfig {
    /// Parses a configuration, resolving relative paths against `base`.
    pub fn from_yaml_str(text: &str, base: &Path) -> Result<Self, AmaError> {
        let mut config: BatchConfig = serde_yaml::from_str(text)
            .map_err(|err| config_error("config-parse", err.to_string()))?;
        config.validate()?;
        for job in &mut config.jobs {
            job.resolve_paths(base);
        }
        Ok(config)
    }

    /// Loads a configuration file; relative paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, AmaError> {
        let text = fs::read_to_string(path).map_err(|err| {
            AmaError::Config(
                ErrorInfo::new("config-read", err.to_string()).with_context("path", path.display()),
            )
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_yaml_str(&text, base).map_err(|err| err.with_context("path", path.display()))
    }

    fn validate(&self) -> Result<(), AmaError> {
        if self.jobs.is_empty() {
            return Err(config_error("empty-batch", "configuration lists no jobs"));
        }
        let mut names = BTreeSet::new();
        for job in &self.jobs {
            if !names.insert(job.name.as_str()) {
                return Err(config_error("duplicate-job", "job names must be unique")
                    .with_context("job", &job.name));
            }
            job.geometry().validate().map_err(|err| err.with_context("job", &job.name))?;
        }
        Ok(())
    }
}
