use std::fmt;
use std::io::Write;
use std::str::FromStr;

use ama_core::errors::{AmaError, ErrorInfo};
use ama_reduce::AmaReport;
use serde::{Deserialize, Serialize};

/// Output layout of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Ten whitespace separated columns.
    #[default]
    Table,
    /// CSV with a header and a channel column.
    Csv,
    /// Pretty printed JSON report.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format '{other}' (expected table, csv or json)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        })
    }
}

/// Formats `value` like C's `%+e`: signed mantissa with six decimals and a
/// signed exponent of at least two digits.
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "+nan" }.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+inf" } else { "-inf" }.to_string();
    }
    let raw = format!("{value:+.6e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => raw,
    }
}

fn write_error(err: impl ToString) -> AmaError {
    AmaError::Io(ErrorInfo::new("report-write", err.to_string()))
}

/// Writes the classic ten-column table.
pub fn write_table<W: Write>(report: &AmaReport, out: &mut W) -> Result<(), AmaError> {
    for entry in report.table_rows() {
        let row = entry.row;
        writeln!(
            out,
            "{:2} {:2} {} {} {} {} {} {} {} {}",
            entry.index,
            entry.separation,
            format_scientific(row.exact.re),
            format_scientific(row.exact.im),
            format_scientific(row.sloppy.re),
            format_scientific(row.sloppy.im),
            format_scientific(row.residual.re),
            format_scientific(row.residual.im),
            format_scientific(row.ama.re),
            format_scientific(row.ama.im),
        )
        .map_err(write_error)?;
    }
    Ok(())
}

const CSV_HEADER: [&str; 13] = [
    "channel",
    "label",
    "index",
    "separation",
    "timeslice",
    "exact_re",
    "exact_im",
    "sloppy_re",
    "sloppy_im",
    "residual_re",
    "residual_im",
    "ama_re",
    "ama_im",
];

/// Writes one CSV record per table row.
pub fn write_csv<W: Write>(report: &AmaReport, out: &mut W) -> Result<(), AmaError> {
    let csv_error =
        |err: csv::Error| AmaError::Serde(ErrorInfo::new("csv-export", err.to_string()));
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CSV_HEADER).map_err(csv_error)?;
    for entry in report.table_rows() {
        let row = entry.row;
        let label = report.geometry.arity.channel_label(entry.channel);
        wtr.write_record([
            entry.channel.to_string(),
            label.to_string(),
            entry.index.to_string(),
            entry.separation.to_string(),
            row.timeslice.to_string(),
            format_scientific(row.exact.re),
            format_scientific(row.exact.im),
            format_scientific(row.sloppy.re),
            format_scientific(row.sloppy.im),
            format_scientific(row.residual.re),
            format_scientific(row.residual.im),
            format_scientific(row.ama.re),
            format_scientific(row.ama.im),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush().map_err(write_error)
}

/// Writes the structured report as pretty printed JSON.
pub fn write_json<W: Write>(report: &AmaReport, out: &mut W) -> Result<(), AmaError> {
    serde_json::to_writer_pretty(&mut *out, report)
        .map_err(|err| AmaError::Serde(ErrorInfo::new("json-export", err.to_string())))?;
    writeln!(out).map_err(write_error)
}

/// Writes `report` in the requested format.
pub fn write_report<W: Write>(
    report: &AmaReport,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AmaError> {
    match format {
        OutputFormat::Table => write_table(report, out),
        OutputFormat::Csv => write_csv(report, out),
        OutputFormat::Json => write_json(report, out),
    }
}
