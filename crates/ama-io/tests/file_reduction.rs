use std::fs;
use std::path::Path;

use ama_core::{AmaError, Geometry};
use ama_io::{format_scientific, reduce_files, write_report, OutputFormat};
use tempfile::tempdir;

const EXACT: &str = "\
0 0 1.000000e+01 0.000000e+00
0 1 2.000000e+01 0.000000e+00
0 2 3.000000e+01 0.000000e+00
0 3 4.000000e+01 0.000000e+00
";

const SLOPPY: &str = "\
2 0 5.0 0.0
2 1 6.0 0.0
2 2 7.0 0.0
2 3 8.0 0.0
0.0 0.0 1.0 0.0
0.0 1.0 2.0 0.0
0.0 2.0 3.0 0.0
0.0 3.0 4.0 0.0
";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path
}

fn geometry() -> Geometry {
    Geometry::two_point(4, 1).with_sloppy_sources(2)
}

#[test]
fn two_point_files_reduce_with_provenance() {
    let dir = tempdir().expect("tempdir");
    let exact = write(dir.path(), "exact.dat", EXACT);
    let sloppy = write(dir.path(), "sloppy.dat", SLOPPY);

    let report = reduce_files(&geometry(), &exact, &sloppy).expect("reduce");
    let provenance = report.provenance.as_ref().expect("provenance");
    assert_eq!(provenance.exact_sha256.len(), 64);
    assert_ne!(provenance.exact_sha256, provenance.sloppy_sha256);
    assert_eq!(report.stats.matched_blocks, 1);

    let row = &report.groups[0].channels[0].rows[0];
    assert_eq!(row.residual.re, 9.0);
    assert_eq!(row.sloppy.re, 3.0);
    assert_eq!(row.ama.re, 12.0);
}

#[test]
fn table_output_matches_printf_layout() {
    let dir = tempdir().expect("tempdir");
    let exact = write(dir.path(), "exact.dat", EXACT);
    let sloppy = write(dir.path(), "sloppy.dat", SLOPPY);
    let report = reduce_files(&geometry(), &exact, &sloppy).expect("reduce");

    let mut out = Vec::new();
    write_report(&report, OutputFormat::Table, &mut out).expect("table");
    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        " 0  0 +1.000000e+01 +0.000000e+00 +3.000000e+00 +0.000000e+00 \
         +9.000000e+00 +0.000000e+00 +1.200000e+01 +0.000000e+00"
    );
    assert!(lines[3].starts_with(" 3  0 "));
    assert_eq!(lines[3].split_whitespace().count(), 10);
    assert_eq!(format_scientific(46.0), "+4.600000e+01");
}

#[test]
fn csv_and_json_exports() {
    let dir = tempdir().expect("tempdir");
    let exact = write(dir.path(), "exact.dat", EXACT);
    let sloppy = write(dir.path(), "sloppy.dat", SLOPPY);
    let report = reduce_files(&geometry(), &exact, &sloppy).expect("reduce");

    let mut csv = Vec::new();
    write_report(&report, OutputFormat::Csv, &mut csv).expect("csv");
    let csv = String::from_utf8(csv).expect("utf8");
    let mut lines = csv.lines();
    assert!(lines.next().expect("header").starts_with("channel,label,index"));
    assert!(lines.next().expect("row").starts_with("0,C,0,0,0,"));

    let mut first = Vec::new();
    let mut second = Vec::new();
    write_report(&report, OutputFormat::Json, &mut first).expect("json");
    write_report(&report, OutputFormat::Json, &mut second).expect("json");
    assert_eq!(first, second);
    let value: serde_json::Value = serde_json::from_slice(&first).expect("parse json");
    assert_eq!(value["report_hash"], report.report_hash.as_str());
    assert_eq!(value["geometry"]["arity"], 2);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().expect("tempdir");
    let exact = write(dir.path(), "exact.dat", EXACT);
    let err = reduce_files(&geometry(), &exact, &dir.path().join("absent.dat")).unwrap_err();
    assert!(matches!(err, AmaError::Io(_)));
    assert_eq!(err.info().code, "stream-open");
}

#[test]
fn invalid_geometry_rejected_before_io() {
    let err = reduce_files(
        &Geometry::two_point(0, 1),
        Path::new("/nonexistent/exact.dat"),
        Path::new("/nonexistent/sloppy.dat"),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "invalid-geometry");
}

#[test]
fn truncated_sloppy_stream_is_parse_error() {
    let dir = tempdir().expect("tempdir");
    let exact = write(dir.path(), "exact.dat", EXACT);
    let sloppy = write(dir.path(), "sloppy.dat", &SLOPPY[..SLOPPY.len() - 5]);
    let err = reduce_files(&geometry(), &exact, &sloppy).unwrap_err();
    assert!(matches!(err, AmaError::Parse(_)));
    assert_eq!(err.info().code, "truncated-record");
}

#[test]
fn misaligned_block_rejected() {
    let dir = tempdir().expect("tempdir");
    let swapped = "0 1 1.0 0.0\n0 0 1.0 0.0\n0 2 1.0 0.0\n0 3 1.0 0.0\n";
    let exact = write(dir.path(), "exact.dat", swapped);
    let sloppy = write(dir.path(), "sloppy.dat", SLOPPY);
    let err = reduce_files(&geometry(), &exact, &sloppy).unwrap_err();
    assert_eq!(err.info().code, "block-boundary");
}

#[test]
fn three_point_files_reduce() {
    let dir = tempdir().expect("tempdir");
    let mut exact = String::new();
    let mut sloppy = String::new();
    for t in 0..3 {
        exact.push_str(&format!("1 0 {t} 1 0 2 0 3 0 4 0 5 0\n"));
        sloppy.push_str(&format!("1 0 {t} 0.5 0 0.5 0 0.5 0 0.5 0 0.5 0\n"));
    }
    let exact = write(dir.path(), "exact3.dat", &exact);
    let sloppy = write(dir.path(), "sloppy3.dat", &sloppy);
    let geometry = Geometry::three_point(3, 1, 1).with_sloppy_sources(1);
    let report = reduce_files(&geometry, &exact, &sloppy).expect("reduce");
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].separation, 1);
    let scalar = &report.groups[0].channels[4].rows[2];
    assert_eq!(scalar.residual.re, 4.5);
    assert_eq!(scalar.ama.re, 5.0);

    let mut out = Vec::new();
    write_report(&report, OutputFormat::Table, &mut out).expect("table");
    assert_eq!(String::from_utf8(out).expect("utf8").lines().count(), 15);
}
