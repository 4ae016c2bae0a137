use ama_core::{AmaError, Complex, Geometry, TwoPointRecord};
use ama_reduce::{AmaReport, TwoPointReducer};

const TT: usize = 4;

fn block(source: i64, re: [f64; TT]) -> Vec<Result<TwoPointRecord, AmaError>> {
    re.iter()
        .enumerate()
        .map(|(t, value)| {
            Ok(TwoPointRecord {
                source,
                timeslice: t as i64,
                value: Complex::new(*value, -0.5 * value),
            })
        })
        .collect()
}

fn assert_close(actual: Complex, expected: Complex) {
    assert!(
        (actual.re - expected.re).abs() < 1e-12 && (actual.im - expected.im).abs() < 1e-12,
        "expected {expected:?}, got {actual:?}"
    );
}

fn c(re: f64) -> Complex {
    Complex::new(re, -0.5 * re)
}

const EXACT: [f64; TT] = [10.0, 20.0, 30.0, 40.0];
const SLOPPY_MATCHED: [f64; TT] = [1.0, 2.0, 3.0, 4.0];
const SLOPPY_OTHER: [f64; TT] = [5.0, 6.0, 7.0, 8.0];

fn reduce_one_exact_two_sloppy() -> AmaReport {
    let geometry = Geometry::two_point(TT, 1).with_sloppy_sources(2);
    let reducer = TwoPointReducer::new(geometry).unwrap();
    let exact = block(0, EXACT);
    let mut sloppy = block(2, SLOPPY_OTHER);
    sloppy.extend(block(0, SLOPPY_MATCHED));
    reducer.reduce(exact, sloppy).unwrap()
}

#[test]
fn residual_sloppy_and_ama_series() {
    let report = reduce_one_exact_two_sloppy();
    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.separation, 0);
    assert_eq!(group.exact_blocks, 1);
    assert_eq!(group.sloppy_blocks, 2);
    assert_eq!(group.matched_blocks, 1);
    let rows = &group.channels[0].rows;
    assert_eq!(rows.len(), TT);
    for (t, row) in rows.iter().enumerate() {
        let residual = EXACT[t] - SLOPPY_MATCHED[t];
        let sloppy = (SLOPPY_MATCHED[t] + SLOPPY_OTHER[t]) / 2.0;
        assert_eq!(row.timeslice, t);
        assert_close(row.exact, c(EXACT[t]));
        assert_close(row.residual, c(residual));
        assert_close(row.sloppy, c(sloppy));
        assert_close(row.ama, c(residual + sloppy));
    }
    assert_eq!(report.stats.matched_blocks, 1);
    assert_eq!(report.stats.unmatched_blocks, 1);
    assert_eq!(report.stats.exact_records, TT);
    assert_eq!(report.stats.sloppy_records, 2 * TT);
}

#[test]
fn exact_minus_residual_recovers_matched_sloppy() {
    let report = reduce_one_exact_two_sloppy();
    for row in &report.groups[0].channels[0].rows {
        let recovered = row.exact - row.residual;
        assert_close(recovered, c(SLOPPY_MATCHED[row.timeslice]));
        assert_close(row.ama - row.sloppy, row.residual);
    }
}

#[test]
fn unmatched_positions_only_feed_the_sloppy_average() {
    let geometry = Geometry::two_point(TT, 1).with_sloppy_sources(2);
    let reducer = TwoPointReducer::new(geometry).unwrap();
    let mut sloppy = block(3, SLOPPY_MATCHED);
    sloppy.extend(block(1, SLOPPY_OTHER));
    let report = reducer.reduce(block(0, EXACT), sloppy).unwrap();
    assert_eq!(report.stats.unmatched_blocks, 2);
    for row in &report.groups[0].channels[0].rows {
        let t = row.timeslice;
        assert_close(row.residual, row.exact);
        assert_close(row.sloppy, c((SLOPPY_MATCHED[t] + SLOPPY_OTHER[t]) / 2.0));
    }
}

#[test]
fn dense_sloppy_sampling_is_the_default() {
    let reducer = TwoPointReducer::new(Geometry::two_point(TT, 1)).unwrap();
    let mut sloppy = Vec::new();
    for source in 0..TT as i64 {
        sloppy.extend(block(source, SLOPPY_MATCHED));
    }
    let report = reducer.reduce(block(1, EXACT), sloppy).unwrap();
    let rows = &report.groups[0].channels[0].rows;
    for row in rows {
        assert_close(row.sloppy, c(SLOPPY_MATCHED[row.timeslice]));
    }
    assert_eq!(report.table_rows().count(), TT);
}

#[test]
fn sparse_sloppy_stream_rejected_under_dense_default() {
    let reducer = TwoPointReducer::new(Geometry::two_point(TT, 1)).unwrap();
    let err = reducer
        .reduce(block(0, EXACT), block(0, SLOPPY_MATCHED))
        .unwrap_err();
    assert_eq!(err.info().code, "sloppy-block-count");
    assert_eq!(err.info().context["expected"], "4");
    assert_eq!(err.info().context["observed"], "1");
}

#[test]
fn exact_source_count_mismatch_is_fatal() {
    let reducer = TwoPointReducer::new(Geometry::two_point(TT, 2)).unwrap();
    let err = reducer
        .reduce(block(0, EXACT), block(0, SLOPPY_MATCHED))
        .unwrap_err();
    assert!(matches!(err, AmaError::Geometry(_)));
    assert_eq!(err.info().code, "exact-block-count");
}

#[test]
fn report_hash_is_stable() {
    let first = reduce_one_exact_two_sloppy();
    let second = reduce_one_exact_two_sloppy();
    assert_eq!(first.report_hash, second.report_hash);
    assert_eq!(first.report_hash.len(), 64);
}

#[test]
fn repeated_exact_source_corrects_first_block_only() {
    const SECOND: [f64; TT] = [100.0, 200.0, 300.0, 400.0];
    let geometry = Geometry::two_point(TT, 2).with_sloppy_sources(2);
    let reducer = TwoPointReducer::new(geometry).unwrap();
    let mut exact = block(0, EXACT);
    exact.extend(block(0, SECOND));
    let mut sloppy = block(0, SLOPPY_MATCHED);
    sloppy.extend(block(0, SLOPPY_OTHER));

    let report = reducer.reduce(exact, sloppy).unwrap();
    assert_eq!(report.stats.exact_blocks, 2);
    assert_eq!(report.stats.matched_blocks, 2);
    assert_eq!(report.groups[0].exact_blocks, 2);
    for row in &report.groups[0].channels[0].rows {
        let t = row.timeslice;
        let corrected_first = EXACT[t] - SLOPPY_MATCHED[t] - SLOPPY_OTHER[t];
        assert_close(row.exact, c((EXACT[t] + SECOND[t]) / 2.0));
        assert_close(row.residual, c((corrected_first + SECOND[t]) / 2.0));
    }
}

#[test]
fn oversized_declared_geometry_fails_without_reserving_it() {
    let geometry = Geometry::two_point(TT, 1 << 40).with_sloppy_sources(1);
    let reducer = TwoPointReducer::new(geometry).unwrap();
    let err = reducer
        .reduce(block(0, EXACT), block(0, SLOPPY_MATCHED))
        .unwrap_err();
    assert_eq!(err.info().code, "exact-block-count");
    assert_eq!(err.info().context["expected"], (1usize << 40).to_string());
    assert_eq!(err.info().context["observed"], "1");

    let reducer = TwoPointReducer::new(Geometry::two_point(1 << 17, 1 << 17)).unwrap();
    let single: Vec<Result<TwoPointRecord, AmaError>> = vec![Ok(TwoPointRecord {
        source: 0,
        timeslice: 0,
        value: Complex::new(1.0, 0.0),
    })];
    let err = reducer.reduce(single, Vec::new()).unwrap_err();
    assert!(matches!(err, AmaError::Geometry(_)));
}
