use ama_core::errors::{AmaError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("path", "exact.dat")
        .with_context("record", 12)
}

#[test]
fn io_error_surface() {
    let err = AmaError::Io(sample_info("stream-open", "no such file"));
    assert_eq!(err.info().code, "stream-open");
    assert!(err.info().context.contains_key("path"));
}

#[test]
fn geometry_mismatch_carries_counts() {
    let err = AmaError::geometry_mismatch("exact-block-count", "wrong block count", 4, 3);
    assert_eq!(err.info().context["expected"], "4");
    assert_eq!(err.info().context["observed"], "3");
    assert!(matches!(err, AmaError::Geometry(_)));
}

#[test]
fn display_includes_context_and_hint() {
    let err = AmaError::Average(
        sample_info("uneven-blocks", "N=10 not divisible by n=3").with_hint("check bucketing"),
    );
    let text = err.to_string();
    assert!(text.starts_with("average error: N=10 not divisible by n=3 (code: uneven-blocks)"));
    assert!(text.contains("record=12"));
    assert!(text.ends_with("| hint: check bucketing"));
}

#[test]
fn context_added_after_the_fact_keeps_family() {
    let err =
        AmaError::Config(ErrorInfo::new("config-parse", "bad yaml")).with_context("job", "pion");
    assert!(matches!(err, AmaError::Config(_)));
    assert_eq!(err.info().context["job"], "pion");
}

#[test]
fn errors_round_trip_json() {
    let err = AmaError::Parse(sample_info("truncated-record", "stream ended mid record"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Parse\""));
    let decoded: AmaError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
