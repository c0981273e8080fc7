use scopetrace::analysis::summarize;
use scopetrace::trace_data::TraceData;
use scopetrace::{Duration, Tid, Timestamp};

#[test]
fn test_parse_trace_from_file_succeeds() {
    let trace_path = "tests/fixtures/simple_trace.json";
    let result = TraceData::from_file(trace_path);

    assert!(result.is_ok(), "Failed to parse trace file: {:?}", result.err());

    let data = result.unwrap();
    assert_eq!(data.event_count(), 4, "Metadata event should be skipped");
    assert_eq!(data.threads, vec![Tid(1), Tid(2), Tid(3)]);
}

#[test]
fn test_parse_trace_extracts_all_fields() {
    let data = TraceData::from_file("tests/fixtures/simple_trace.json").unwrap();

    let event = &data.events[0];
    assert_eq!(event.name, "step (controller_node)");
    assert_eq!(event.tid, Tid(1));
    assert_eq!(event.ts, Timestamp(1_000_000));
    assert_eq!(event.dur, Duration(5_000));
    assert_eq!(event.end(), Timestamp(1_005_000));
}

#[test]
fn test_parse_trace_calculates_duration() {
    let data = TraceData::from_file("tests/fixtures/simple_trace.json").unwrap();

    // First start 1_000_000, last end 1_009_000
    assert_eq!(data.duration, Duration(9_000));
}

#[test]
fn test_summary_of_fixture() {
    let data = TraceData::from_file("tests/fixtures/simple_trace.json").unwrap();
    let stats = summarize(&data);

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].name, "step (controller_node)");
    assert_eq!(stats[0].count, 2);
    assert_eq!(stats[0].total, Duration(8_000));
    assert_eq!(stats[0].max, Duration(5_000));
    assert_eq!(stats[1].name, "solve (planner)");
    assert_eq!(stats[1].mean, Duration(1_000));
}

#[test]
fn test_parse_invalid_file_returns_error() {
    let result = TraceData::from_file("nonexistent.json");
    assert!(result.is_err(), "Should fail for missing file");
}

#[test]
fn test_parse_invalid_json_returns_error() {
    use std::io::Write;
    use tempfile::NamedTempFile;

    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{{ invalid json").unwrap();

    let result = TraceData::from_file(temp_file.path());
    assert!(result.is_err(), "Should fail for invalid JSON");
}

#[test]
fn test_parse_empty_trace_events() {
    use std::io::Write;
    use tempfile::NamedTempFile;

    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, r#"{{"otherData": {{}}, "traceEvents": []}}"#).unwrap();

    let data = TraceData::from_file(temp_file.path()).unwrap();

    assert_eq!(data.event_count(), 0);
    assert!(data.threads.is_empty());
    assert_eq!(data.duration, Duration(0));
}
