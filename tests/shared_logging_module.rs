use chainflow::shared::logging::append_event;
use chainflow::shared::EventLog;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[test]
fn logging_module_appends_json_lines_with_event_fields() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested/events.jsonl");
    append_event(&path, "phase_started", &[("runMode", Value::from("analysis"))])
        .expect("append");
    append_event(&path, "phase_failed", &[("error", Value::from("boom"))]).expect("append");

    let raw = fs::read_to_string(&path).expect("read");
    let lines: Vec<Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).expect("json"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "phase_started");
    assert_eq!(lines[0]["runMode"], "analysis");
    assert!(lines[0]["timestamp"].is_i64());
    assert_eq!(lines[1]["error"], "boom");
}

#[test]
fn logging_module_swallows_write_failures() {
    let temp = tempdir().expect("tempdir");
    let blocker = temp.path().join("file");
    fs::write(&blocker, "x").expect("write blocker");
    let log = EventLog::new(Some(blocker.join("events.jsonl")));
    log.record("phase_started", &[]);
    EventLog::disabled().record("phase_started", &[]);
    assert!(EventLog::disabled().path().is_none());
}
