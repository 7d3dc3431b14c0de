//! RETRIEVE_* payload parsing and artifact output.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use chrono::NaiveDate;
use qs_common::{RecordFilter, RecordKind};

use crate::mocks::{Event, Harness, OUTPUT_DIR, cmd};

fn retrievals(h: &Harness) -> Vec<Event> {
    h.events()
        .into_iter()
        .filter(|e| matches!(e, Event::Retrieve(..)))
        .collect()
}

#[tokio::test]
async fn test_flight_data_with_empty_payload_end_to_end() {
    let h = Harness::new();
    h.store.queue([cmd(1, "RETRIEVE_FLIGHT_DATA", "")]);

    h.orchestrator().drain_cycle().await;

    assert_eq!(
        retrievals(&h),
        vec![Event::Retrieve(RecordKind::FlightData, RecordFilter::All)]
    );
    let written = h.artifacts.written();
    assert_eq!(written.len(), 1);
    assert_eq!(
        written[0].0,
        PathBuf::from(OUTPUT_DIR).join("cmd20240304050607_flight_")
    );
    assert_eq!(written[0].1, serde_json::json!([{"session": 1, "value": "r1"}]));
    assert!(h.store.succeeded(1));
}

#[tokio::test]
async fn test_payload_forms_and_garbage_isolation() {
    let h = Harness::new();
    h.store.queue([
        cmd(1, "RETRIEVE_SYSTEM_MESSAGES", ""),
        cmd(2, "RETRIEVE_SYSTEM_MESSAGES", "42"),
        cmd(3, "RETRIEVE_SYSTEM_MESSAGES", "not-a-filter"),
        cmd(4, "RETRIEVE_SYSTEM_MESSAGES", "2024-01-02 03:04:05"),
    ]);

    h.orchestrator().drain_cycle().await;

    let since = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .expect("valid time");
    assert_eq!(
        retrievals(&h),
        vec![
            Event::Retrieve(RecordKind::SystemMessages, RecordFilter::All),
            Event::Retrieve(RecordKind::SystemMessages, RecordFilter::Session(42)),
            Event::Retrieve(RecordKind::SystemMessages, RecordFilter::Since(since)),
        ]
    );
    assert!(h.store.succeeded(1));
    assert!(h.store.succeeded(2));
    assert!(h.store.failed(3));
    assert!(h.store.succeeded(4));
    assert!(h.store.diagnostic(3).contains("not-a-filter"));
    assert_eq!(h.store.completed_ids(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_artifact_name_uses_category_and_payload() {
    let h = Harness::new();
    h.store.queue([cmd(1, "RETRIEVE_COMMAND_LOGS", "7")]);

    h.orchestrator().drain_cycle().await;

    let written = h.artifacts.written();
    assert_eq!(
        written[0].0,
        PathBuf::from(OUTPUT_DIR).join("cmd20240304050607_command_log_7")
    );
}

#[tokio::test]
async fn test_write_failure_fails_only_that_kind() {
    let h = Harness::new();
    h.artifacts.failures.add("write");
    h.store.queue([cmd(1, "RETRIEVE_FLIGHT_DATA", ""), cmd(2, "HANGUP", "")]);

    h.orchestrator().drain_cycle().await;

    assert!(h.store.failed(1));
    assert!(h.store.succeeded(2));
}
