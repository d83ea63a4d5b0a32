//! The reporter and the decoder are two ends of one wire: whatever the
//! reporter writes must come back out of the decoder unchanged, however the
//! transport happens to chunk it.

use std::io::Cursor;
use std::time::Duration;

use pretty_assertions::assert_eq;

use mocharelay_core::api::{
    EventReporter, LineDecoder, ProtocolEvent, RecordedTest, TestOutcome, TestStatus,
};

fn suite() -> Vec<RecordedTest> {
    let passed = RecordedTest {
        full_title: "math adds small numbers".to_string(),
        file: Some("test/math.js".to_string()),
        outcome: Some(TestOutcome::Passed),
        duration: Some(Duration::from_millis(12)),
        ..RecordedTest::default()
    };
    let mut failed = passed.clone();
    failed.full_title = "math divides by zero".to_string();
    failed.outcome = Some(TestOutcome::Failed);
    failed.failure = Some("Error: division by zero".to_string());
    let mut timed_out = failed.clone();
    timed_out.full_title = "math waits forever".to_string();
    timed_out.timed_out = true;
    let mut pending = passed.clone();
    pending.full_title = "math rounds oddly".to_string();
    pending.outcome = None;

    vec![passed, failed, timed_out, pending]
}

async fn wire_bytes() -> String {
    let tests = suite();
    let mut out = Cursor::new(Vec::new());
    let mut reporter = EventReporter::attach(&mut out, &tests).await.unwrap();
    reporter.start().await.unwrap();
    for test in &tests {
        reporter.test_end(test).await.unwrap();
    }
    String::from_utf8(out.into_inner()).unwrap()
}

#[tokio::test]
async fn chunking_never_changes_what_comes_out() {
    let wire = wire_bytes().await;

    let baseline = LineDecoder::new().feed(&wire);
    assert_eq!(baseline.len(), 6, "summary + start + four tests");

    for chunk_size in [1, 2, 3, 7, 16, 64, wire.len()] {
        let mut decoder = LineDecoder::new();
        let mut events = Vec::new();
        let bytes = wire.as_bytes();
        for chunk in bytes.chunks(chunk_size) {
            events.extend(decoder.feed(std::str::from_utf8(chunk).unwrap()));
        }
        assert_eq!(events, baseline, "chunk size {chunk_size}");
    }
}

#[tokio::test]
async fn statuses_survive_the_round_trip() {
    let wire = wire_bytes().await;
    let events = LineDecoder::new().feed(&wire);

    let statuses: Vec<TestStatus> = events
        .iter()
        .filter_map(|event| match event {
            ProtocolEvent::RunTest { test_info } => Some(test_info.status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            TestStatus::Passed,
            TestStatus::Failed,
            TestStatus::Timeout,
            TestStatus::Skipped,
        ]
    );
}

#[tokio::test]
async fn noise_injected_between_reporter_lines_is_isolated() {
    let wire = wire_bytes().await;
    let lines: Vec<&str> = wire.lines().collect();
    let noisy = format!(
        "{}\nnpm WARN deprecated module\n{}\n",
        lines[0],
        lines[1..].join("\n")
    );

    let events = LineDecoder::new().feed(&noisy);
    assert_eq!(events.len(), 7);
    assert_eq!(
        events[1],
        ProtocolEvent::Stderr {
            data: "npm WARN deprecated module".into()
        }
    );
    assert!(matches!(events[0], ProtocolEvent::Summary { .. }));
    assert_eq!(events[2], ProtocolEvent::Start);
}
