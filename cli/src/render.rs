use mocharelay_core::api::{ProtocolEvent, TestStatus};

/// Human-readable rendering for one event; `None` suppresses the line.
pub fn render_text(event: &ProtocolEvent) -> Option<String> {
    match event {
        ProtocolEvent::Start => None,
        ProtocolEvent::Summary { summary_info } => {
            Some(format!("{} tests queued", summary_info.len()))
        }
        ProtocolEvent::RunTest { test_info } => {
            let mut line = format!(
                "{:>7}  {} ({:.3}s)",
                label(test_info.status),
                test_info.name,
                test_info.duration_secs
            );
            if !test_info.details.is_empty() {
                line.push_str("\n         ");
                line.push_str(&test_info.details);
            }
            Some(line)
        }
        ProtocolEvent::Stderr { data } => Some(data.clone()),
        ProtocolEvent::Error { error } => Some(format!("error: {error}")),
    }
}

fn label(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "ok",
        TestStatus::Failed => "FAIL",
        TestStatus::Skipped => "skip",
        TestStatus::Fatal => "FATAL",
        TestStatus::Timeout => "TIMEOUT",
    }
}

#[cfg(test)]
mod tests {
    use mocharelay_core::api::TestInfo;
    use serde_json::json;

    use super::*;

    #[test]
    fn failed_tests_render_their_details() {
        let event = ProtocolEvent::RunTest {
            test_info: TestInfo {
                details: "AssertionError: nope".into(),
                duration_secs: 0.5,
                name: "adds".into(),
                num_assertions: 1,
                num_failures: 1,
                num_methods: 1,
                num_skipped: 0,
                status: TestStatus::Failed,
                test_json: json!({"id": "adds"}),
            },
        };
        let line = render_text(&event).unwrap();
        assert!(line.contains("FAIL"));
        assert!(line.contains("adds"));
        assert!(line.contains("AssertionError: nope"));
    }

    #[test]
    fn start_is_silent_in_text_mode() {
        assert_eq!(render_text(&ProtocolEvent::Start), None);
    }
}
