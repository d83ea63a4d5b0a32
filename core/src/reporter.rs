use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::protocol::{ProtocolEvent, TestInfo, TestStatus, TestSummary};

/// One test as the embedding framework sees it.
///
/// `timed_out` is only reliable one scheduler turn after the completion
/// hook fires; see [`EventReporter::test_end`].
pub trait TestCase {
    /// Fully-qualified title, unique within the suite.
    fn full_title(&self) -> String;
    /// Source file the test was loaded from, if known.
    fn file(&self) -> Option<String>;
    /// Terminal state; `None` when the framework reports neither a pass nor
    /// a fail (pending, aborted suite, ...).
    fn outcome(&self) -> Option<TestOutcome>;
    fn timed_out(&self) -> bool;
    fn duration(&self) -> Option<Duration>;
    /// Failure text, absent for non-failing tests.
    fn failure(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed,
}

/// Plain [`TestCase`] record for harnesses that buffer results.
#[derive(Debug, Clone, Default)]
pub struct RecordedTest {
    pub full_title: String,
    pub file: Option<String>,
    pub outcome: Option<TestOutcome>,
    pub timed_out: bool,
    pub duration: Option<Duration>,
    pub failure: Option<String>,
}

impl TestCase for RecordedTest {
    fn full_title(&self) -> String {
        self.full_title.clone()
    }
    fn file(&self) -> Option<String> {
        self.file.clone()
    }
    fn outcome(&self) -> Option<TestOutcome> {
        self.outcome
    }
    fn timed_out(&self) -> bool {
        self.timed_out
    }
    fn duration(&self) -> Option<Duration> {
        self.duration
    }
    fn failure(&self) -> Option<String> {
        self.failure.clone()
    }
}

/// Bridges a test framework's lifecycle into the wire protocol on `out`.
///
/// Attach before any test executes: the `summary` event enumerating the
/// suite is written immediately, so it always precedes every `run-test`
/// event on the stream. Each event is one JSON line, the exact envelope
/// [`crate::protocol::LineDecoder`] reassembles on the other side.
pub struct EventReporter<W> {
    out: W,
}

impl<W: AsyncWrite + Unpin> EventReporter<W> {
    /// Emit the suite summary and return the attached reporter.
    pub async fn attach<'a, T, I>(out: W, suite: I) -> std::io::Result<Self>
    where
        T: TestCase + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let summary_info = suite.into_iter().map(summarize).collect();
        let mut reporter = Self { out };
        reporter
            .emit(&ProtocolEvent::Summary { summary_info })
            .await?;
        Ok(reporter)
    }

    /// Framework start hook.
    pub async fn start(&mut self) -> std::io::Result<()> {
        self.emit(&ProtocolEvent::Start).await
    }

    /// Test completion hook.
    ///
    /// The framework sets the timeout flag after invoking this hook, so the
    /// record is read one scheduler turn later rather than immediately.
    pub async fn test_end<T: TestCase + ?Sized>(&mut self, test: &T) -> std::io::Result<()> {
        tokio::task::yield_now().await;
        self.emit(&ProtocolEvent::RunTest {
            test_info: test_info(test),
        })
        .await
    }

    async fn emit(&mut self, event: &ProtocolEvent) -> std::io::Result<()> {
        let mut line = serde_json::to_string(event).map_err(std::io::Error::other)?;
        line.push('\n');
        self.out.write_all(line.as_bytes()).await?;
        self.out.flush().await
    }
}

/// Status mapping: passed tests report PASSED; failed tests report TIMEOUT
/// when the timeout flag is set and FAILED otherwise; anything else is
/// SKIPPED.
pub fn status_of<T: TestCase + ?Sized>(test: &T) -> TestStatus {
    match test.outcome() {
        Some(TestOutcome::Passed) => TestStatus::Passed,
        Some(TestOutcome::Failed) if test.timed_out() => TestStatus::Timeout,
        Some(TestOutcome::Failed) => TestStatus::Failed,
        None => TestStatus::Skipped,
    }
}

fn summarize<T: TestCase + ?Sized>(test: &T) -> TestSummary {
    let title = test.full_title();
    TestSummary {
        class_name: title.clone(),
        file_name: test.file().unwrap_or_default(),
        id: title.clone(),
        name: title,
    }
}

fn test_info<T: TestCase + ?Sized>(test: &T) -> TestInfo {
    let status = status_of(test);
    let title = test.full_title();
    TestInfo {
        details: test.failure().unwrap_or_default(),
        duration_secs: test.duration().unwrap_or_default().as_secs_f64(),
        name: title.clone(),
        num_assertions: 1,
        num_failures: u32::from(matches!(status, TestStatus::Failed | TestStatus::Timeout)),
        num_methods: 1,
        num_skipped: u32::from(status == TestStatus::Skipped),
        status,
        test_json: json!({ "id": title }),
    }
}
