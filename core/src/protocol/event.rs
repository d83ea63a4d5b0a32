use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire events delivered to the embedding UI.
///
/// Serialized as single-line JSON tagged by `kind`; this shape crosses the
/// process boundary between the spawned framework and the runner, so field
/// names are part of the contract and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProtocolEvent {
    /// The framework began executing tests.
    Start,
    /// Every test discoverable in the loaded suite, emitted before any runs.
    Summary {
        #[serde(rename = "summaryInfo")]
        summary_info: Vec<TestSummary>,
    },
    /// One completed test.
    RunTest {
        #[serde(rename = "testInfo")]
        test_info: TestInfo,
    },
    /// Plain diagnostic text from the child, one event per line.
    Stderr { data: String },
    /// The run failed before or during execution.
    Error { error: String },
}

/// Identifies a test before it runs. All identifying fields derive from the
/// test's fully-qualified title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub class_name: String,
    pub file_name: String,
    pub id: String,
    pub name: String,
}

/// Result payload for one completed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInfo {
    /// Failure text, empty when the test did not fail.
    pub details: String,
    pub duration_secs: f64,
    pub name: String,
    pub num_assertions: u32,
    /// 0 or 1.
    pub num_failures: u32,
    pub num_methods: u32,
    /// 0 or 1.
    pub num_skipped: u32,
    pub status: TestStatus,
    /// Opaque correlation payload echoed back to the UI.
    #[serde(rename = "test_json")]
    pub test_json: Value,
}

/// Terminal state of a test, carried on the wire as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TestStatus {
    Passed = 1,
    Failed = 2,
    Skipped = 3,
    Fatal = 4,
    Timeout = 5,
}

impl From<TestStatus> for u8 {
    fn from(status: TestStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for TestStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TestStatus::Passed),
            2 => Ok(TestStatus::Failed),
            3 => Ok(TestStatus::Skipped),
            4 => Ok(TestStatus::Fatal),
            5 => Ok(TestStatus::Timeout),
            other => Err(format!("unknown test status code: {other}")),
        }
    }
}
