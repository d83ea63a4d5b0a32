//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `mocharelay_core::api` instead of reaching into
//! internal modules.

pub use crate::config::{load_default, RunnerConfig};
pub use crate::error::{CliError, RunnerError};
pub use crate::locate::find_project_root;
pub use crate::opts::{load_sanitized, sanitize};
pub use crate::protocol::{LineDecoder, ProtocolEvent, TestInfo, TestStatus, TestSummary};
pub use crate::reporter::{status_of, EventReporter, RecordedTest, TestCase, TestOutcome};
pub use crate::runner::{RunRequest, RunSession, SKIP_OPTS_ENV};
