pub mod decoder;
pub mod event;

pub use decoder::LineDecoder;
pub use event::{ProtocolEvent, TestInfo, TestStatus, TestSummary};
