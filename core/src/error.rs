use std::path::PathBuf;

use thiserror::Error;

/// Failures that short-circuit a run.
///
/// Options-file problems never appear here; an unreadable options file is
/// substituted with empty arguments. Malformed protocol lines are
/// reclassified as stderr text by the decoder, not raised.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no {sentinel} found above {}", .start.display())]
    RootNotFound { sentinel: String, start: PathBuf },

    #[error("failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("run cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("io error")]
    Io(#[from] std::io::Error),
}
