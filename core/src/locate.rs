use std::path::{Path, PathBuf};

use crate::error::RunnerError;

/// Walk upward from `start` until a directory containing `sentinel` exists,
/// and return that directory.
///
/// The sentinel's presence alone marks the project root; its content is
/// never read. Reaching the filesystem root without a hit fails the run.
/// Each existence check is awaited, so concurrent runs are not blocked
/// while the walk is in flight.
pub async fn find_project_root(start: &Path, sentinel: &str) -> Result<PathBuf, RunnerError> {
    let mut dir = start.to_path_buf();
    loop {
        if tokio::fs::metadata(dir.join(sentinel)).await.is_ok() {
            return Ok(dir);
        }
        dir = match dir.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(RunnerError::RootNotFound {
                    sentinel: sentinel.to_string(),
                    start: start.to_path_buf(),
                })
            }
        };
    }
}
