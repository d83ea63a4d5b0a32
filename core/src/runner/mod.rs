mod launch;

use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::locate;
use crate::opts;
use crate::protocol::{LineDecoder, ProtocolEvent};

pub use launch::{compose_args, SKIP_OPTS_ENV};

/// Everything needed to run one test file. Immutable once built; each run
/// derives its working directory and sanitized options transiently.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub target: PathBuf,
    pub command: String,
    pub extra_args: Vec<String>,
    pub opts_file: String,
    pub sentinel: String,
    pub reporter: String,
}

impl RunRequest {
    pub fn new(target: impl Into<PathBuf>, config: &RunnerConfig) -> Self {
        Self {
            target: target.into(),
            command: config.command.clone(),
            extra_args: config.args.clone(),
            opts_file: config.opts_file.clone(),
            sentinel: config.sentinel.clone(),
            reporter: config.reporter.clone(),
        }
    }
}

/// Handle to one in-flight run.
///
/// Decoded events arrive on the channel given to [`RunSession::spawn`] in
/// stream order; the channel closes and [`RunSession::wait`] resolves
/// exactly once when the run concludes, success or failure. Failures are
/// reported as an `error`-kind event before the channel closes, never as a
/// panic or a missing finalization.
pub struct RunSession {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RunSession {
    /// Start a run on a background task. Runs are independent: each owns
    /// its child process, decoder state, and stderr buffer, so any number
    /// of sessions may be in flight concurrently.
    pub fn spawn(request: RunRequest, event_tx: mpsc::UnboundedSender<ProtocolEvent>) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(run_request(request, event_tx, cancel_rx));
        Self { cancel_tx, task }
    }

    /// Ask the run to stop: the child process is killed, its streams are
    /// drained, and the run still finalizes with an `error` event.
    /// Cancelling a finished run has no effect.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Resolves once the run has concluded and every event was delivered.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

async fn run_request(
    request: RunRequest,
    event_tx: mpsc::UnboundedSender<ProtocolEvent>,
    cancel_rx: watch::Receiver<bool>,
) {
    if let Err(err) = drive(&request, &event_tx, cancel_rx).await {
        tracing::debug!(target: "mocharelay.runner", %err, "run failed");
        let _ = event_tx.send(ProtocolEvent::Error {
            error: err.to_string(),
        });
    }
    // dropping event_tx closes the channel, which is the finalization signal
}

async fn drive(
    request: &RunRequest,
    event_tx: &mpsc::UnboundedSender<ProtocolEvent>,
    mut cancel_rx: watch::Receiver<bool>,
) -> Result<(), RunnerError> {
    let start_dir = request
        .target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| request.target.clone());
    let root = locate::find_project_root(&start_dir, &request.sentinel).await?;
    let sanitized = opts::load_sanitized(&root, &request.opts_file).await;
    let argv = launch::compose_args(request, &sanitized);

    tracing::debug!(
        target: "mocharelay.runner",
        command = %request.command,
        cwd = %root.display(),
        ?argv,
        "spawning test framework"
    );
    let mut child = launch::spawn_child(request, &root, &argv)?;

    let stdout = child.stdout.take().unwrap();
    let stderr = child.stderr.take().unwrap();

    let (chunk_tx, mut chunk_rx) = mpsc::channel::<Chunk>(64);
    let out_task = pump(stdout, Chunk::Stdout, chunk_tx.clone());
    let err_task = pump(stderr, Chunk::Stderr, chunk_tx);

    let mut decoder = LineDecoder::new();
    let mut stderr_buf = StderrLines::default();
    let mut cancelled = false;
    let mut cancel_open = true;

    loop {
        tokio::select! {
            chunk = chunk_rx.recv() => match chunk {
                Some(Chunk::Stdout(text)) => {
                    for event in decoder.feed(&text) {
                        let _ = event_tx.send(event);
                    }
                }
                Some(Chunk::Stderr(text)) => {
                    for line in stderr_buf.feed(&text) {
                        let _ = event_tx.send(ProtocolEvent::Stderr { data: line });
                    }
                }
                // both pipes reached EOF
                None => break,
            },
            changed = cancel_rx.changed(), if cancel_open && !cancelled => {
                match changed {
                    Ok(()) if *cancel_rx.borrow() => {
                        cancelled = true;
                        let _ = child.start_kill();
                    }
                    Ok(()) => {}
                    // session handle dropped without cancelling
                    Err(_) => cancel_open = false,
                }
            }
        }
    }

    // an incomplete trailing stderr line is held back until close
    if let Some(rest) = stderr_buf.take_rest() {
        let _ = event_tx.send(ProtocolEvent::Stderr { data: rest });
    }
    if decoder.has_partial() {
        tracing::debug!(
            target: "mocharelay.decoder",
            "stdout closed with an unfinished structured line"
        );
    }

    let status = child.wait().await.map_err(|source| RunnerError::Wait {
        program: request.command.clone(),
        source,
    })?;
    out_task.await.ok();
    err_task.await.ok();

    if cancelled {
        return Err(RunnerError::Cancelled);
    }

    // test failures arrive as run-test events; the exit code is not a
    // signal of anything the UI does not already know
    tracing::debug!(target: "mocharelay.runner", code = ?status.code(), "test framework closed");
    Ok(())
}

enum Chunk {
    Stdout(String),
    Stderr(String),
}

fn pump<R>(mut reader: R, wrap: fn(String) -> Chunk, tx: mpsc::Sender<Chunk>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                    if tx.send(wrap(text)).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Line accumulator for the child's stderr: complete lines come out as they
/// arrive, an incomplete trailing line is held until more data (or close)
/// arrives.
#[derive(Default)]
struct StderrLines {
    rest: String,
}

impl StderrLines {
    fn feed(&mut self, chunk: &str) -> Vec<String> {
        let combined = format!("{}{}", self.rest, chunk);
        let mut lines: Vec<String> = combined.split('\n').map(str::to_string).collect();
        self.rest = lines.pop().unwrap_or_default();
        lines
    }

    fn take_rest(&mut self) -> Option<String> {
        if self.rest.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.rest))
        }
    }
}
