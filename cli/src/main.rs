mod cli;
mod render;

use clap::Parser;
use mocharelay_core::api::{load_default, ProtocolEvent, RunRequest, RunSession};
use mocharelay_core::error::CliError;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = cli::Args::parse();

    let mut config = load_default().map_err(|e| CliError::Config(e.to_string()))?;
    if let Some(cmd) = args.cmd {
        config.command = cmd;
    }

    let mut request = RunRequest::new(args.target, &config);
    request.extra_args.extend(args.framework_args);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let session = RunSession::spawn(request, event_tx);

    let mut run_failed = false;
    while let Some(event) = event_rx.recv().await {
        if matches!(event, ProtocolEvent::Error { .. }) {
            run_failed = true;
        }
        match args.format {
            cli::Format::Jsonl => {
                let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
                println!("{line}");
            }
            cli::Format::Text => {
                if let Some(line) = render::render_text(&event) {
                    println!("{line}");
                }
            }
        }
    }
    session.wait().await;

    // test failures were already relayed per test; only a run-level error
    // changes the exit code
    std::process::exit(if run_failed { 1 } else { 0 });
}
