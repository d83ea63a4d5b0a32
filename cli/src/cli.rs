use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "mocharelay",
    about = "Run a mocha test file and relay structured per-test results"
)]
pub struct Args {
    /// Test file to run.
    pub target: PathBuf,

    /// How decoded events are rendered.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Override the configured framework executable.
    #[arg(long)]
    pub cmd: Option<String>,

    /// Extra arguments forwarded to the framework, after the options-file
    /// args and before the reporter injection.
    #[arg(trailing_var_arg = true)]
    pub framework_args: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One human-readable line per event.
    Text,
    /// Re-emit each event as a JSON line.
    Jsonl,
}
