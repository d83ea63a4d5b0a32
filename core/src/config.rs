use std::path::Path;

use serde::{Deserialize, Serialize};

/// Runner configuration, supplied by the embedding UI or loaded from
/// `config.toml`.
///
/// Every field has an explicit default so a missing file yields a working
/// setup for a conventional node project. The struct is passed into each
/// [`crate::runner::RunRequest`] explicitly; nothing here is global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Test framework executable, resolved relative to the project root.
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments inserted between the options-file args and the
    /// reporter-injection args.
    #[serde(default)]
    pub args: Vec<String>,

    /// Project-local options file, relative to the project root.
    #[serde(default = "default_opts_file")]
    pub opts_file: String,

    /// File whose presence marks a directory as the project root. Its
    /// content is never read.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    /// Reporter handed to the framework via `-R`.
    #[serde(default = "default_reporter")]
    pub reporter: String,
}

fn default_command() -> String {
    "node_modules/.bin/mocha".to_string()
}

fn default_opts_file() -> String {
    "test/mocha.opts".to_string()
}

fn default_sentinel() -> String {
    "package.json".to_string()
}

fn default_reporter() -> String {
    "mocharelay/reporter".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            opts_file: default_opts_file(),
            sentinel: default_sentinel(),
            reporter: default_reporter(),
        }
    }
}

pub fn load_default() -> anyhow::Result<RunnerConfig> {
    let mut cfg: RunnerConfig = if Path::new("config.toml").exists() {
        let s = std::fs::read_to_string("config.toml")?;
        toml::from_str::<RunnerConfig>(&s)?
    } else {
        RunnerConfig::default()
    };

    if let Ok(v) = std::env::var("MOCHARELAY_CMD") {
        if !v.trim().is_empty() {
            cfg.command = v;
        }
    }
    if let Ok(v) = std::env::var("MOCHARELAY_REPORTER") {
        if !v.trim().is_empty() {
            cfg.reporter = v;
        }
    }

    Ok(cfg)
}
