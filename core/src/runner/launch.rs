use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::error::RunnerError;
use crate::runner::RunRequest;

/// Marker telling the child that options-file arguments were already folded
/// into its command line; without it the framework would apply the options
/// file a second time.
pub const SKIP_OPTS_ENV: &str = "LOADED_MOCHA_OPTS";

/// Arguments forcing the framework into machine-readable reporter mode:
/// colors off, reporter swapped for the wire-protocol one.
const REPORTER_FLAGS: [&str; 2] = ["-C", "-R"];

/// `<sanitized-options-args> <extra-args> -C -R <reporter> <target>`
pub fn compose_args(request: &RunRequest, sanitized_opts: &[String]) -> Vec<String> {
    let mut argv =
        Vec::with_capacity(sanitized_opts.len() + request.extra_args.len() + REPORTER_FLAGS.len() + 2);
    argv.extend(sanitized_opts.iter().cloned());
    argv.extend(request.extra_args.iter().cloned());
    argv.extend(REPORTER_FLAGS.iter().map(|flag| flag.to_string()));
    argv.push(request.reporter.clone());
    argv.push(request.target.to_string_lossy().into_owned());
    argv
}

/// Spawn the framework in `cwd` with stdout and stderr piped back to the
/// runner. The caller's environment is inherited, plus the marker variable.
pub fn spawn_child(request: &RunRequest, cwd: &Path, argv: &[String]) -> Result<Child, RunnerError> {
    Command::new(&request.command)
        .args(argv)
        .current_dir(cwd)
        .env(SKIP_OPTS_ENV, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RunnerError::Spawn {
            program: request.command.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::RunnerConfig;

    #[test]
    fn argv_orders_options_then_extras_then_reporter_then_target() {
        let config = RunnerConfig {
            args: vec!["--bail".to_string()],
            reporter: "mocharelay/reporter".to_string(),
            ..RunnerConfig::default()
        };
        let request = RunRequest::new("/proj/test/login.js", &config);
        let sanitized = vec!["--timeout".to_string(), "5000".to_string()];

        assert_eq!(
            compose_args(&request, &sanitized),
            vec![
                "--timeout",
                "5000",
                "--bail",
                "-C",
                "-R",
                "mocharelay/reporter",
                "/proj/test/login.js",
            ]
        );
    }

    #[test]
    fn argv_without_options_or_extras_is_just_the_reporter_injection() {
        let request = RunRequest::new("t.js", &RunnerConfig::default());
        assert_eq!(
            compose_args(&request, &[]),
            vec!["-C", "-R", "mocharelay/reporter", "t.js"]
        );
    }
}
