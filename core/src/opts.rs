use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

/// Flags that would fight with the reporter injection or hold the child
/// process open. Each entry is (flag, total argv positions it occupies,
/// including the flag itself).
const DISALLOWED: &[(&str, usize)] = &[
    ("--opts", 2),
    ("--recursive", 1),
    ("--reporter-options", 2),
    ("--reporter", 2),
    ("--watch-extensions", 2),
    ("--watch", 1),
    ("-O", 2),
    ("-R", 2),
    ("-w", 1),
];

/// Flags known safe to forward, with their declared arity.
const ALLOWED: &[(&str, usize)] = &[
    ("--compilers", 2),
    ("--globals", 2),
    ("--fgrep", 2),
    ("--grep", 2),
    ("--require", 2),
    ("--slow", 2),
    ("--timeout", 2),
    ("--ui", 2),
    ("-f", 2),
    ("-g", 2),
    ("-r", 2),
    ("-s", 2),
    ("-t", 2),
    ("-u", 2),
];

/// Reversible stand-in for backslash-escaped whitespace, so escaped spaces
/// survive tokenization.
const WS_PLACEHOLDER: &str = "%20";

lazy_static! {
    static ref ESCAPED_WS: Regex = Regex::new(r"\\\s").expect("escaped-whitespace pattern");
}

/// Read `<root>/<opts_file>` and reduce it to the prefix of arguments safe
/// to forward to the framework.
///
/// A missing or unreadable file is not an error; it yields no arguments.
pub async fn load_sanitized(root: &Path, opts_file: &str) -> Vec<String> {
    match tokio::fs::read_to_string(root.join(opts_file)).await {
        Ok(data) => sanitize(&data),
        Err(err) => {
            tracing::debug!(
                target: "mocharelay.opts",
                %err,
                "options file unreadable, running with empty args"
            );
            Vec::new()
        }
    }
}

/// Tokenize options-file text and keep only the safe prefix.
///
/// Disallowed flags are dropped together with the value tokens their arity
/// declares. Unknown `-` tokens pass through as no-value flags; dropping
/// user configuration silently would be worse than forwarding a flag we do
/// not recognize. A trailing flag whose value tokens never arrived is cut
/// off entirely so no dangling switch corrupts the final command line.
pub fn sanitize(data: &str) -> Vec<String> {
    let escaped = ESCAPED_WS.replace_all(data, WS_PLACEHOLDER);

    let mut opts: Vec<String> = Vec::new();
    let mut skip = 0usize;
    // index one past the last token confirmed safe to forward
    let mut safe_len = 0usize;
    let mut before_last_flag = 0usize;

    for token in escaped.split_whitespace() {
        let token = token.replace(WS_PLACEHOLDER, " ");

        if skip > 0 {
            skip -= 1;
            continue;
        }
        if let Some(arity) = arity_of(DISALLOWED, &token) {
            skip = arity - 1;
            continue;
        }

        let position = opts.len();
        let is_flag = token.starts_with('-');
        opts.push(token);
        if is_flag {
            before_last_flag = safe_len;
            safe_len = position + arity_of(ALLOWED, &opts[position]).unwrap_or(1);
        }
    }

    // safe_len beyond the token count means the final flag's values never
    // arrived; fall back to the marker that preceded that flag
    let cut = if safe_len <= opts.len() {
        safe_len
    } else {
        before_last_flag
    };
    opts.truncate(cut);
    opts
}

fn arity_of(table: &[(&str, usize)], token: &str) -> Option<usize> {
    table
        .iter()
        .find(|(flag, _)| *flag == token)
        .map(|(_, arity)| *arity)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn keeps_allowed_flag_and_drops_disallowed_one() {
        assert_eq!(sanitize("--timeout 5000 --watch"), args("--timeout 5000"));
    }

    #[test]
    fn disallowed_flag_consumes_its_declared_value_tokens() {
        assert_eq!(
            sanitize("--reporter spec --timeout 200"),
            args("--timeout 200")
        );
        assert_eq!(sanitize("-R json --grep login"), args("--grep login"));
    }

    #[test]
    fn trailing_flag_without_its_values_is_cut_off() {
        assert_eq!(sanitize("--slow 300 --timeout"), args("--slow 300"));
        assert_eq!(sanitize("--timeout"), Vec::<String>::new());
    }

    #[test]
    fn unknown_flags_pass_through_as_no_value_flags() {
        assert_eq!(
            sanitize("--bail --timeout 100"),
            args("--bail --timeout 100")
        );
        assert_eq!(sanitize("--bail"), args("--bail"));
    }

    #[test]
    fn tokens_after_the_last_confirmed_flag_group_are_dropped() {
        assert_eq!(sanitize("--grep login spec/login.js"), args("--grep login"));
        assert_eq!(sanitize("spec/only.js"), Vec::<String>::new());
    }

    #[test]
    fn escaped_whitespace_survives_tokenization() {
        assert_eq!(
            sanitize(r"--grep needs\ escaping"),
            vec!["--grep".to_string(), "needs escaping".to_string()]
        );
    }

    #[test]
    fn whitespace_runs_and_newlines_are_insignificant() {
        assert_eq!(
            sanitize("--require\n\tbabel-register\n--ui   bdd\n"),
            args("--require babel-register --ui bdd")
        );
    }

    #[test]
    fn empty_input_yields_no_args() {
        assert_eq!(sanitize(""), Vec::<String>::new());
        assert_eq!(sanitize("   \n "), Vec::<String>::new());
    }

    #[tokio::test]
    async fn unreadable_file_yields_no_args() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load_sanitized(dir.path(), "test/mocha.opts").await,
            Vec::<String>::new()
        );
    }

    #[tokio::test]
    async fn file_contents_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("test")).unwrap();
        std::fs::write(
            dir.path().join("test/mocha.opts"),
            "--timeout 5000\n--watch\n",
        )
        .unwrap();
        assert_eq!(
            load_sanitized(dir.path(), "test/mocha.opts").await,
            args("--timeout 5000")
        );
    }
}
