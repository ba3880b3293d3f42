//! Shell quoting utilities for status output.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for display as a shell command line.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Render a program and its arguments as one copy-pasteable command line.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(quote_arg(program))
        .chain(args.iter().map(|a| quote_arg(a)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_arg_simple() {
        assert_eq!(quote_arg("run"), "run");
        assert_eq!(quote_arg("--tags"), "--tags");
    }

    #[test]
    fn quote_arg_with_spaces() {
        assert_eq!(quote_arg("my pipeline.yml"), "'my pipeline.yml'");
    }

    #[test]
    fn quote_arg_with_single_quote() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn quote_arg_empty() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let args = vec!["run".to_string(), "ci pipeline.yml".to_string()];
        assert_eq!(
            command_line("/usr/bin/bashful", &args),
            "/usr/bin/bashful run 'ci pipeline.yml'"
        );
    }
}
