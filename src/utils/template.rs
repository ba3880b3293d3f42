//! Placeholder substitution for `for-each` subtasks.

/// Token substituted by each `for-each` item in a subtask's `name` and `cmd`.
pub const PLACEHOLDER: &str = "<replace>";

/// Replace every occurrence of [`PLACEHOLDER`] in `template` with `value`.
///
/// Substitution is a single literal pass: text introduced by `value` is never
/// expanded again, and no shell escaping is applied.
pub fn expand(template: &str, value: &str) -> String {
    template.replace(PLACEHOLDER, value)
}

pub fn is_present(template: &str) -> bool {
    template.contains(PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_replaces_every_occurrence() {
        assert_eq!(
            expand("cp <replace>.in <replace>.out", "lib"),
            "cp lib.in lib.out"
        );
    }

    #[test]
    fn expand_without_placeholder_is_identity() {
        assert_eq!(expand("make all", "ignored"), "make all");
    }

    #[test]
    fn expand_is_not_recursive() {
        assert_eq!(expand("echo <replace>", "<replace>"), "echo <replace>");
    }

    #[test]
    fn expand_splices_value_verbatim() {
        assert_eq!(expand("echo <replace>", "a b; c"), "echo a b; c");
    }

    #[test]
    fn is_present_detects_token() {
        assert!(is_present("build <replace>"));
        assert!(!is_present("build all"));
    }
}
