use std::collections::BTreeSet;

use serde::Serialize;

/// Set of tags selecting which top-level tasks run.
///
/// An empty filter selects every task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagFilter(BTreeSet<String>);

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from raw `--tags` values.
    ///
    /// Values are joined with commas and split again, so `["a,b", "c"]` and
    /// `["a", "b", "c"]` produce the same filter.
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Self {
        if raw.is_empty() {
            return Self::new();
        }

        let joined = raw.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
        Self(joined.split(',').map(str::to_string).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether a task carrying `task_tags` is selected.
    ///
    /// Untagged tasks always run, every task runs under an empty filter, and
    /// otherwise one matching tag is enough.
    pub fn includes<S: AsRef<str>>(&self, task_tags: &[S]) -> bool {
        task_tags.is_empty()
            || self.is_empty()
            || task_tags.iter().any(|tag| self.contains(tag.as_ref()))
    }
}

impl<S: Into<String>> FromIterator<S> for TagFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn empty_filter_and_untagged_task_runs() {
        assert!(TagFilter::new().includes(NONE));
    }

    #[test]
    fn empty_filter_includes_tagged_task() {
        assert!(TagFilter::new().includes(&["deploy"]));
    }

    #[test]
    fn untagged_task_runs_under_any_filter() {
        let filter: TagFilter = ["ci"].into_iter().collect();
        assert!(filter.includes(NONE));
    }

    #[test]
    fn any_matching_tag_is_enough() {
        let filter: TagFilter = ["b"].into_iter().collect();
        assert!(filter.includes(&["a", "b"]));
    }

    #[test]
    fn disjoint_tags_are_skipped() {
        let filter: TagFilter = ["y"].into_iter().collect();
        assert!(!filter.includes(&["x"]));
    }

    #[test]
    fn from_raw_splits_comma_joined_values() {
        let filter = TagFilter::from_raw(&["a,b", "c"]);
        let tags: Vec<&str> = filter.iter().collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn from_raw_is_idempotent_on_single_tags() {
        let once = TagFilter::from_raw(&["a,b", "c"]);
        let split: Vec<String> = once.iter().map(str::to_string).collect();
        assert_eq!(TagFilter::from_raw(&split), once);
    }

    #[test]
    fn from_raw_empty_is_empty_filter() {
        assert!(TagFilter::from_raw::<&str>(&[]).is_empty());
    }
}
