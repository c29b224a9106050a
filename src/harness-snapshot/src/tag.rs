//! Snapshot tag naming and ordering.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Runs of characters that are not allowed in a tag component.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("Invalid tag component regex"));

/// Joins the feature and scenario components. Never produced by normalization.
pub const COMPONENT_SEPARATOR: char = '-';

/// Git tag naming a scenario's post-run state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotTag(String);

impl SnapshotTag {
    /// Derive the tag of a feature/scenario pair.
    ///
    /// Every run of characters outside `[A-Za-z0-9_]` becomes a single `_`
    /// and the two cleaned names are joined with `-`. Empty names become `_`.
    pub fn for_scenario(feature: &str, scenario: &str) -> Self {
        Self(format!(
            "{}{COMPONENT_SEPARATOR}{}",
            normalize(feature),
            normalize(scenario)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SnapshotTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An empty name becomes `_` so a tag never starts with `-`, which git would
/// read as an option.
fn normalize(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    NON_WORD.replace_all(name, "_").into_owned()
}

/// What restoring a managed directory amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    /// Hard-reset to this tag.
    ResetTo(String),
    /// No earlier tag: delete the directory.
    Remove,
}

/// Alphabetically sorted tags of one managed repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTimeline {
    tags: Vec<String>,
}

impl TagTimeline {
    pub fn new(tags: impl IntoIterator<Item = String>) -> Self {
        let mut tags: Vec<String> = tags.into_iter().collect();
        tags.sort();
        tags.dedup();
        Self { tags }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Index of `tag`, if present.
    pub fn position(&self, tag: &str) -> Option<usize> {
        self.tags.binary_search_by(|t| t.as_str().cmp(tag)).ok()
    }

    /// The tag sorting immediately before `tag`.
    ///
    /// An unknown tag is placed after every known one, so this is then the
    /// last tag of the timeline.
    pub fn preceding(&self, tag: &str) -> Option<&str> {
        let index = self.position(tag).unwrap_or(self.tags.len());
        index
            .checked_sub(1)
            .map(|before| self.tags[before].as_str())
    }

    pub fn restore_target(&self, tag: &str) -> RestoreTarget {
        match self.preceding(tag) {
            Some(before) => RestoreTarget::ResetTo(before.to_string()),
            None => RestoreTarget::Remove,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(tags: &[&str]) -> TagTimeline {
        TagTimeline::new(tags.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_tag_is_stable() {
        let first = SnapshotTag::for_scenario("Feature A", "Scenario 1");
        let second = SnapshotTag::for_scenario("Feature A", "Scenario 1");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "Feature_A-Scenario_1");
    }

    #[test]
    fn test_tag_collapses_non_word_runs() {
        let tag = SnapshotTag::for_scenario("Basics: the  workspace", "run `syskit ide` -- twice!");
        assert_eq!(tag.as_str(), "Basics_the_workspace-run_syskit_ide_twice_");

        let spaced = SnapshotTag::for_scenario("Feature   A", "Scenario\t1");
        assert_eq!(spaced, SnapshotTag::for_scenario("Feature A", "Scenario 1"));
    }

    #[test]
    fn test_tag_separator_is_unambiguous() {
        let tag = SnapshotTag::for_scenario("a-b", "c");
        assert_eq!(tag.as_str(), "a_b-c");
        assert_eq!(tag.as_str().matches(COMPONENT_SEPARATOR).count(), 1);
    }

    #[test]
    fn test_tag_never_starts_with_dash() {
        assert_eq!(SnapshotTag::for_scenario("", "S").as_str(), "_-S");
        assert_eq!(SnapshotTag::for_scenario("F", "").as_str(), "F-_");
        assert_eq!(SnapshotTag::for_scenario("-f", "s").as_str(), "_f-s");
    }

    #[test]
    fn test_timeline_sorts_alphabetically() {
        let tl = timeline(&["t3", "t1", "t2", "t1"]);
        assert_eq!(tl.tags(), ["t1", "t2", "t3"]);
    }

    #[test]
    fn test_preceding_tag() {
        let tl = timeline(&["t1", "t2", "t3"]);
        assert_eq!(tl.restore_target("t2"), RestoreTarget::ResetTo("t1".to_string()));
        assert_eq!(tl.restore_target("t1"), RestoreTarget::Remove);
    }

    #[test]
    fn test_unknown_tag_goes_to_last() {
        let tl = timeline(&["t1", "t2", "t3"]);
        assert_eq!(tl.preceding("t0"), Some("t3"));
        assert_eq!(tl.restore_target("zzz"), RestoreTarget::ResetTo("t3".to_string()));
    }

    #[test]
    fn test_empty_timeline_removes() {
        assert_eq!(TagTimeline::default().restore_target("t1"), RestoreTarget::Remove);
    }
}
