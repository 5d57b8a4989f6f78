//! Scanner Types
//!
//! Release tags and collected files shared by the scanner, the pipeline and
//! the exporters.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// A release tag resolved to its commit
///
/// Ordering uses the commit's *author* timestamp, never the committer date or
/// the tag creation date.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tag {
    /// Short tag name (`v1.2.0`), unique within a repository
    pub name: String,
    /// Full hex id of the referenced commit
    pub commit: String,
    /// Author timestamp of the referenced commit
    pub authored_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(
        name: impl Into<String>,
        commit: impl Into<String>,
        authored_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            commit: commit.into(),
            authored_at,
        }
    }

    /// First 8 characters of the commit id
    pub fn short_commit(&self) -> &str {
        self.commit.get(..8).unwrap_or(&self.commit)
    }
}

/// Sort tags ascending by author time; equal timestamps fall back to the name
pub fn sort_chronologically(tags: &mut [Tag]) {
    tags.sort_by(|a, b| {
        a.authored_at
            .cmp(&b.authored_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// A regular file found under the working tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollectedFile {
    /// `/`-separated path relative to the working tree root
    pub relative: String,
    pub absolute: PathBuf,
}

/// A tag that could not be analysed
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SkippedTag {
    pub name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn test_sort_by_author_time() {
        let mut tags = vec![
            Tag::new("v2.0", "c2", at(2_000)),
            Tag::new("v0.9", "c0", at(500)),
            Tag::new("v1.0", "c1", at(1_000)),
        ];
        sort_chronologically(&mut tags);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["v0.9", "v1.0", "v2.0"]);
    }

    #[test]
    fn test_equal_timestamps_sorted_by_name() {
        let mut tags = vec![
            Tag::new("b", "c2", at(1_000)),
            Tag::new("a", "c1", at(1_000)),
        ];
        sort_chronologically(&mut tags);
        assert_eq!(tags[0].name, "a");
        assert_eq!(tags[1].name, "b");
    }

    #[test]
    fn test_short_commit() {
        let tag = Tag::new("v1", "0123456789abcdef", at(0));
        assert_eq!(tag.short_commit(), "01234567");
        let short = Tag::new("v1", "abc", at(0));
        assert_eq!(short.short_commit(), "abc");
    }
}
