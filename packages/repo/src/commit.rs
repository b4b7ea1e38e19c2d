//! Commit values bound to their repository.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use repobrowse_diff_models::Change;
use repobrowse_object_store::{CommitInfo, ObjectId};
use repobrowse_repo_models::RepoError;

use crate::Repository;

/// Matches `Name <email>` style author strings.
static AUTHOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*?)<.*?>$").unwrap());

/// A commit together with the repository it was read from.
#[derive(Debug, Clone)]
pub struct Commit<'r> {
    repo: &'r Repository,
    info: CommitInfo,
}

impl<'r> Commit<'r> {
    pub(crate) const fn new(repo: &'r Repository, info: CommitInfo) -> Self {
        Self { repo, info }
    }

    #[must_use]
    pub const fn repository(&self) -> &'r Repository {
        self.repo
    }

    /// The stored commit fields.
    #[must_use]
    pub const fn info(&self) -> &CommitInfo {
        &self.info
    }

    #[must_use]
    pub fn into_info(self) -> CommitInfo {
        self.info
    }

    #[must_use]
    pub const fn id(&self) -> &ObjectId {
        &self.info.id
    }

    /// First ten hex characters of the id.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.info.id.short()
    }

    /// Raw author string.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.info.author
    }

    /// Author name without the email address.
    ///
    /// Falls back to the raw author string if it is not `Name <email>` shaped.
    #[must_use]
    pub fn author_name(&self) -> &str {
        extract_author_name(&self.info.author)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.info.message
    }

    /// First line of the message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.info.message.split('\n').next().unwrap_or_default()
    }

    /// Commit time in seconds since the epoch.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.info.timestamp
    }

    /// Commit time as a UTC datetime, or `None` if the timestamp is out of
    /// the representable range.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.info.timestamp)
    }

    #[must_use]
    pub const fn tree_id(&self) -> &ObjectId {
        &self.info.tree_id
    }

    #[must_use]
    pub fn parent_ids(&self) -> &[ObjectId] {
        &self.info.parent_ids
    }

    /// Changes introduced by this commit relative to its first parent.
    ///
    /// # Errors
    ///
    /// See [`Repository::diff`].
    pub fn diff(&self) -> Result<Vec<Change>, RepoError> {
        self.repo.diff(self)
    }
}

impl PartialEq for Commit<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.repo, other.repo) && self.info.id == other.info.id
    }
}

impl Eq for Commit<'_> {}

fn extract_author_name(author: &str) -> &str {
    AUTHOR_REGEX
        .captures(author)
        .and_then(|captures| captures.get(1))
        .map_or(author, |name| name.as_str().trim())
}

fn to_datetime(timestamp: i64) -> Option<DateTime<Utc>> {
    let datetime = DateTime::from_timestamp(timestamp, 0);
    if datetime.is_none() {
        log::warn!("commit timestamp {timestamp} is out of range");
    }
    datetime
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_author_name() {
        assert_eq!(extract_author_name("John <john@example.com>"), "John");
        assert_eq!(
            extract_author_name("  Jane Doe   <jane@example.com>"),
            "Jane Doe"
        );
        assert_eq!(
            extract_author_name("noname@example.com"),
            "noname@example.com"
        );
        assert_eq!(extract_author_name("<only@example.com>"), "");
    }

    #[test]
    fn test_to_datetime() {
        assert_eq!(
            to_datetime(86_400).map(|datetime| datetime.to_rfc3339()),
            Some("1970-01-02T00:00:00+00:00".to_string())
        );
        assert_eq!(to_datetime(i64::MAX), None);
        assert_eq!(to_datetime(i64::MIN), None);
    }
}
