//! Commit history traversal.
//!
//! History is walked in-process: commits are visited newest first through a
//! max-heap keyed on commit time, following every parent. With a path filter
//! only commits whose object at that path differs from at least one parent
//! are reported.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Instant;

use repobrowse_object_store::{CommitInfo, Object, ObjectId};
use repobrowse_repo_models::RepoError;

use crate::tree::{normalize, segments};
use crate::{Commit, Repository};

/// Commits shown on the first history page.
pub const FIRST_PAGE_SIZE: usize = 10;

/// Commits shown on every following history page.
pub const PAGE_SIZE: usize = 30;

/// Shared flag for cancelling a running history walk from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// Parameters of a history walk.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Only report commits touching this path.
    pub path: Option<String>,
    /// Maximum number of commits to return.
    pub max_commits: Option<usize>,
    /// Number of matching commits to skip first.
    pub skip: usize,
    /// Fail with `DeadlineExceeded` once this instant has passed.
    pub deadline: Option<Instant>,
    /// Fail with `Cancelled` once this token is cancelled.
    pub cancel: Option<CancelToken>,
}

impl HistoryQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub const fn with_max_commits(mut self, max_commits: usize) -> Self {
        self.max_commits = Some(max_commits);
        self
    }

    #[must_use]
    pub const fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(RepoError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(RepoError::DeadlineExceeded);
        }
        Ok(())
    }
}

/// One page of history.
#[derive(Debug, Clone)]
pub struct HistoryPage<'r> {
    pub commits: Vec<Commit<'r>>,
    /// At least one more matching commit exists after this page.
    pub has_more: bool,
}

/// Size and offset of a numbered history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub size: usize,
    pub skip: usize,
}

/// The window of page `page`: the first page holds [`FIRST_PAGE_SIZE`]
/// commits, later pages [`PAGE_SIZE`] each.
#[must_use]
pub const fn page_window(page: usize) -> PageWindow {
    if page == 0 {
        PageWindow {
            size: FIRST_PAGE_SIZE,
            skip: 0,
        }
    } else {
        PageWindow {
            size: PAGE_SIZE,
            skip: (page - 1) * PAGE_SIZE + FIRST_PAGE_SIZE,
        }
    }
}

struct Queued {
    timestamp: i64,
    seq: u64,
    info: CommitInfo,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl Repository {
    /// Commits reachable from `revision`, newest first.
    ///
    /// Equivalent to `git log [--skip] [--max-count] <revision> [-- <path>]`.
    ///
    /// # Errors
    ///
    /// * `RepoError::RevisionNotFound` - `revision` does not resolve
    /// * `RepoError::Store` - the object store failed
    pub fn history(
        &self,
        revision: &str,
        path: Option<&str>,
        max_commits: Option<usize>,
        skip: usize,
    ) -> Result<Vec<Commit<'_>>, RepoError> {
        let query = HistoryQuery {
            path: path.map(str::to_string),
            max_commits,
            skip,
            ..HistoryQuery::default()
        };
        self.history_with(revision, &query)
    }

    /// Run a history walk described by `query`.
    ///
    /// # Errors
    ///
    /// * `RepoError::Cancelled` - the query's token was cancelled
    /// * `RepoError::DeadlineExceeded` - the query's deadline passed
    /// * any error of [`Repository::history`]
    pub fn history_with(
        &self,
        revision: &str,
        query: &HistoryQuery,
    ) -> Result<Vec<Commit<'_>>, RepoError> {
        let start = self.resolve(revision)?;
        let path = query
            .path
            .as_deref()
            .map(normalize)
            .filter(|path| !path.is_empty());
        log::debug!(
            "walking history of {} from {} (path={path:?} skip={} max={:?})",
            self.name(),
            start.id(),
            query.skip,
            query.max_commits
        );

        let mut commits = Vec::new();
        if query.max_commits == Some(0) {
            return Ok(commits);
        }

        let mut seen = HashSet::new();
        let mut queue = BinaryHeap::new();
        let mut seq = 0;
        let mut matched = 0;

        seen.insert(start.id().clone());
        let info = start.into_info();
        queue.push(Queued {
            timestamp: info.timestamp,
            seq,
            info,
        });

        while let Some(Queued { info, .. }) = queue.pop() {
            query.check()?;

            let parents = self.load_parents(&info)?;
            let touches = match &path {
                Some(path) => self.touches_path(&info, &parents, path)?,
                None => true,
            };

            for parent in parents {
                if seen.insert(parent.id.clone()) {
                    seq += 1;
                    queue.push(Queued {
                        timestamp: parent.timestamp,
                        seq,
                        info: parent,
                    });
                }
            }

            if !touches {
                continue;
            }
            matched += 1;
            if matched <= query.skip {
                continue;
            }
            commits.push(Commit::new(self, info));
            if query.max_commits.is_some_and(|max| commits.len() >= max) {
                break;
            }
        }

        Ok(commits)
    }

    /// Fetch `page_size` commits after `skip`, and whether more follow.
    ///
    /// # Errors
    ///
    /// See [`Repository::history`].
    pub fn history_page(
        &self,
        revision: &str,
        path: Option<&str>,
        page_size: usize,
        skip: usize,
    ) -> Result<HistoryPage<'_>, RepoError> {
        let mut commits = self.history(revision, path, Some(page_size + 1), skip)?;
        let has_more = commits.len() > page_size;
        commits.truncate(page_size);
        Ok(HistoryPage { commits, has_more })
    }

    fn load_parents(&self, commit: &CommitInfo) -> Result<Vec<CommitInfo>, RepoError> {
        let mut parents = Vec::with_capacity(commit.parent_ids.len());
        for id in &commit.parent_ids {
            match self.find_commit(id)? {
                Some(parent) => parents.push(parent),
                None => log::warn!("parent {id} of commit {} is missing", commit.id),
            }
        }
        Ok(parents)
    }

    /// Whether `commit` changed the object at `path` relative to any parent.
    ///
    /// Commits without (available) parents touch every path they contain.
    fn touches_path(
        &self,
        commit: &CommitInfo,
        parents: &[CommitInfo],
        path: &str,
    ) -> Result<bool, RepoError> {
        let id = self.id_at_path(&commit.tree_id, path)?;
        if parents.is_empty() {
            return Ok(id.is_some());
        }
        for parent in parents {
            if self.id_at_path(&parent.tree_id, path)? != id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn id_at_path(&self, root: &ObjectId, path: &str) -> Result<Option<ObjectId>, RepoError> {
        let mut current = root.clone();
        for segment in segments(path) {
            let Some(Object::Tree(tree)) = self.store().find_object(&current)? else {
                return Ok(None);
            };
            let Some(entry) = tree.entry(segment) else {
                return Ok(None);
            };
            current = entry.id.clone();
        }
        log::trace!("{path} in tree {root} is {current}");
        Ok(Some(current))
    }
}
