//! Commit diffs.

use repobrowse_diff::{DEFAULT_CONTEXT_LINES, compute_hunks, decode_text};
use repobrowse_diff_models::Change;
use repobrowse_object_store::{BlobContent, MODE_GITLINK, MODE_TYPE_MASK, ObjectId, TreeChange};
use repobrowse_repo_models::RepoError;

use crate::repository::encoding_error;
use crate::{Commit, Repository};

/// One endpoint of a tree change.
enum Side {
    /// The path does not exist on this side.
    Absent,
    /// A submodule commit reference.
    Submodule(ObjectId),
    Blob(BlobContent),
    /// The blob is not present in the store.
    Missing,
}

impl Side {
    fn is_binary(&self) -> bool {
        matches!(self, Self::Blob(blob) if blob.is_binary())
    }

    fn into_text(self) -> Result<String, RepoError> {
        match self {
            Self::Absent | Self::Missing => Ok(String::new()),
            Self::Submodule(id) => Ok(format!("Subproject commit {id}\n")),
            Self::Blob(blob) => decode_text(&blob.into_bytes()).map_err(encoding_error),
        }
    }
}

impl Repository {
    /// Changes introduced by `commit` relative to its first parent, or to the
    /// empty tree for root commits.
    ///
    /// Changes come in the order the store's tree diff reports them. A change
    /// is binary if either side contains a NUL byte; binary changes and
    /// additions or deletions of empty files carry no hunks.
    ///
    /// # Errors
    ///
    /// * `RepoError::Encoding` - a textual side could not be decoded
    /// * `RepoError::Store` - the object store failed
    pub fn diff(&self, commit: &Commit<'_>) -> Result<Vec<Change>, RepoError> {
        let parent_tree = match commit.parent_ids().first() {
            Some(parent) => {
                let tree = self.find_commit(parent)?.map(|info| info.tree_id);
                if tree.is_none() {
                    log::warn!("first parent {parent} of {} is missing", commit.id());
                }
                tree
            }
            None => None,
        };

        let changes = self
            .store()
            .tree_changes(parent_tree.as_ref(), Some(commit.tree_id()))?;
        log::debug!("commit {} changes {} paths", commit.short_id(), changes.len());

        changes
            .into_iter()
            .map(|change| self.build_change(change))
            .collect()
    }

    fn build_change(&self, change: TreeChange) -> Result<Change, RepoError> {
        let old = self.load_side(change.old_mode, change.old_id.as_ref())?;
        let new = self.load_side(change.new_mode, change.new_id.as_ref())?;
        let is_binary = old.is_binary() || new.is_binary();

        let hunks = if is_binary {
            Vec::new()
        } else {
            compute_hunks(&old.into_text()?, &new.into_text()?, DEFAULT_CONTEXT_LINES)
        };

        Ok(Change {
            old_path: change.old_path,
            new_path: change.new_path,
            old_mode: change.old_mode,
            new_mode: change.new_mode,
            old_id: change.old_id,
            new_id: change.new_id,
            is_binary,
            hunks,
        })
    }

    fn load_side(&self, mode: Option<u32>, id: Option<&ObjectId>) -> Result<Side, RepoError> {
        let (Some(mode), Some(id)) = (mode, id) else {
            return Ok(Side::Absent);
        };
        if mode & MODE_TYPE_MASK == MODE_GITLINK {
            return Ok(Side::Submodule(id.clone()));
        }
        Ok(match self.store().blob_content(id)? {
            Some(blob) => Side::Blob(blob),
            None => {
                log::debug!("blob {id} is not in the store, diffing as empty");
                Side::Missing
            }
        })
    }
}
