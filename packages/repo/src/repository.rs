//! Repository handle.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use repobrowse_diff::decode_text;
use repobrowse_object_store::{
    CommitInfo, Object, ObjectId, ObjectStore, ObjectStoreBackend,
};
use repobrowse_repo_models::RepoError;

use crate::Commit;

/// Prefix of the description git writes into freshly created repositories.
const PLACEHOLDER_DESCRIPTION: &str = "Unnamed repository;";

/// A repository opened for browsing.
pub struct Repository {
    name: String,
    path: PathBuf,
    store: Box<dyn ObjectStore>,
}

impl Repository {
    /// Open the repository at `path` through `backend`.
    ///
    /// The name is derived from the path, see [`derive_name`].
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the backend cannot open the repository.
    pub fn open<B: ObjectStoreBackend + ?Sized>(backend: &B, path: &Path) -> Result<Self, RepoError> {
        let store = backend.open(path)?;
        let name = derive_name(path);
        log::debug!("opened repository '{name}' at {}", path.display());
        Ok(Self::from_store(name, path.to_path_buf(), store))
    }

    /// Wrap an already opened store.
    #[must_use]
    pub fn from_store(name: String, path: PathBuf, store: Box<dyn ObjectStore>) -> Self {
        Self { name, path, store }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying object store.
    #[must_use]
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// The repository description without trailing whitespace, or `None` when
    /// it is missing, empty, or git's default placeholder.
    ///
    /// # Errors
    ///
    /// * `RepoError::Encoding` - the description is not decodable text
    /// * `RepoError::Store` - the description could not be read
    pub fn description(&self) -> Result<Option<String>, RepoError> {
        let Some(bytes) = self.store.description()? else {
            return Ok(None);
        };
        if bytes.is_empty() || bytes.starts_with(PLACEHOLDER_DESCRIPTION.as_bytes()) {
            return Ok(None);
        }
        let text = decode_text(&bytes).map_err(encoding_error)?;
        Ok(Some(text.trim_end().to_string()))
    }

    /// Timestamp of the most recent commit any reference points at.
    ///
    /// Annotated tags are followed to their commit. Returns `None` when no
    /// reference resolves to a commit.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if references or objects cannot be read.
    pub fn last_updated_at(&self) -> Result<Option<i64>, RepoError> {
        let mut latest = None;
        for (name, id) in self.store.references("refs/")? {
            match self.peel_to_commit(&id)? {
                Some(commit) => {
                    latest = latest.max(Some(commit.timestamp));
                }
                None => log::trace!("reference {name} does not point at a commit"),
            }
        }
        Ok(latest)
    }

    /// Look up the commit with the given id.
    ///
    /// # Errors
    ///
    /// * `RepoError::RevisionNotFound` - no commit has that id
    /// * `RepoError::Store` - the object store failed
    pub fn commit(&self, id: &ObjectId) -> Result<Commit<'_>, RepoError> {
        self.find_commit(id)?
            .map(|info| Commit::new(self, info))
            .ok_or_else(|| RepoError::RevisionNotFound {
                revision: id.to_string(),
            })
    }

    pub(crate) fn find_commit(&self, id: &ObjectId) -> Result<Option<CommitInfo>, RepoError> {
        match self.store.find_object(id)? {
            Some(Object::Commit(info)) => Ok(Some(info)),
            _ => Ok(None),
        }
    }

    /// Resolve `id` to a commit, following one annotated tag.
    pub(crate) fn peel_to_commit(&self, id: &ObjectId) -> Result<Option<CommitInfo>, RepoError> {
        match self.store.find_object(id)? {
            Some(Object::Commit(info)) => Ok(Some(info)),
            Some(Object::Tag(tag)) => self.find_commit(&tag.target_id),
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Derive a display name from a repository location.
///
/// Trailing separators are ignored, the last path segment is taken, and a
/// `.git` suffix is removed: `/srv/git/project.git/` becomes `project`.
#[must_use]
pub fn derive_name(path: &Path) -> String {
    let is_separator = |c: char| c == '/' || c == MAIN_SEPARATOR;
    let path = path.to_string_lossy();
    let trimmed = path.trim_end_matches(is_separator);
    let last = trimmed.rsplit(is_separator).next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

pub(crate) fn encoding_error(err: repobrowse_diff::DecodeError) -> RepoError {
    RepoError::Encoding {
        message: err.to_string(),
    }
}
