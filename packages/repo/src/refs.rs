//! Revision resolution and reference listings.

use repobrowse_object_store::{Object, ObjectId};
use repobrowse_repo_models::RepoError;

use crate::{Commit, Repository};

/// Branch names tried, in order, when guessing the default branch.
pub const DEFAULT_BRANCH_CANDIDATES: [&str; 4] = ["master", "trunk", "default", "gh-pages"];

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";

impl Repository {
    /// Resolve a revision to a commit.
    ///
    /// The revision is tried as a branch name, as a tag name, as a full
    /// reference name such as `HEAD`, and finally as a full hex object id.
    /// The first existing reference wins. Annotated tags are followed once.
    ///
    /// # Errors
    ///
    /// * `RepoError::RevisionNotFound` - nothing matched, or the match is not
    ///   a commit
    /// * `RepoError::Store` - the object store failed
    pub fn resolve(&self, revision: &str) -> Result<Commit<'_>, RepoError> {
        let not_found = || RepoError::RevisionNotFound {
            revision: revision.to_string(),
        };

        let candidates = [
            format!("{HEADS_PREFIX}{revision}"),
            format!("{TAGS_PREFIX}{revision}"),
            revision.to_string(),
        ];
        for name in &candidates {
            if let Some(id) = self.store().find_reference(name)? {
                log::debug!("revision '{revision}' matched reference {name} -> {id}");
                let info = self.peel_to_commit(&id)?.ok_or_else(not_found)?;
                return Ok(Commit::new(self, info));
            }
        }

        if let Ok(id) = revision.parse::<ObjectId>() {
            if let Some(info) = self.peel_to_commit(&id)? {
                log::debug!("revision '{revision}' matched object id");
                return Ok(Commit::new(self, info));
            }
        }

        Err(not_found())
    }

    /// Resolve `revision`, or the default branch when no revision is given.
    ///
    /// # Errors
    ///
    /// * `RepoError::EmptyRepository` - no revision given and no branch exists
    /// * any error of [`Repository::resolve`]
    pub fn resolve_or_default(&self, revision: Option<&str>) -> Result<Commit<'_>, RepoError> {
        if let Some(revision) = revision {
            return self.resolve(revision);
        }
        let branch = self.default_branch()?.ok_or(RepoError::EmptyRepository)?;
        self.resolve(&branch)
    }

    /// Guess the default branch name.
    ///
    /// Tries [`DEFAULT_BRANCH_CANDIDATES`] in order, then falls back to the
    /// most recently updated branch. Returns `None` without branches.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the object store fails.
    pub fn default_branch(&self) -> Result<Option<String>, RepoError> {
        for candidate in DEFAULT_BRANCH_CANDIDATES {
            match self.resolve(candidate) {
                Ok(_) => return Ok(Some(candidate.to_string())),
                Err(RepoError::RevisionNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(self.branch_names(None)?.into_iter().next())
    }

    /// Branch short names, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the object store fails.
    pub fn branch_names(&self, exclude: Option<&str>) -> Result<Vec<String>, RepoError> {
        self.sorted_ref_names(HEADS_PREFIX, exclude)
    }

    /// Tag short names, most recent first.
    ///
    /// Annotated tags are ordered by tagger time, lightweight tags by the
    /// time of the commit they point at.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the object store fails.
    pub fn tag_names(&self) -> Result<Vec<String>, RepoError> {
        self.sorted_ref_names(TAGS_PREFIX, None)
    }

    fn sorted_ref_names(
        &self,
        prefix: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<String>, RepoError> {
        let mut refs = Vec::new();
        for (name, id) in self.store().references(prefix)? {
            let Some(short) = name.strip_prefix(prefix) else {
                continue;
            };
            if exclude == Some(short) {
                continue;
            }
            refs.push((self.ref_time(&id)?, short.to_string()));
        }
        // Stable sort keeps store order for equal times.
        refs.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(refs.into_iter().map(|(_, name)| name).collect())
    }

    fn ref_time(&self, id: &ObjectId) -> Result<Option<i64>, RepoError> {
        Ok(match self.store().find_object(id)? {
            Some(Object::Commit(commit)) => Some(commit.timestamp),
            Some(Object::Tag(tag)) => tag.tagger_time,
            _ => None,
        })
    }
}
