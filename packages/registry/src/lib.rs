#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Repository registry for `repobrowse`.
//!
//! The registry is built once at startup from an explicit list of repository
//! locations and then only read, so it can be shared by reference.

use std::cmp::Reverse;
use std::path::Path;
use std::sync::Arc;

use repobrowse_object_store::ObjectStoreBackend;
use repobrowse_repo::{RepoError, Repository};
use serde::{Deserialize, Serialize};

/// Ordering of [`RepoRegistry::sorted`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoOrder {
    /// Ascending by name.
    #[default]
    Name,
    /// Most recently updated first; repositories without references last.
    LastUpdated,
}

/// The set of repositories available for browsing.
pub struct RepoRegistry<B: ObjectStoreBackend> {
    backend: Arc<B>,
    repos: Vec<Repository>,
}

impl<B: ObjectStoreBackend> RepoRegistry<B> {
    /// Create an empty registry opening repositories through `backend`.
    #[must_use]
    pub const fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            repos: Vec::new(),
        }
    }

    /// Create a registry containing the repositories at `paths`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`RepoRegistry::add`].
    pub fn from_paths<P: AsRef<Path>>(
        backend: Arc<B>,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, RepoError> {
        let mut registry = Self::new(backend);
        for path in paths {
            registry.add(path.as_ref())?;
        }
        Ok(registry)
    }

    /// Open the repository at `path` and register it.
    ///
    /// A repository whose name is already taken is still registered, but
    /// [`RepoRegistry::get`] keeps returning the earlier one.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the repository cannot be opened.
    pub fn add(&mut self, path: &Path) -> Result<&Repository, RepoError> {
        let repo = Repository::open(self.backend.as_ref(), path)?;
        if self.repos.iter().any(|existing| existing.name() == repo.name()) {
            log::warn!(
                "repository name '{}' of {} is already registered; it will be shadowed",
                repo.name(),
                path.display()
            );
        }
        log::debug!("registered repository '{}'", repo.name());
        self.repos.push(repo);
        Ok(&self.repos[self.repos.len() - 1])
    }

    /// Find a repository by name. The first registered match wins.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::RepositoryNotFound` if no repository has that name.
    pub fn get(&self, name: &str) -> Result<&Repository, RepoError> {
        self.repos
            .iter()
            .find(|repo| repo.name() == name)
            .ok_or_else(|| RepoError::RepositoryNotFound {
                name: name.to_string(),
            })
    }

    /// All repositories in registration order.
    #[must_use]
    pub fn all(&self) -> &[Repository] {
        &self.repos
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// All repositories in the requested order.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if a repository's references cannot be read
    /// while ordering by last update.
    pub fn sorted(&self, order: RepoOrder) -> Result<Vec<&Repository>, RepoError> {
        match order {
            RepoOrder::Name => {
                let mut repos: Vec<&Repository> = self.repos.iter().collect();
                repos.sort_by(|a, b| a.name().cmp(b.name()));
                Ok(repos)
            }
            RepoOrder::LastUpdated => {
                let mut keyed = self
                    .repos
                    .iter()
                    .map(|repo| Ok((repo.last_updated_at()?, repo)))
                    .collect::<Result<Vec<_>, RepoError>>()?;
                keyed.sort_by_key(|(updated, _)| Reverse(*updated));
                Ok(keyed.into_iter().map(|(_, repo)| repo).collect())
            }
        }
    }

    /// The backend repositories are opened with.
    #[must_use]
    pub const fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

impl<B: ObjectStoreBackend> std::fmt::Debug for RepoRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoRegistry")
            .field("repos", &self.repos)
            .finish_non_exhaustive()
    }
}
