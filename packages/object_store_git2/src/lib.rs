#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! git2 (libgit2) implementation of the `ObjectStore` trait.
//!
//! This crate provides a production-ready object store using the `git2` crate,
//! which wraps the `libgit2` C library.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use git2::{Delta, ErrorCode, ObjectType, Oid, Repository};
use repobrowse_object_store::{ObjectStore, ObjectStoreBackend};
use repobrowse_object_store_models::{
    BlobContent, BlobInfo, CommitInfo, Object, ObjectId, ObjectKind, ObjectStoreError, TagInfo,
    Tree, TreeChange, TreeEntry,
};

/// Size of the chunks blob content is split into.
pub const BLOB_CHUNK_SIZE: usize = 64 * 1024;

/// git2-based implementation of `ObjectStoreBackend`.
#[derive(Debug, Clone, Default)]
pub struct Git2Backend;

impl Git2Backend {
    /// Create a new git2 backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ObjectStoreBackend for Git2Backend {
    fn open(&self, path: &Path) -> Result<Box<dyn ObjectStore>, ObjectStoreError> {
        Ok(Box::new(Git2ObjectStore::open(path)?))
    }
}

/// git2-based implementation of `ObjectStore`.
///
/// `git2::Repository` is not `Sync`, so access is serialized through a mutex.
/// Separate stores (separate repositories) never contend with each other.
pub struct Git2ObjectStore {
    repo: Mutex<Repository>,
}

impl Git2ObjectStore {
    /// Open the repository at `path` (bare or with a working copy).
    ///
    /// # Errors
    ///
    /// Returns `ObjectStoreError::RepoNotFound` if no repository exists at the path.
    pub fn open(path: &Path) -> Result<Self, ObjectStoreError> {
        let repo = Repository::open(path).map_err(|e| ObjectStoreError::RepoNotFound {
            path: format!("{}: {e}", path.display()),
        })?;
        log::debug!("opened git repository at {}", path.display());
        Ok(Self {
            repo: Mutex::new(repo),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Repository> {
        // Objects are immutable; a panic in another reader leaves nothing half-written.
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn to_id(oid: Oid) -> ObjectId {
        ObjectId::from_raw(oid.as_bytes())
    }

    fn to_oid(id: &ObjectId) -> Result<Oid, ObjectStoreError> {
        Oid::from_str(id.as_str()).map_err(|_| ObjectStoreError::InvalidObjectId {
            id: id.to_string(),
        })
    }

    fn find_tree<'r>(
        repo: &'r Repository,
        id: &ObjectId,
    ) -> Result<git2::Tree<'r>, ObjectStoreError> {
        repo.find_tree(Self::to_oid(id)?).map_err(git_error)
    }

    fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
        let author = commit.author();
        CommitInfo {
            id: Self::to_id(commit.id()),
            author: format!(
                "{} <{}>",
                String::from_utf8_lossy(author.name_bytes()),
                String::from_utf8_lossy(author.email_bytes())
            ),
            timestamp: commit.time().seconds(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            tree_id: Self::to_id(commit.tree_id()),
            parent_ids: commit.parent_ids().map(Self::to_id).collect(),
        }
    }

    fn tree_to_model(tree: &git2::Tree<'_>) -> Tree {
        Tree {
            id: Self::to_id(tree.id()),
            entries: tree
                .iter()
                .map(|entry| TreeEntry {
                    name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                    mode: u32::try_from(entry.filemode()).unwrap_or_default(),
                    id: Self::to_id(entry.id()),
                })
                .collect(),
        }
    }

    fn tag_to_info(tag: &git2::Tag<'_>) -> TagInfo {
        TagInfo {
            id: Self::to_id(tag.id()),
            name: String::from_utf8_lossy(tag.name_bytes()).into_owned(),
            target_id: Self::to_id(tag.target_id()),
            target_kind: tag
                .target_type()
                .and_then(object_kind)
                .unwrap_or(ObjectKind::Commit),
            tagger_time: tag.tagger().map(|sig| sig.when().seconds()),
            message: tag
                .message_bytes()
                .map(|m| String::from_utf8_lossy(m).into_owned())
                .unwrap_or_default(),
        }
    }
}

const fn object_kind(kind: ObjectType) -> Option<ObjectKind> {
    match kind {
        ObjectType::Commit => Some(ObjectKind::Commit),
        ObjectType::Tree => Some(ObjectKind::Tree),
        ObjectType::Blob => Some(ObjectKind::Blob),
        ObjectType::Tag => Some(ObjectKind::Tag),
        ObjectType::Any => None,
    }
}

fn git_error(err: git2::Error) -> ObjectStoreError {
    ObjectStoreError::Git {
        message: err.message().to_string(),
    }
}

/// Lookups that fail because the object or name simply does not exist.
fn is_missing(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec)
}

impl ObjectStore for Git2ObjectStore {
    fn find_object(&self, id: &ObjectId) -> Result<Option<Object>, ObjectStoreError> {
        let Ok(oid) = Oid::from_str(id.as_str()) else {
            return Ok(None);
        };
        let repo = self.lock();

        let object = match repo.find_object(oid, None) {
            Ok(object) => object,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(git_error(e)),
        };

        let converted = match object.kind() {
            Some(ObjectType::Commit) => object
                .as_commit()
                .map(|commit| Object::Commit(Self::commit_to_info(commit))),
            Some(ObjectType::Tree) => object
                .as_tree()
                .map(|tree| Object::Tree(Self::tree_to_model(tree))),
            Some(ObjectType::Blob) => object.as_blob().map(|blob| {
                Object::Blob(BlobInfo {
                    id: id.clone(),
                    size: blob.size() as u64,
                })
            }),
            Some(ObjectType::Tag) => object.as_tag().map(|tag| Object::Tag(Self::tag_to_info(tag))),
            Some(ObjectType::Any) | None => None,
        };

        Ok(converted)
    }

    fn find_reference(&self, name: &str) -> Result<Option<ObjectId>, ObjectStoreError> {
        // libgit2 refuses interior NULs before it looks anything up.
        if name.contains('\0') {
            log::trace!("reference name {name:?} contains a NUL byte");
            return Ok(None);
        }
        let repo = self.lock();

        let reference = match repo.find_reference(name) {
            Ok(reference) => reference,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(git_error(e)),
        };

        match reference.resolve() {
            Ok(resolved) => Ok(resolved.target().map(Self::to_id)),
            Err(e) if is_missing(&e) => {
                log::debug!("reference {name} is dangling: {e}");
                Ok(None)
            }
            Err(e) => Err(git_error(e)),
        }
    }

    fn references(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>, ObjectStoreError> {
        let repo = self.lock();
        let mut refs = Vec::new();

        for reference in repo.references().map_err(git_error)? {
            let reference = reference.map_err(git_error)?;
            let Some(name) = reference.name().map(str::to_string) else {
                log::trace!("skipping reference with non UTF-8 name");
                continue;
            };
            if !name.starts_with(prefix) {
                continue;
            }
            match reference.resolve() {
                Ok(resolved) => {
                    if let Some(target) = resolved.target() {
                        refs.push((name, Self::to_id(target)));
                    }
                }
                Err(e) => log::warn!("skipping unresolvable reference {name}: {e}"),
            }
        }

        Ok(refs)
    }

    fn tree_changes(
        &self,
        old_tree: Option<&ObjectId>,
        new_tree: Option<&ObjectId>,
    ) -> Result<Vec<TreeChange>, ObjectStoreError> {
        let repo = self.lock();
        let old = old_tree
            .map(|id| Self::find_tree(&repo, id))
            .transpose()?;
        let new = new_tree
            .map(|id| Self::find_tree(&repo, id))
            .transpose()?;

        let diff = repo
            .diff_tree_to_tree(old.as_ref(), new.as_ref(), None)
            .map_err(git_error)?;

        let changes = diff
            .deltas()
            .map(|delta| {
                let (has_old, has_new) = match delta.status() {
                    Delta::Added => (false, true),
                    Delta::Deleted => (true, false),
                    _ => (true, true),
                };
                let old_file = delta.old_file();
                let new_file = delta.new_file();

                TreeChange {
                    old_path: has_old
                        .then(|| old_file.path_bytes())
                        .flatten()
                        .map(|p| String::from_utf8_lossy(p).into_owned()),
                    new_path: has_new
                        .then(|| new_file.path_bytes())
                        .flatten()
                        .map(|p| String::from_utf8_lossy(p).into_owned()),
                    old_mode: has_old.then(|| u32::from(old_file.mode())),
                    new_mode: has_new.then(|| u32::from(new_file.mode())),
                    old_id: has_old.then(|| Self::to_id(old_file.id())),
                    new_id: has_new.then(|| Self::to_id(new_file.id())),
                }
            })
            .collect();

        Ok(changes)
    }

    fn blob_content(&self, id: &ObjectId) -> Result<Option<BlobContent>, ObjectStoreError> {
        let Ok(oid) = Oid::from_str(id.as_str()) else {
            return Ok(None);
        };
        let repo = self.lock();

        match repo.find_blob(oid) {
            Ok(blob) => Ok(Some(BlobContent::from_bytes(blob.content(), BLOB_CHUNK_SIZE))),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(git_error(e)),
        }
    }

    fn description(&self) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        let path = self.lock().path().join("description");
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
