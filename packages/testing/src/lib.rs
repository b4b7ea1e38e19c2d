#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::multiple_crate_versions,
    clippy::cargo_common_metadata,
    clippy::missing_panics_doc
)]

//! Fixture builders for on-disk git repositories.
//!
//! Commits are assembled from in-memory trees rather than a working copy, so
//! the same builder works for bare repositories and for commits on branches
//! other than `HEAD`. Every commit carries an explicit timestamp to keep
//! ordering deterministic.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use git2::{ObjectType, Oid, Repository, RepositoryInitOptions, Signature, Time, TreeWalkMode};
use tempfile::TempDir;

/// Name used for the author and committer of every fixture commit.
pub const AUTHOR_NAME: &str = "Test User";

/// Email used for the author and committer of every fixture commit.
pub const AUTHOR_EMAIL: &str = "test@example.com";

/// Default description git writes into new repositories.
pub const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

const MODE_BLOB: i32 = 0o100_644;
const MODE_TREE: i32 = 0o040_000;
const MODE_GITLINK: i32 = 0o160_000;

type FlatTree = BTreeMap<String, (Oid, i32)>;

/// A git repository living in a temporary directory.
pub struct TestRepo {
    _dir: TempDir,
    path: PathBuf,
    repo: Repository,
}

impl TestRepo {
    /// Create a repository with a working copy whose `HEAD` is `master`.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("project");
        Self::init(dir, path, false)
    }

    /// Create a bare repository in a directory called `dir_name`.
    #[must_use]
    pub fn bare(dir_name: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join(dir_name);
        Self::init(dir, path, true)
    }

    fn init(dir: TempDir, path: PathBuf, bare: bool) -> Self {
        let mut opts = RepositoryInitOptions::new();
        opts.bare(bare).initial_head("master").mkpath(true);
        let repo = Repository::init_opts(&path, &opts).expect("failed to init repository");
        log::trace!("initialized test repository at {}", path.display());
        Self {
            _dir: dir,
            path,
            repo,
        }
    }

    /// Path the repository was created at (working copy root or bare directory).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying `git2` handle.
    #[must_use]
    pub const fn git(&self) -> &Repository {
        &self.repo
    }

    /// Start building a commit on `HEAD`.
    #[must_use]
    pub fn commit(&self, message: &str) -> CommitBuilder<'_> {
        CommitBuilder {
            repo: self,
            message: message.to_string(),
            time: 0,
            reference: "HEAD".to_string(),
            parents: None,
            edits: Vec::new(),
        }
    }

    /// Point `refs/heads/<name>` at `target`.
    pub fn branch(&self, name: &str, target: Oid) {
        self.repo
            .reference(&format!("refs/heads/{name}"), target, true, "test branch")
            .expect("failed to create branch");
    }

    /// Point `refs/tags/<name>` directly at `target`.
    pub fn lightweight_tag(&self, name: &str, target: Oid) {
        let object = self
            .repo
            .find_object(target, None)
            .expect("tag target missing");
        self.repo
            .tag_lightweight(name, &object, true)
            .expect("failed to create lightweight tag");
    }

    /// Create an annotated tag object for `target` and return its id.
    pub fn annotated_tag(&self, name: &str, target: Oid, time: i64) -> Oid {
        let object = self
            .repo
            .find_object(target, None)
            .expect("tag target missing");
        self.repo
            .tag(name, &object, &signature(time), &format!("Release {name}"), true)
            .expect("failed to create annotated tag")
    }

    /// Overwrite the repository description file.
    pub fn set_description(&self, text: &str) {
        fs::write(self.repo.path().join("description"), text).expect("failed to write description");
    }

    /// Remove the repository description file.
    pub fn remove_description(&self) {
        let path = self.repo.path().join("description");
        if path.exists() {
            fs::remove_file(path).expect("failed to remove description");
        }
    }

    fn flat_tree(&self, commit: Option<Oid>) -> FlatTree {
        let mut files = FlatTree::new();
        let Some(commit) = commit else {
            return files;
        };
        let tree = self
            .repo
            .find_commit(commit)
            .and_then(|c| c.tree())
            .expect("parent tree missing");
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if matches!(entry.kind(), Some(ObjectType::Blob | ObjectType::Commit)) {
                let name = String::from_utf8_lossy(entry.name_bytes());
                files.insert(format!("{root}{name}"), (entry.id(), entry.filemode()));
            }
            git2::TreeWalkResult::Ok
        })
        .expect("failed to walk tree");
        files
    }

    fn write_tree(&self, files: &FlatTree) -> Oid {
        let mut builder = self.repo.treebuilder(None).expect("treebuilder");
        let mut subdirs: BTreeMap<&str, FlatTree> = BTreeMap::new();
        for (path, (id, mode)) in files {
            match path.split_once('/') {
                Some((dir, rest)) => {
                    subdirs
                        .entry(dir)
                        .or_default()
                        .insert(rest.to_string(), (*id, *mode));
                }
                None => {
                    builder
                        .insert(path, *id, *mode)
                        .expect("failed to insert tree entry");
                }
            }
        }
        for (dir, sub) in subdirs {
            let id = self.write_tree(&sub);
            builder
                .insert(dir, id, MODE_TREE)
                .expect("failed to insert subtree");
        }
        builder.write().expect("failed to write tree")
    }

    fn tip(&self, reference: &str) -> Option<Oid> {
        self.repo
            .find_reference(reference)
            .ok()
            .and_then(|r| r.peel_to_commit().ok())
            .map(|c| c.id())
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

enum Edit {
    File(String, Vec<u8>),
    Submodule(String, Oid),
    Remove(String),
}

/// Builder for a single fixture commit.
///
/// The new tree starts from the first parent's tree; `file`, `submodule`
/// and `remove` are applied on top of it.
pub struct CommitBuilder<'a> {
    repo: &'a TestRepo,
    message: String,
    time: i64,
    reference: String,
    parents: Option<Vec<Oid>>,
    edits: Vec<Edit>,
}

impl CommitBuilder<'_> {
    /// Commit time in seconds since the epoch.
    #[must_use]
    pub const fn at(mut self, time: i64) -> Self {
        self.time = time;
        self
    }

    /// Reference to update (defaults to `HEAD`).
    #[must_use]
    pub fn on(mut self, reference: &str) -> Self {
        self.reference = reference.to_string();
        self
    }

    /// Explicit parents (defaults to the current tip of the reference).
    #[must_use]
    pub fn parents(mut self, parents: &[Oid]) -> Self {
        self.parents = Some(parents.to_vec());
        self
    }

    /// Write `content` at `path`.
    #[must_use]
    pub fn file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.edits
            .push(Edit::File(path.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Add a submodule entry at `path` pointing at `commit`.
    #[must_use]
    pub fn submodule(mut self, path: &str, commit: Oid) -> Self {
        self.edits.push(Edit::Submodule(path.to_string(), commit));
        self
    }

    /// Delete the file at `path`.
    #[must_use]
    pub fn remove(mut self, path: &str) -> Self {
        self.edits.push(Edit::Remove(path.to_string()));
        self
    }

    /// Write the commit and update the reference.
    pub fn create(self) -> Oid {
        let repo = self.repo;
        let parents = self
            .parents
            .unwrap_or_else(|| repo.tip(&self.reference).into_iter().collect());

        let mut files = repo.flat_tree(parents.first().copied());
        for edit in self.edits {
            match edit {
                Edit::File(path, content) => {
                    let id = repo.repo.blob(&content).expect("failed to write blob");
                    files.insert(path, (id, MODE_BLOB));
                }
                Edit::Submodule(path, commit) => {
                    files.insert(path, (commit, MODE_GITLINK));
                }
                Edit::Remove(path) => {
                    files.remove(&path);
                }
            }
        }

        let tree_id = repo.write_tree(&files);
        let tree = repo.repo.find_tree(tree_id).expect("tree missing");
        let parent_commits: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|id| repo.repo.find_commit(*id).expect("parent missing"))
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();
        let sig = signature(self.time);

        repo.repo
            .commit(
                Some(&self.reference),
                &sig,
                &sig,
                &self.message,
                &tree,
                &parent_refs,
            )
            .expect("failed to create commit")
    }
}

fn signature(time: i64) -> Signature<'static> {
    Signature::new(AUTHOR_NAME, AUTHOR_EMAIL, &Time::new(time, 0)).expect("invalid signature")
}
