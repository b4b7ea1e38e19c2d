#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Read-only repository browsing for `repobrowse`.
//!
//! A [`Repository`] wraps an `ObjectStore` and answers the questions a
//! repository browser asks: which commit a revision names, what lives at a
//! path, which commits touched a path, and what a commit changed. Every
//! call re-reads references from the store; nothing is cached.

mod blob;
mod commit;
pub mod diff;
pub mod history;
pub mod refs;
mod repository;
pub mod tree;

pub use blob::guess_is_image;
pub use commit::Commit;
pub use history::{CancelToken, HistoryPage, HistoryQuery, PageWindow, page_window};
pub use refs::DEFAULT_BRANCH_CANDIDATES;
pub use repobrowse_diff_models::{Change, ChangeKind, DiffLine, Hunk, LineTag};
pub use repobrowse_object_store::{BlobContent, BlobInfo, CommitInfo, ObjectId, Tree, TreeEntry};
pub use repobrowse_repo_models::*;
pub use repository::{Repository, derive_name};
pub use tree::{parent_directory, subpaths};
