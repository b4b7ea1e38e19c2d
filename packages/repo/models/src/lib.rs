#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Repository browsing models for `repobrowse`.
//!
//! This crate defines the error taxonomy of the browsing engine and the
//! value types it hands to presentation layers.

use repobrowse_object_store_models::{BlobInfo, ObjectStoreError, Tree};
use serde::{Deserialize, Serialize};

/// Default size limit above which blobs are not rendered as text (100 KiB).
pub const DEFAULT_MAX_TEXT_SIZE: u64 = 100 * 1024;

/// Errors from repository browsing operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A revision did not resolve to a commit.
    #[error("Revision not found: {revision}")]
    RevisionNotFound {
        /// The revision as given by the caller.
        revision: String,
    },

    /// A path does not exist in the tree of a commit.
    #[error("Path not found: {path}")]
    PathNotFound {
        /// The requested path.
        path: String,
    },

    /// No registered repository has the requested name.
    #[error("Repository not found: {name}")]
    RepositoryNotFound {
        /// The requested repository name.
        name: String,
    },

    /// Blob content could not be decoded into text.
    #[error("Encoding error: {message}")]
    Encoding {
        /// Description of the failed UTF-8 decode.
        message: String,
    },

    /// The repository has no branches to fall back on.
    #[error("Repository has no branches")]
    EmptyRepository,

    /// The path names a directory where a file was required.
    #[error("Not a file: {path}")]
    NotAFile {
        /// The requested path.
        path: String,
    },

    /// The path names a file where a directory was required.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The requested path.
        path: String,
    },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The operation ran past the caller's deadline.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Failure reported by the object store.
    #[error(transparent)]
    Store(#[from] ObjectStoreError),
}

/// Object found at a path inside a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOrBlob {
    Tree(Tree),
    Blob(BlobInfo),
}

impl TreeOrBlob {
    #[must_use]
    pub const fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    #[must_use]
    pub const fn is_blob(&self) -> bool {
        matches!(self, Self::Blob(_))
    }
}

/// Entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Display name (`..` for the parent link).
    pub name: String,
    /// Full slash separated path from the repository root.
    pub path: String,
}

/// Contents of one directory, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Sub-directories, preceded by `..` unless listing the root.
    pub dirs: Vec<ListingEntry>,
    pub files: Vec<ListingEntry>,
}

/// How a blob should be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlobView {
    /// Content contains NUL bytes.
    Binary {
        /// File extension suggests an image format.
        is_image: bool,
    },
    /// Content is larger than [`BlobViewOptions::max_text_size`].
    TooLarge {
        /// Blob size in bytes.
        size: u64,
    },
    /// Decoded text content.
    Text {
        text: String,
    },
}

/// Thresholds for [`BlobView`] classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobViewOptions {
    /// Largest blob, in bytes, that is rendered as text.
    pub max_text_size: u64,
}

impl BlobViewOptions {
    #[must_use]
    pub const fn with_max_text_size(mut self, max_text_size: u64) -> Self {
        self.max_text_size = max_text_size;
        self
    }
}

impl Default for BlobViewOptions {
    fn default() -> Self {
        Self {
            max_text_size: DEFAULT_MAX_TEXT_SIZE,
        }
    }
}
