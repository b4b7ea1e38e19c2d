#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Object model types for `repobrowse` object stores.
//!
//! This crate defines the values returned by object store operations,
//! abstracting over the specific storage implementation (git2, mock, etc.).
//! Every value here is an owned snapshot of an immutable, content-addressed
//! object.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mask selecting the object type bits of a tree entry mode.
pub const MODE_TYPE_MASK: u32 = 0o170_000;

/// Directory bit of a tree entry mode.
pub const MODE_DIRECTORY_BIT: u32 = 0o040_000;

/// Mode of a submodule (gitlink) entry.
pub const MODE_GITLINK: u32 = 0o160_000;

/// Number of hex characters kept by [`ObjectId::short`].
pub const SHORT_ID_LEN: usize = 10;

/// Hex-encoded identifier of a content-addressed object.
///
/// Always lowercase. Both SHA-1 (40 characters) and SHA-256 (64 characters)
/// object formats are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Build an id from the raw bytes of a hash.
    #[must_use]
    pub fn from_raw(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Whether `s` is a full hexadecimal object id.
    #[must_use]
    pub fn is_full_hex(s: &str) -> bool {
        matches!(s.len(), 40 | 64) && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// The full hex representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used for display.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(SHORT_ID_LEN)]
    }
}

impl FromStr for ObjectId {
    type Err = ObjectStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_full_hex(s) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(ObjectStoreError::InvalidObjectId { id: s.to_string() })
        }
    }
}

impl TryFrom<String> for ObjectId {
    type Error = ObjectStoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Commit object.
    Commit,
    /// Tree (directory) object.
    Tree,
    /// Blob (file content) object.
    Blob,
    /// Annotated tag object.
    Tag,
}

/// A commit as stored, without any derived properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Id of the commit.
    pub id: ObjectId,
    /// Raw author string, usually `Name <email>`.
    pub author: String,
    /// Commit (committer) time in seconds since the epoch, UTC.
    pub timestamp: i64,
    /// Full commit message.
    pub message: String,
    /// Root tree of the commit.
    pub tree_id: ObjectId,
    /// Parent commit ids, first parent first.
    pub parent_ids: Vec<ObjectId>,
}

/// A single named entry of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Entry name (one path segment).
    pub name: String,
    /// Unix-style mode bits.
    pub mode: u32,
    /// Object the entry references.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Returns `true` if the directory bit of the mode is set.
    ///
    /// Submodule entries carry the directory bit too.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.mode & MODE_DIRECTORY_BIT != 0
    }

    /// Returns `true` if this entry is a submodule commit reference.
    #[must_use]
    pub const fn is_submodule(&self) -> bool {
        self.mode & MODE_TYPE_MASK == MODE_GITLINK
    }
}

/// A directory listing object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Id of the tree.
    pub id: ObjectId,
    /// Entries in storage order.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Look up a direct child by name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// A blob object reference; the content is fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    /// Id of the blob.
    pub id: ObjectId,
    /// Size of the blob in bytes.
    pub size: u64,
}

/// An annotated tag object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    /// Id of the tag object itself.
    pub id: ObjectId,
    /// Tag name as recorded in the object.
    pub name: String,
    /// Object the tag points to.
    pub target_id: ObjectId,
    /// Kind of the object the tag points to.
    pub target_kind: ObjectKind,
    /// Tagger time in seconds since the epoch, if the tag records a tagger.
    pub tagger_time: Option<i64>,
    /// Tag message.
    pub message: String,
}

/// Any object that can be looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Object {
    /// A commit.
    Commit(CommitInfo),
    /// A tree.
    Tree(Tree),
    /// A blob.
    Blob(BlobInfo),
    /// An annotated tag.
    Tag(TagInfo),
}

impl Object {
    /// Id of the wrapped object.
    #[must_use]
    pub const fn id(&self) -> &ObjectId {
        match self {
            Self::Commit(commit) => &commit.id,
            Self::Tree(tree) => &tree.id,
            Self::Blob(blob) => &blob.id,
            Self::Tag(tag) => &tag.id,
        }
    }

    /// Kind of the wrapped object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }
}

/// Raw blob bytes, split into chunks as the store produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobContent {
    chunks: Vec<Vec<u8>>,
}

impl BlobContent {
    /// Wrap already chunked content.
    #[must_use]
    pub const fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self { chunks }
    }

    /// Split `bytes` into chunks of at most `chunk_size` bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], chunk_size: usize) -> Self {
        Self {
            chunks: bytes
                .chunks(chunk_size.max(1))
                .map(<[u8]>::to_vec)
                .collect(),
        }
    }

    /// The chunks in order.
    #[must_use]
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Total size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the blob has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(Vec::is_empty)
    }

    /// Returns `true` if any chunk contains a NUL byte.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.chunks.iter().any(|chunk| chunk.contains(&0))
    }

    /// Concatenate all chunks.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// One file-level change reported by a structural tree diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeChange {
    /// Path in the old tree (None for additions).
    pub old_path: Option<String>,
    /// Path in the new tree (None for deletions).
    pub new_path: Option<String>,
    /// Mode in the old tree.
    pub old_mode: Option<u32>,
    /// Mode in the new tree.
    pub new_mode: Option<u32>,
    /// Object id in the old tree.
    pub old_id: Option<ObjectId>,
    /// Object id in the new tree.
    pub new_id: Option<ObjectId>,
}

/// Errors from object store operations.
///
/// A missing object or reference is not an error; lookups report it as `None`.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    /// Repository not found at the specified path.
    #[error("Repository not found at {path}")]
    RepoNotFound {
        /// The path that was opened.
        path: String,
    },

    /// String is not a valid object id.
    #[error("Invalid object id: {id}")]
    InvalidObjectId {
        /// The rejected input.
        id: String,
    },

    /// General storage operation error.
    #[error("Object store operation failed: {message}")]
    Git {
        /// Error message from the underlying implementation.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Error message.
        message: String,
    },
}

impl From<std::io::Error> for ObjectStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA1: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";

    #[test]
    fn test_parse_object_id() {
        let id: ObjectId = SHA1.to_uppercase().parse().unwrap();
        assert_eq!(id.as_str(), SHA1);
        assert_eq!(id.short(), "3b18e512db");
    }

    #[test]
    fn test_parse_invalid_object_id() {
        assert!("master".parse::<ObjectId>().is_err());
        assert!("3b18e51".parse::<ObjectId>().is_err());
        assert!(SHA1.replace('b', "z").parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_from_raw() {
        let id = ObjectId::from_raw(&[0x00, 0xab, 0x10]);
        assert_eq!(id.as_str(), "00ab10");
    }

    #[test]
    fn test_object_id_serde_validates() {
        let json = format!("\"{SHA1}\"");
        let id: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), json);
        assert!(serde_json::from_str::<ObjectId>("\"not-a-sha\"").is_err());
    }

    #[test]
    fn test_tree_entry_modes() {
        let id: ObjectId = SHA1.parse().unwrap();
        let dir = TreeEntry {
            name: "src".to_string(),
            mode: 0o040_000,
            id: id.clone(),
        };
        let file = TreeEntry {
            name: "a.txt".to_string(),
            mode: 0o100_644,
            id: id.clone(),
        };
        let submodule = TreeEntry {
            name: "vendor".to_string(),
            mode: 0o160_000,
            id,
        };
        assert!(dir.is_dir());
        assert!(!dir.is_submodule());
        assert!(!file.is_dir());
        assert!(submodule.is_dir());
        assert!(submodule.is_submodule());
    }

    #[test]
    fn test_blob_content_binary_detection() {
        let text = BlobContent::from_bytes(b"hello\nworld\n", 4);
        assert_eq!(text.chunks().len(), 3);
        assert_eq!(text.len(), 12);
        assert!(!text.is_binary());

        let binary = BlobContent::from_bytes(b"abc\0def", 2);
        assert!(binary.is_binary());

        let empty = BlobContent::default();
        assert!(empty.is_empty());
        assert!(!empty.is_binary());
    }
}
