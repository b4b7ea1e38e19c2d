//! Object store backend and repository traits.
//!
//! These traits abstract over storage implementations for testability and flexibility.

use std::path::Path;

use repobrowse_object_store_models::{
    BlobContent, Object, ObjectId, ObjectStoreError, TreeChange,
};

/// Factory trait for opening object stores.
pub trait ObjectStoreBackend: Send + Sync {
    /// Open the repository stored at the given path.
    ///
    /// Both bare repositories and working copies are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ObjectStoreError::RepoNotFound` if no repository exists at the path.
    fn open(&self, path: &Path) -> Result<Box<dyn ObjectStore>, ObjectStoreError>;
}

/// Read-only access to one repository's objects and references.
///
/// Objects are immutable and content-addressed. References are a mutable
/// namespace that may change between calls, so implementations must not cache
/// reference lookups.
pub trait ObjectStore: Send + Sync {
    /// Look up any object by id.
    ///
    /// Returns `Ok(None)` when the object does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn find_object(&self, id: &ObjectId) -> Result<Option<Object>, ObjectStoreError>;

    /// Resolve a full reference name (e.g. `refs/heads/master`, `HEAD`) to
    /// the id it points at, following symbolic references.
    ///
    /// Returns `Ok(None)` for unknown or malformed names.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference database cannot be read.
    fn find_reference(&self, name: &str) -> Result<Option<ObjectId>, ObjectStoreError>;

    /// Enumerate all references whose full name starts with `prefix`.
    ///
    /// Names are returned in full, in the store's enumeration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference database cannot be read.
    fn references(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>, ObjectStoreError>;

    /// Structural diff between two trees; `None` stands for the empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if either tree cannot be read.
    fn tree_changes(
        &self,
        old_tree: Option<&ObjectId>,
        new_tree: Option<&ObjectId>,
    ) -> Result<Vec<TreeChange>, ObjectStoreError>;

    /// Raw content of a blob, split into chunks.
    ///
    /// Returns `Ok(None)` if `id` does not name a blob in this store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn blob_content(&self, id: &ObjectId) -> Result<Option<BlobContent>, ObjectStoreError>;

    /// Raw contents of the repository description file, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    fn description(&self) -> Result<Option<Vec<u8>>, ObjectStoreError>;
}
