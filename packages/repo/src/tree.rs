//! Path lookup and directory listings.

use std::borrow::Cow;

use repobrowse_object_store::{BlobInfo, Object, Tree};
use repobrowse_repo_models::{DirectoryListing, ListingEntry, RepoError, TreeOrBlob};

use crate::{Commit, Repository};

impl Repository {
    /// Find the tree or blob at `path` in `commit`.
    ///
    /// Empty segments are ignored, so `""` and `"/"` name the root tree.
    ///
    /// # Errors
    ///
    /// * `RepoError::PathNotFound` - a segment is missing or a blob is
    ///   traversed as a directory
    /// * `RepoError::Store` - the object store failed
    pub fn resolve_path(&self, commit: &Commit<'_>, path: &str) -> Result<TreeOrBlob, RepoError> {
        let not_found = || RepoError::PathNotFound {
            path: path.to_string(),
        };

        let mut current = match self.store().find_object(commit.tree_id())? {
            Some(Object::Tree(tree)) => TreeOrBlob::Tree(tree),
            _ => return Err(not_found()),
        };
        for segment in segments(path) {
            let TreeOrBlob::Tree(tree) = &current else {
                log::debug!("cannot descend into blob at '{segment}' of '{path}'");
                return Err(not_found());
            };
            let entry = tree.entry(segment).ok_or_else(not_found)?;
            let object = self.store().find_object(&entry.id)?;
            current = match object {
                Some(Object::Tree(tree)) => TreeOrBlob::Tree(tree),
                Some(Object::Blob(blob)) => TreeOrBlob::Blob(blob),
                _ => return Err(not_found()),
            };
        }
        Ok(current)
    }

    /// Like [`Repository::resolve_path`], but requires a directory.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotADirectory` if `path` names a file.
    pub fn resolve_tree(&self, commit: &Commit<'_>, path: &str) -> Result<Tree, RepoError> {
        match self.resolve_path(commit, path)? {
            TreeOrBlob::Tree(tree) => Ok(tree),
            TreeOrBlob::Blob(_) => Err(RepoError::NotADirectory {
                path: path.to_string(),
            }),
        }
    }

    /// Like [`Repository::resolve_path`], but requires a file.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotAFile` if `path` names a directory.
    pub fn resolve_blob(&self, commit: &Commit<'_>, path: &str) -> Result<BlobInfo, RepoError> {
        match self.resolve_path(commit, path)? {
            TreeOrBlob::Blob(blob) => Ok(blob),
            TreeOrBlob::Tree(_) => Err(RepoError::NotAFile {
                path: path.to_string(),
            }),
        }
    }

    /// List the directory at `path`, where `resolved` is what `path` resolved
    /// to. When `resolved` is a blob its containing directory is listed.
    ///
    /// Directories and files are each sorted case-insensitively. Listings
    /// below the root start with a `..` entry for the parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the containing directory of a blob cannot be
    /// resolved.
    pub fn list_directory(
        &self,
        commit: &Commit<'_>,
        path: &str,
        resolved: &TreeOrBlob,
    ) -> Result<DirectoryListing, RepoError> {
        let path = normalize(path);
        let (directory, tree) = match resolved {
            TreeOrBlob::Tree(tree) => (path.as_str(), Cow::Borrowed(tree)),
            TreeOrBlob::Blob(_) => {
                let parent = parent_directory(&path);
                (parent, Cow::Owned(self.resolve_tree(commit, parent)?))
            }
        };

        let mut listing = DirectoryListing::default();
        for entry in &tree.entries {
            let item = ListingEntry {
                name: entry.name.clone(),
                path: join(directory, &entry.name),
            };
            if entry.is_dir() {
                listing.dirs.push(item);
            } else {
                listing.files.push(item);
            }
        }
        sort_entries(&mut listing.dirs);
        sort_entries(&mut listing.files);

        if !directory.is_empty() {
            listing.dirs.insert(
                0,
                ListingEntry {
                    name: "..".to_string(),
                    path: parent_directory(directory).to_string(),
                },
            );
        }
        Ok(listing)
    }
}

/// The directory containing `path`; empty for top-level entries.
#[must_use]
pub fn parent_directory(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Breadcrumb pairs of `(segment, path up to and including segment)`.
///
/// `"foo/bar"` yields `("foo", "foo")` and `("bar", "foo/bar")`.
#[must_use]
pub fn subpaths(path: &str) -> Vec<(String, String)> {
    let mut seen = Vec::new();
    segments(path)
        .map(|segment| {
            seen.push(segment);
            (segment.to_string(), seen.join("/"))
        })
        .collect()
}

pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

pub(crate) fn normalize(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

fn join(directory: &str, name: &str) -> String {
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{directory}/{name}")
    }
}

fn sort_entries(entries: &mut [ListingEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_directory() {
        assert_eq!(parent_directory("foo/bar/spam"), "foo/bar");
        assert_eq!(parent_directory("foo"), "");
        assert_eq!(parent_directory(""), "");
    }

    #[test]
    fn test_subpaths() {
        assert_eq!(
            subpaths("foo/bar/spam"),
            vec![
                ("foo".to_string(), "foo".to_string()),
                ("bar".to_string(), "foo/bar".to_string()),
                ("spam".to_string(), "foo/bar/spam".to_string()),
            ]
        );
        assert!(subpaths("").is_empty());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/a//b/"), "a/b");
        assert_eq!(normalize("/"), "");
    }

    #[test]
    fn test_sort_entries_case_insensitive() {
        let mut entries: Vec<ListingEntry> = ["b", "README", "a", "B"]
            .iter()
            .map(|name| ListingEntry {
                name: (*name).to_string(),
                path: (*name).to_string(),
            })
            .collect();
        sort_entries(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "B", "b", "README"]);
    }
}
