//! File content access.

use std::path::Path;

use repobrowse_diff::decode_text;
use repobrowse_object_store::BlobContent;
use repobrowse_repo_models::{BlobView, BlobViewOptions, RepoError};

use crate::repository::encoding_error;
use crate::{Commit, Repository};

const IMAGE_EXTENSIONS: [&str; 11] = [
    "avif", "bmp", "gif", "ico", "jpeg", "jpg", "png", "svg", "tif", "tiff", "webp",
];

impl Repository {
    /// Raw content of the file at `path`.
    ///
    /// # Errors
    ///
    /// * `RepoError::PathNotFound` - nothing exists at `path`
    /// * `RepoError::NotAFile` - `path` is a directory
    /// * `RepoError::Store` - the object store failed
    pub fn raw_blob(&self, commit: &Commit<'_>, path: &str) -> Result<BlobContent, RepoError> {
        let blob = self.resolve_blob(commit, path)?;
        self.store()
            .blob_content(&blob.id)?
            .ok_or_else(|| RepoError::PathNotFound {
                path: path.to_string(),
            })
    }

    /// Classify and, when it is small enough text, decode the file at `path`.
    ///
    /// # Errors
    ///
    /// * `RepoError::Encoding` - the text could not be decoded
    /// * any error of [`Repository::raw_blob`]
    pub fn blob_view(
        &self,
        commit: &Commit<'_>,
        path: &str,
        options: &BlobViewOptions,
    ) -> Result<BlobView, RepoError> {
        let content = self.raw_blob(commit, path)?;
        let size = content.len() as u64;

        if content.is_binary() {
            return Ok(BlobView::Binary {
                is_image: guess_is_image(path),
            });
        }
        if size > options.max_text_size {
            return Ok(BlobView::TooLarge { size });
        }
        let text = decode_text(&content.into_bytes()).map_err(encoding_error)?;
        Ok(BlobView::Text { text })
    }
}

/// Whether the extension of `filename` names a common image format.
#[must_use]
pub fn guess_is_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|image| ext.eq_ignore_ascii_case(image))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_is_image() {
        assert!(guess_is_image("logo.png"));
        assert!(guess_is_image("docs/Photo.JPG"));
        assert!(!guess_is_image("main.rs"));
        assert!(!guess_is_image("png"));
    }
}
