#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared diff models for `repobrowse`.
//!
//! A commit diff is a list of [`Change`]s, one per touched file. Textual
//! changes carry [`Hunk`]s; binary changes carry none.

use repobrowse_object_store_models::ObjectId;
use serde::{Deserialize, Serialize};

/// Filename shown for the missing side of an addition or deletion.
pub const NULL_DEVICE: &str = "/dev/null";

/// Role of a line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTag {
    /// Unchanged line shown for context.
    Context,
    /// Line present only in the new file.
    Added,
    /// Line present only in the old file.
    Removed,
}

impl LineTag {
    /// The unified diff prefix character.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Added => '+',
            Self::Removed => '-',
        }
    }
}

/// A single line of a hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub tag: LineTag,
    /// 1-based line number in the old file (None for added lines).
    pub old_line_number: Option<u64>,
    /// 1-based line number in the new file (None for removed lines).
    pub new_line_number: Option<u64>,
    /// Line text without its line terminator.
    pub text: String,
    /// The line was terminated by `\r\n` rather than `\n`.
    #[serde(default)]
    pub crlf: bool,
    /// The line is the last one of its file and has no trailing newline.
    pub no_newline: bool,
}

/// A contiguous diff region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: u64,
    pub old_lines: u64,
    pub new_start: u64,
    pub new_lines: u64,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// The `@@ -a,b +c,d @@` header line, omitting counts equal to one.
    #[must_use]
    pub fn header(&self) -> String {
        fn range(start: u64, count: u64) -> String {
            if count == 1 {
                start.to_string()
            } else {
                format!("{start},{count}")
            }
        }
        format!(
            "@@ -{} +{} @@",
            range(self.old_start, self.old_lines),
            range(self.new_start, self.new_lines)
        )
    }
}

/// Classification of a change by which sides are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Renamed,
}

/// One file-level delta between two trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Path in the old tree (None for added files).
    pub old_path: Option<String>,
    /// Path in the new tree (None for deleted files).
    pub new_path: Option<String>,
    pub old_mode: Option<u32>,
    pub new_mode: Option<u32>,
    pub old_id: Option<ObjectId>,
    pub new_id: Option<ObjectId>,
    /// Either side contains binary content.
    pub is_binary: bool,
    /// Hunks of a textual change. Always empty for binary changes, and empty
    /// for additions or deletions of empty files.
    pub hunks: Vec<Hunk>,
}

impl Change {
    /// Old filename, or [`NULL_DEVICE`] for additions.
    #[must_use]
    pub fn old_filename(&self) -> &str {
        self.old_path.as_deref().unwrap_or(NULL_DEVICE)
    }

    /// New filename, or [`NULL_DEVICE`] for deletions.
    #[must_use]
    pub fn new_filename(&self) -> &str {
        self.new_path.as_deref().unwrap_or(NULL_DEVICE)
    }

    /// The path to label the change with: new path if present, else the old one.
    #[must_use]
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or(NULL_DEVICE)
    }

    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match (&self.old_path, &self.new_path) {
            (None, _) => ChangeKind::Added,
            (_, None) => ChangeKind::Deleted,
            (Some(old), Some(new)) if old != new => ChangeKind::Renamed,
            _ => ChangeKind::Modified,
        }
    }

    /// Number of added lines across all hunks.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.count_lines(LineTag::Added)
    }

    /// Number of removed lines across all hunks.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.count_lines(LineTag::Removed)
    }

    fn count_lines(&self, tag: LineTag) -> usize {
        self.hunks
            .iter()
            .flat_map(|hunk| &hunk.lines)
            .filter(|line| line.tag == tag)
            .count()
    }
}
