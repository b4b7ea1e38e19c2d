//! Line-based hunk computation.

use repobrowse_diff_models::{DiffLine, Hunk, LineTag};
use similar::{ChangeTag, DiffOp, TextDiff};

/// Context lines kept around each change, as in `git diff`.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Compute the hunks turning `old` into `new`.
///
/// Identical inputs (including two empty texts) produce no hunks.
#[must_use]
pub fn compute_hunks(old: &str, new: &str, context: usize) -> Vec<Hunk> {
    let diff = TextDiff::from_lines(old, new);
    diff.grouped_ops(context)
        .iter()
        .filter_map(|group| build_hunk(&diff, group))
        .collect()
}

fn build_hunk(diff: &TextDiff<'_, '_, '_, str>, ops: &[DiffOp]) -> Option<Hunk> {
    let first = ops.first()?;
    let last = ops.last()?;
    let old_range = first.old_range().start..last.old_range().end;
    let new_range = first.new_range().start..last.new_range().end;

    let lines = ops
        .iter()
        .flat_map(|op| diff.iter_changes(op))
        .map(|change| {
            let tag = match change.tag() {
                ChangeTag::Equal => LineTag::Context,
                ChangeTag::Delete => LineTag::Removed,
                ChangeTag::Insert => LineTag::Added,
            };
            let value = change.value();
            let (text, crlf) = match value.strip_suffix("\r\n") {
                Some(text) => (text, true),
                None => (value.strip_suffix('\n').unwrap_or(value), false),
            };
            DiffLine {
                tag,
                old_line_number: change.old_index().map(line_number),
                new_line_number: change.new_index().map(line_number),
                text: text.to_string(),
                crlf,
                no_newline: change.missing_newline(),
            }
        })
        .collect();

    Some(Hunk {
        old_start: range_start(&old_range),
        old_lines: old_range.len() as u64,
        new_start: range_start(&new_range),
        new_lines: new_range.len() as u64,
        lines,
    })
}

const fn line_number(index: usize) -> u64 {
    index as u64 + 1
}

/// Unified diff start line: 1-based, or the preceding line for empty ranges.
const fn range_start(range: &std::ops::Range<usize>) -> u64 {
    if range.start == range.end {
        range.start as u64
    } else {
        line_number(range.start)
    }
}
