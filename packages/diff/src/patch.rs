//! Unified diff rendering of a [`Change`].

use std::fmt::{self, Write};

use repobrowse_diff_models::{Change, ChangeKind, NULL_DEVICE};

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Render `change` as a `git diff` style patch.
#[must_use]
pub fn render_patch(change: &Change) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_patch(&mut out, change);
    out
}

/// Write `change` as a `git diff` style patch into `out`.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
pub fn write_patch(out: &mut impl Write, change: &Change) -> fmt::Result {
    let old_name = prefixed("a/", change.old_path.as_deref());
    let new_name = prefixed("b/", change.new_path.as_deref());

    writeln!(
        out,
        "diff --git a/{} b/{}",
        change.old_path.as_deref().unwrap_or_else(|| change.path()),
        change.new_path.as_deref().unwrap_or_else(|| change.path())
    )?;

    match change.kind() {
        ChangeKind::Added => {
            if let Some(mode) = change.new_mode {
                writeln!(out, "new file mode {mode:06o}")?;
            }
        }
        ChangeKind::Deleted => {
            if let Some(mode) = change.old_mode {
                writeln!(out, "deleted file mode {mode:06o}")?;
            }
        }
        ChangeKind::Renamed => {
            writeln!(out, "rename from {}", change.old_filename())?;
            writeln!(out, "rename to {}", change.new_filename())?;
        }
        ChangeKind::Modified => {
            match (change.old_mode, change.new_mode) {
                (Some(old), Some(new)) if old != new => {
                    writeln!(out, "old mode {old:06o}")?;
                    writeln!(out, "new mode {new:06o}")?;
                }
                _ => {}
            }
        }
    }

    if change.is_binary {
        return writeln!(out, "Binary files {old_name} and {new_name} differ");
    }
    if change.hunks.is_empty() {
        return Ok(());
    }

    writeln!(out, "--- {old_name}")?;
    writeln!(out, "+++ {new_name}")?;
    for hunk in &change.hunks {
        writeln!(out, "{}", hunk.header())?;
        for line in &hunk.lines {
            write!(out, "{}{}", line.tag.prefix(), line.text)?;
            if line.crlf {
                out.write_char('\r')?;
            }
            writeln!(out)?;
            if line.no_newline {
                writeln!(out, "{NO_NEWLINE_MARKER}")?;
            }
        }
    }
    Ok(())
}

fn prefixed(prefix: &str, path: Option<&str>) -> String {
    path.map_or_else(|| NULL_DEVICE.to_string(), |path| format!("{prefix}{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_CONTEXT_LINES, compute_hunks};

    fn change(old: Option<(&str, &str)>, new: Option<(&str, &str)>) -> Change {
        Change {
            old_path: old.map(|(path, _)| path.to_string()),
            new_path: new.map(|(path, _)| path.to_string()),
            old_mode: old.map(|_| 0o100_644),
            new_mode: new.map(|_| 0o100_644),
            old_id: None,
            new_id: None,
            is_binary: false,
            hunks: compute_hunks(
                old.map_or("", |(_, text)| text),
                new.map_or("", |(_, text)| text),
                DEFAULT_CONTEXT_LINES,
            ),
        }
    }

    #[test]
    fn test_render_modification() {
        let patch = render_patch(&change(Some(("a.txt", "x\n")), Some(("a.txt", "y\n"))));
        assert_eq!(
            patch,
            "diff --git a/a.txt b/a.txt\n\
             --- a/a.txt\n\
             +++ b/a.txt\n\
             @@ -1 +1 @@\n\
             -x\n\
             +y\n"
        );
    }

    #[test]
    fn test_render_keeps_crlf_line_endings() {
        let patch = render_patch(&change(
            Some(("dos.txt", "x\r\n")),
            Some(("dos.txt", "y\r\n")),
        ));
        assert!(patch.ends_with("@@ -1 +1 @@\n-x\r\n+y\r\n"));
    }

    #[test]
    fn test_render_addition_without_newline() {
        let patch = render_patch(&change(None, Some(("new.txt", "hello"))));
        assert_eq!(
            patch,
            "diff --git a/new.txt b/new.txt\n\
             new file mode 100644\n\
             --- /dev/null\n\
             +++ b/new.txt\n\
             @@ -0,0 +1 @@\n\
             +hello\n\
             \\ No newline at end of file\n"
        );
    }

    #[test]
    fn test_render_empty_deletion_has_no_hunks() {
        let patch = render_patch(&change(Some(("empty", "")), None));
        assert_eq!(
            patch,
            "diff --git a/empty b/empty\ndeleted file mode 100644\n"
        );
    }

    #[test]
    fn test_render_binary() {
        let mut binary = change(Some(("img.bin", "")), Some(("img.bin", "")));
        binary.is_binary = true;
        assert_eq!(
            render_patch(&binary),
            "diff --git a/img.bin b/img.bin\n\
             Binary files a/img.bin and b/img.bin differ\n"
        );
    }

    #[test]
    fn test_render_mode_change() {
        let mut exec = change(Some(("run.sh", "echo\n")), Some(("run.sh", "echo\n")));
        exec.new_mode = Some(0o100_755);
        let patch = render_patch(&exec);
        assert!(patch.contains("old mode 100644\nnew mode 100755\n"));
    }
}
