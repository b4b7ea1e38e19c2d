mod helpers;

use helpers::{id, ids, open};
use repobrowse_diff::render_patch;
use repobrowse_repo::{ChangeKind, LineTag};
use repobrowse_testing::TestRepo;

#[test_log::test]
fn test_two_commit_example() {
    let repo = TestRepo::new();
    let c1 = repo.commit("C1").at(100).file("a.txt", "x").create();
    let c2 = repo.commit("C2").at(200).file("a.txt", "y").create();
    let browser = open(&repo);

    let history = browser.history("master", None, None, 0).unwrap();
    assert_eq!(ids(&history), vec![id(c2), id(c1)]);

    let changes = history[0].diff().unwrap();
    assert_eq!(changes.len(), 1);
    let change = &changes[0];
    assert_eq!(change.path(), "a.txt");
    assert_eq!(change.kind(), ChangeKind::Modified);
    assert!(!change.is_binary);
    assert_eq!(change.hunks.len(), 1);

    let lines: Vec<_> = change.hunks[0]
        .lines
        .iter()
        .map(|line| (line.tag, line.text.as_str()))
        .collect();
    assert_eq!(lines, vec![(LineTag::Removed, "x"), (LineTag::Added, "y")]);
}

#[test_log::test]
fn test_root_commit_diff_is_all_additions() {
    let repo = TestRepo::new();
    repo.commit("Root")
        .at(100)
        .file("a.txt", "a\n")
        .file("dir/b.txt", "b1\nb2\n")
        .create();
    let browser = open(&repo);
    let root = browser.resolve("master").unwrap();

    let changes = browser.diff(&root).unwrap();
    let paths: Vec<_> = changes.iter().map(|change| change.path()).collect();
    assert_eq!(paths, vec!["a.txt", "dir/b.txt"]);
    for change in &changes {
        assert_eq!(change.kind(), ChangeKind::Added);
        assert_eq!(change.old_filename(), "/dev/null");
        assert_eq!(change.deletions(), 0);
    }
    assert_eq!(changes[1].additions(), 2);
}

#[test_log::test]
fn test_nul_byte_is_binary() {
    let repo = TestRepo::new();
    repo.commit("Text").at(100).file("data", "plain text\n").create();
    repo.commit("Binary")
        .at(200)
        .file("data", b"plain text\n\0more text\n")
        .create();
    let browser = open(&repo);
    let head = browser.resolve("master").unwrap();

    let changes = head.diff().unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes[0].is_binary);
    assert!(changes[0].hunks.is_empty());
    assert!(render_patch(&changes[0]).contains("Binary files a/data and b/data differ"));
}

#[test_log::test]
fn test_empty_file_changes_are_kept() {
    let repo = TestRepo::new();
    repo.commit("Add empty")
        .at(100)
        .file("keep.txt", "keep\n")
        .file("empty", "")
        .create();
    repo.commit("Remove empty").at(200).remove("empty").create();
    let browser = open(&repo);

    let history = browser.history("master", None, None, 0).unwrap();
    let removal = history[0].diff().unwrap();
    assert_eq!(removal.len(), 1);
    assert_eq!(removal[0].kind(), ChangeKind::Deleted);
    assert_eq!(removal[0].new_filename(), "/dev/null");
    assert!(!removal[0].is_binary);
    assert!(removal[0].hunks.is_empty());

    let addition = history[1].diff().unwrap();
    let empty = addition
        .iter()
        .find(|change| change.path() == "empty")
        .unwrap();
    assert_eq!(empty.kind(), ChangeKind::Added);
    assert!(!empty.is_binary);
    assert!(empty.hunks.is_empty());
}

#[test_log::test]
fn test_submodule_changes_render_as_text() {
    let repo = TestRepo::new();
    let first = repo
        .commit("Lib v1")
        .at(10)
        .on("refs/heads/lib")
        .file("lib.txt", "1")
        .create();
    let second = repo
        .commit("Lib v2")
        .at(20)
        .on("refs/heads/lib")
        .file("lib.txt", "2")
        .create();
    repo.commit("Add submodule")
        .at(100)
        .submodule("vendor/lib", first)
        .create();
    repo.commit("Bump submodule")
        .at(200)
        .submodule("vendor/lib", second)
        .create();
    let browser = open(&repo);

    let history = browser.history("master", None, None, 0).unwrap();
    let bump = history[0].diff().unwrap();
    assert_eq!(bump.len(), 1);
    assert!(!bump[0].is_binary);
    let lines: Vec<_> = bump[0].hunks[0]
        .lines
        .iter()
        .map(|line| (line.tag, line.text.clone()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (LineTag::Removed, format!("Subproject commit {first}")),
            (LineTag::Added, format!("Subproject commit {second}")),
        ]
    );

    let added = history[1].diff().unwrap();
    assert_eq!(added[0].kind(), ChangeKind::Added);
    assert_eq!(added[0].hunks.len(), 1);
}

#[test_log::test]
fn test_rendered_patch_for_commit() {
    let repo = TestRepo::new();
    repo.commit("C1").at(100).file("a.txt", "x\n").create();
    repo.commit("C2").at(200).file("a.txt", "y\n").create();
    let browser = open(&repo);
    let head = browser.resolve("master").unwrap();

    let patch = render_patch(&head.diff().unwrap()[0]);
    assert_eq!(
        patch,
        "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1 +1 @@\n-x\n+y\n"
    );
}
