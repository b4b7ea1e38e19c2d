mod helpers;

use std::path::Path;

use helpers::{id, open};
use repobrowse_repo::RepoError;
use repobrowse_testing::TestRepo;

#[test_log::test]
fn test_resolve_branch_tag_and_raw_id() {
    let repo = TestRepo::new();
    let first = repo.commit("First").at(100).file("a.txt", "1").create();
    let second = repo.commit("Second").at(200).file("a.txt", "2").create();
    repo.branch("feature", first);
    repo.lightweight_tag("v1", first);
    let browser = open(&repo);

    assert_eq!(browser.resolve("master").unwrap().id(), &id(second));
    assert_eq!(browser.resolve("feature").unwrap().id(), &id(first));
    assert_eq!(browser.resolve("v1").unwrap().id(), &id(first));
    assert_eq!(browser.resolve("HEAD").unwrap().id(), &id(second));
    assert_eq!(
        browser.resolve("refs/heads/feature").unwrap().id(),
        &id(first)
    );
    assert_eq!(
        browser.resolve(&first.to_string()).unwrap().id(),
        &id(first)
    );
}

#[test_log::test]
fn test_resolve_peels_annotated_tag_once() {
    let repo = TestRepo::new();
    let commit = repo.commit("Release").at(100).file("a.txt", "1").create();
    let tag = repo.annotated_tag("v1.0", commit, 150);
    let browser = open(&repo);

    assert_eq!(browser.resolve("v1.0").unwrap().id(), &id(commit));
    assert_eq!(browser.resolve(&tag.to_string()).unwrap().id(), &id(commit));
}

#[test_log::test]
fn test_branch_shadows_tag_with_same_name() {
    let repo = TestRepo::new();
    let first = repo.commit("First").at(100).file("a.txt", "1").create();
    let second = repo.commit("Second").at(200).file("a.txt", "2").create();
    repo.branch("release", second);
    repo.lightweight_tag("release", first);
    let browser = open(&repo);

    assert_eq!(browser.resolve("release").unwrap().id(), &id(second));
}

#[test_log::test]
fn test_resolve_unknown_revision() {
    let repo = TestRepo::new();
    repo.commit("Only").at(100).file("a.txt", "1").create();
    let browser = open(&repo);

    for revision in [
        "nope",
        "",
        "HEAD~1",
        "a\0b",
        "0000000000000000000000000000000000000000",
    ] {
        let err = browser.resolve(revision).unwrap_err();
        assert!(
            matches!(&err, RepoError::RevisionNotFound { revision: r } if r == revision),
            "unexpected result for {revision:?}: {err:?}"
        );
    }
}

#[test_log::test]
fn test_resolve_non_commit_target_is_not_found() {
    let repo = TestRepo::new();
    let commit = repo.commit("Only").at(100).file("a.txt", "1").create();
    let blob = repo
        .git()
        .find_commit(commit)
        .unwrap()
        .tree()
        .unwrap()
        .get_path(Path::new("a.txt"))
        .unwrap()
        .id();
    repo.lightweight_tag("blob-tag", blob);
    let browser = open(&repo);

    assert!(matches!(
        browser.resolve("blob-tag"),
        Err(RepoError::RevisionNotFound { .. })
    ));
}

#[test_log::test]
fn test_default_branch_prefers_known_names() {
    let repo = TestRepo::new();
    let base = repo.commit("Base").at(100).file("a.txt", "1").create();
    repo.commit("Newer")
        .at(500)
        .on("refs/heads/zzz")
        .parents(&[base])
        .file("b.txt", "2")
        .create();
    let browser = open(&repo);

    assert_eq!(browser.default_branch().unwrap().as_deref(), Some("master"));
}

#[test_log::test]
fn test_default_branch_falls_back_to_latest_branch() {
    let repo = TestRepo::new();
    repo.commit("Main")
        .at(100)
        .on("refs/heads/main")
        .file("a.txt", "1")
        .create();
    repo.commit("Dev")
        .at(300)
        .on("refs/heads/dev")
        .file("a.txt", "2")
        .create();
    let browser = open(&repo);

    assert_eq!(browser.default_branch().unwrap().as_deref(), Some("dev"));
    assert_eq!(
        browser.resolve_or_default(None).unwrap().summary(),
        "Dev"
    );
}

#[test_log::test]
fn test_empty_repository() {
    let repo = TestRepo::new();
    let browser = open(&repo);

    assert_eq!(browser.default_branch().unwrap(), None);
    assert!(browser.branch_names(None).unwrap().is_empty());
    assert!(matches!(
        browser.resolve_or_default(None),
        Err(RepoError::EmptyRepository)
    ));
    assert!(matches!(
        browser.resolve_or_default(Some("master")),
        Err(RepoError::RevisionNotFound { .. })
    ));
}

#[test_log::test]
fn test_branch_names_sorted_by_time() {
    let repo = TestRepo::new();
    let base = repo.commit("Base").at(200).file("a.txt", "1").create();
    repo.commit("Old")
        .at(100)
        .on("refs/heads/old")
        .parents(&[base])
        .create();
    repo.commit("New")
        .at(300)
        .on("refs/heads/new")
        .parents(&[base])
        .create();
    let browser = open(&repo);

    assert_eq!(
        browser.branch_names(None).unwrap(),
        vec!["new", "master", "old"]
    );
    assert_eq!(
        browser.branch_names(Some("master")).unwrap(),
        vec!["new", "old"]
    );
}

#[test_log::test]
fn test_tag_names_use_tagger_time_for_annotated_tags() {
    let repo = TestRepo::new();
    let first = repo.commit("First").at(100).file("a.txt", "1").create();
    let second = repo.commit("Second").at(200).file("a.txt", "2").create();
    repo.lightweight_tag("light", second);
    repo.annotated_tag("annotated", first, 400);
    let browser = open(&repo);

    assert_eq!(browser.tag_names().unwrap(), vec!["annotated", "light"]);
}
