mod helpers;

use helpers::{id, open};
use repobrowse_repo::{BlobView, BlobViewOptions, ListingEntry, RepoError, TreeOrBlob};
use repobrowse_testing::TestRepo;

fn fixture() -> TestRepo {
    let repo = TestRepo::new();
    let lib = repo
        .commit("Lib")
        .at(50)
        .on("refs/heads/lib")
        .file("lib.txt", "lib")
        .create();
    repo.commit("Init")
        .at(100)
        .file("README.md", "# readme\n")
        .file("build.rs", "fn main() {}\n")
        .file("src/main.rs", "fn main() {}\n")
        .file("src/util/mod.rs", "\n")
        .file("Docs/guide.md", "guide\n")
        .file("assets/logo.png", b"\x89PNG\r\n\x1a\n\0\0\0")
        .submodule("vendor/lib", lib)
        .create();
    repo
}

fn names(entries: &[ListingEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.name.as_str()).collect()
}

#[test_log::test]
fn test_empty_path_is_root_tree() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();

    for path in ["", "/", "//"] {
        match browser.resolve_path(&commit, path).unwrap() {
            TreeOrBlob::Tree(tree) => assert_eq!(&tree.id, commit.tree_id()),
            TreeOrBlob::Blob(_) => panic!("expected root tree for {path:?}"),
        }
    }
}

#[test_log::test]
fn test_resolve_nested_paths() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();

    assert!(browser.resolve_path(&commit, "src/util").unwrap().is_tree());
    let blob = browser.resolve_blob(&commit, "/src//main.rs/").unwrap();
    assert_eq!(blob.size, 13);
}

#[test_log::test]
fn test_traversal_past_blob_fails() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();

    for path in ["README.md/x", "missing", "src/..", "src/missing.rs"] {
        assert!(
            matches!(
                browser.resolve_path(&commit, path),
                Err(RepoError::PathNotFound { .. })
            ),
            "expected PathNotFound for {path:?}"
        );
    }
}

#[test_log::test]
fn test_kind_checks() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();

    assert!(matches!(
        browser.resolve_tree(&commit, "README.md"),
        Err(RepoError::NotADirectory { .. })
    ));
    assert!(matches!(
        browser.resolve_blob(&commit, "src"),
        Err(RepoError::NotAFile { .. })
    ));
}

#[test_log::test]
fn test_list_root_directory() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();
    let root = browser.resolve_path(&commit, "").unwrap();

    let listing = browser.list_directory(&commit, "", &root).unwrap();
    assert_eq!(names(&listing.dirs), vec!["assets", "Docs", "src", "vendor"]);
    assert_eq!(names(&listing.files), vec!["build.rs", "README.md"]);
    assert_eq!(listing.files[1].path, "README.md");
}

#[test_log::test]
fn test_list_subdirectory_has_parent_link() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();
    let resolved = browser.resolve_path(&commit, "src/util").unwrap();

    let listing = browser.list_directory(&commit, "src/util", &resolved).unwrap();
    assert_eq!(
        listing.dirs,
        vec![ListingEntry {
            name: "..".to_string(),
            path: "src".to_string(),
        }]
    );
    assert_eq!(listing.files[0].path, "src/util/mod.rs");
}

#[test_log::test]
fn test_submodule_listed_as_directory() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();
    let resolved = browser.resolve_path(&commit, "vendor").unwrap();

    let listing = browser.list_directory(&commit, "vendor", &resolved).unwrap();
    assert_eq!(names(&listing.dirs), vec!["..", "lib"]);
    assert!(listing.files.is_empty());
}

#[test_log::test]
fn test_list_directory_of_blob_lists_parent() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();
    let resolved = browser.resolve_path(&commit, "src/main.rs").unwrap();

    let listing = browser
        .list_directory(&commit, "src/main.rs", &resolved)
        .unwrap();
    assert_eq!(names(&listing.dirs), vec!["..", "util"]);
    assert_eq!(listing.dirs[0].path, "");
    assert_eq!(names(&listing.files), vec!["main.rs"]);
}

#[test_log::test]
fn test_blob_views() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();
    let options = BlobViewOptions::default();

    assert_eq!(
        browser.blob_view(&commit, "README.md", &options).unwrap(),
        BlobView::Text {
            text: "# readme\n".to_string()
        }
    );
    assert_eq!(
        browser
            .blob_view(&commit, "assets/logo.png", &options)
            .unwrap(),
        BlobView::Binary { is_image: true }
    );
    assert_eq!(
        browser
            .blob_view(&commit, "README.md", &options.with_max_text_size(4))
            .unwrap(),
        BlobView::TooLarge { size: 9 }
    );
    assert!(matches!(
        browser.blob_view(&commit, "src", &options),
        Err(RepoError::NotAFile { .. })
    ));
}

#[test_log::test]
fn test_raw_blob() {
    let repo = fixture();
    let browser = open(&repo);
    let commit = browser.resolve("master").unwrap();

    let content = browser.raw_blob(&commit, "assets/logo.png").unwrap();
    assert!(content.is_binary());
    assert_eq!(content.into_bytes(), b"\x89PNG\r\n\x1a\n\0\0\0");
}

#[test_log::test]
fn test_lookup_commit_by_id() {
    let repo = fixture();
    let browser = open(&repo);
    let head = repo.git().head().unwrap().target().unwrap();

    let commit = browser.commit(&id(head)).unwrap();
    assert_eq!(commit.summary(), "Init");
    assert!(commit.parent_ids().is_empty());
}
