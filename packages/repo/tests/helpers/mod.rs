#![allow(dead_code)]

use repobrowse_object_store_git2::Git2Backend;
use repobrowse_repo::{ObjectId, Repository};
use repobrowse_testing::TestRepo;

#[must_use]
pub fn open(repo: &TestRepo) -> Repository {
    Repository::open(&Git2Backend::new(), repo.path()).unwrap()
}

#[must_use]
pub fn id(oid: git2::Oid) -> ObjectId {
    oid.to_string().parse().unwrap()
}

/// Ids of `commits`, for comparing against expected oids.
#[must_use]
pub fn ids(commits: &[repobrowse_repo::Commit<'_>]) -> Vec<ObjectId> {
    commits.iter().map(|commit| commit.id().clone()).collect()
}
