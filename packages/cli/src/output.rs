//! Serializable views and their text rendering.

use std::io::Write;

use chrono::SecondsFormat;
use repobrowse_repo::{Change, Commit, DirectoryListing, RepoError, Repository};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub path: String,
    pub description: Option<String>,
    /// RFC 3339 time of the newest commit any reference points at.
    pub last_updated_at: Option<String>,
}

impl RepoSummary {
    /// Summarize `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the description or references cannot be read.
    pub fn from_repository(repo: &Repository) -> Result<Self, RepoError> {
        Ok(Self {
            name: repo.name().to_string(),
            path: repo.path().display().to_string(),
            description: repo.description()?,
            last_updated_at: repo
                .last_updated_at()?
                .and_then(|timestamp| chrono::DateTime::from_timestamp(timestamp, 0))
                .map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::Secs, true)),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefsOutput {
    pub default_branch: Option<String>,
    pub branches: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    pub id: String,
    pub short_id: String,
    pub author: String,
    pub author_name: String,
    pub summary: String,
    pub timestamp: i64,
    /// RFC 3339 commit time; absent when the timestamp is out of range.
    pub datetime: Option<String>,
}

impl From<&Commit<'_>> for CommitSummary {
    fn from(commit: &Commit<'_>) -> Self {
        Self {
            id: commit.id().to_string(),
            short_id: commit.short_id().to_string(),
            author: commit.author().to_string(),
            author_name: commit.author_name().to_string(),
            summary: commit.summary().to_string(),
            timestamp: commit.timestamp(),
            datetime: commit
                .datetime()
                .map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogOutput {
    pub revision: String,
    pub page: usize,
    pub commits: Vec<CommitSummary>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeOutput {
    pub commit: CommitSummary,
    /// `(segment, path)` pairs leading to the listed path.
    pub breadcrumbs: Vec<(String, String)>,
    pub listing: DirectoryListing,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowOutput {
    pub commit: CommitSummary,
    pub message: String,
    pub changes: Vec<Change>,
}

pub fn write_repos(out: &mut impl Write, repos: &[RepoSummary]) -> anyhow::Result<()> {
    for repo in repos {
        writeln!(
            out,
            "{}\t{}\t{}",
            repo.name,
            repo.last_updated_at.as_deref().unwrap_or("-"),
            repo.description.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub fn write_refs(out: &mut impl Write, refs: &RefsOutput) -> anyhow::Result<()> {
    if let Some(default_branch) = &refs.default_branch {
        writeln!(out, "default: {default_branch}")?;
    }
    writeln!(out, "branches:")?;
    for branch in &refs.branches {
        writeln!(out, "  {branch}")?;
    }
    writeln!(out, "tags:")?;
    for tag in &refs.tags {
        writeln!(out, "  {tag}")?;
    }
    Ok(())
}

pub fn write_log(out: &mut impl Write, log: &LogOutput) -> anyhow::Result<()> {
    for commit in &log.commits {
        let date = commit
            .datetime
            .as_deref()
            .map_or("-", |datetime| &datetime[..10]);
        writeln!(
            out,
            "{} {} {} {}",
            commit.short_id,
            date,
            commit.author_name,
            commit.summary
        )?;
    }
    if log.has_more {
        writeln!(out, "(more: --page {})", log.page + 1)?;
    }
    Ok(())
}

pub fn write_tree(out: &mut impl Write, tree: &TreeOutput) -> anyhow::Result<()> {
    let location = tree
        .breadcrumbs
        .last()
        .map_or("/", |(_, path)| path.as_str());
    writeln!(out, "{} @ {}", location, tree.commit.short_id)?;
    for dir in &tree.listing.dirs {
        writeln!(out, "{}/", dir.name)?;
    }
    for file in &tree.listing.files {
        writeln!(out, "{}", file.name)?;
    }
    Ok(())
}

pub fn write_commit_header(
    out: &mut impl Write,
    commit: &CommitSummary,
    message: &str,
) -> anyhow::Result<()> {
    writeln!(out, "commit {}", commit.id)?;
    writeln!(out, "Author: {}", commit.author)?;
    writeln!(
        out,
        "Date:   {}",
        commit.datetime.as_deref().unwrap_or("-")
    )?;
    writeln!(out)?;
    for line in message.trim_end().lines() {
        writeln!(out, "    {line}")?;
    }
    writeln!(out)?;
    Ok(())
}
