#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Command line front end for `repobrowse`.
//!
//! Parses configuration with `clap`, builds a [`RepoRegistry`] from the
//! configured repository paths and prints the requested view as text or
//! JSON.

mod output;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use repobrowse_diff::write_patch;
use repobrowse_object_store_git2::Git2Backend;
use repobrowse_registry::{RepoOrder, RepoRegistry};
use repobrowse_repo::{
    BlobView, BlobViewOptions, DEFAULT_MAX_TEXT_SIZE, RepoError, Repository, page_window,
    subpaths,
};

pub use output::{CommitSummary, LogOutput, RefsOutput, RepoSummary, ShowOutput, TreeOutput};

/// Read-only browser for git repositories.
#[derive(Debug, Parser)]
#[command(name = "repobrowse", version, about, long_about = None)]
pub struct Cli {
    /// Repository to serve; repeat for several.
    #[arg(
        long = "repo",
        value_name = "PATH",
        env = "REPOBROWSE_REPOS",
        value_delimiter = ',',
        required = true
    )]
    pub repos: Vec<PathBuf>,

    /// Repository to browse, by name. May be omitted with a single repository.
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Largest file, in bytes, that `cat` prints as text.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TEXT_SIZE)]
    pub max_text_size: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the configured repositories.
    Repos {
        /// Most recently updated first instead of by name.
        #[arg(long)]
        by_last_update: bool,
    },
    /// List branches and tags.
    Refs,
    /// Show commit history, one page at a time.
    Log {
        #[arg(long)]
        rev: Option<String>,

        /// Only commits touching this path.
        #[arg(long)]
        path: Option<String>,

        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// List a directory.
    Tree {
        #[arg(long)]
        rev: Option<String>,

        #[arg(long, default_value = "")]
        path: String,
    },
    /// Show a commit and its patch.
    Show { rev: String },
    /// Print a file.
    Cat {
        #[arg(long)]
        rev: Option<String>,

        path: String,

        /// Write the raw bytes, even for binary or large files.
        #[arg(long)]
        raw: bool,
    },
}

/// Execute `cli`, writing the result to `out`.
///
/// # Errors
///
/// Returns an error if a repository cannot be opened, a lookup fails, or
/// writing to `out` fails.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let registry = RepoRegistry::from_paths(Arc::new(Git2Backend::new()), &cli.repos)?;
    log::debug!("registry holds {} repositories", registry.len());

    match &cli.command {
        Command::Repos { by_last_update } => {
            let order = if *by_last_update {
                RepoOrder::LastUpdated
            } else {
                RepoOrder::Name
            };
            let repos = registry
                .sorted(order)?
                .into_iter()
                .map(RepoSummary::from_repository)
                .collect::<Result<Vec<_>, _>>()?;
            emit(cli, out, repos.as_slice(), output::write_repos)
        }
        Command::Refs => {
            let repo = select(cli, &registry)?;
            let refs = RefsOutput {
                default_branch: repo.default_branch()?,
                branches: repo.branch_names(None)?,
                tags: repo.tag_names()?,
            };
            emit(cli, out, &refs, output::write_refs)
        }
        Command::Log { rev, path, page } => {
            let repo = select(cli, &registry)?;
            let rev = match rev {
                Some(rev) => rev.clone(),
                None => repo.default_branch()?.ok_or(RepoError::EmptyRepository)?,
            };
            let window = page_window(*page);
            let history = repo.history_page(&rev, path.as_deref(), window.size, window.skip)?;
            let log_output = LogOutput {
                revision: rev,
                page: *page,
                commits: history.commits.iter().map(CommitSummary::from).collect(),
                has_more: history.has_more,
            };
            emit(cli, out, &log_output, output::write_log)
        }
        Command::Tree { rev, path } => {
            let repo = select(cli, &registry)?;
            let commit = repo.resolve_or_default(rev.as_deref())?;
            let resolved = repo.resolve_path(&commit, path)?;
            let tree = TreeOutput {
                commit: CommitSummary::from(&commit),
                breadcrumbs: subpaths(path),
                listing: repo.list_directory(&commit, path, &resolved)?,
            };
            emit(cli, out, &tree, output::write_tree)
        }
        Command::Show { rev } => {
            let repo = select(cli, &registry)?;
            let commit = repo.resolve(rev)?;
            let show = ShowOutput {
                commit: CommitSummary::from(&commit),
                message: commit.message().to_string(),
                changes: commit.diff()?,
            };
            emit(cli, out, &show, |out, show| {
                output::write_commit_header(out, &show.commit, &show.message)?;
                for change in &show.changes {
                    let mut patch = String::new();
                    write_patch(&mut patch, change)?;
                    out.write_all(patch.as_bytes())?;
                }
                Ok(())
            })
        }
        Command::Cat { rev, path, raw } => {
            let repo = select(cli, &registry)?;
            let commit = repo.resolve_or_default(rev.as_deref())?;
            if *raw {
                for chunk in repo.raw_blob(&commit, path)?.chunks() {
                    out.write_all(chunk)?;
                }
                return Ok(());
            }
            let options = BlobViewOptions::default().with_max_text_size(cli.max_text_size);
            let view = repo.blob_view(&commit, path, &options)?;
            emit(cli, out, &view, |out, view| match view {
                BlobView::Text { text } => Ok(out.write_all(text.as_bytes())?),
                BlobView::Binary { is_image } => {
                    let kind = if *is_image { "image" } else { "binary file" };
                    writeln!(out, "{path}: {kind}, use --raw to print it")?;
                    Ok(())
                }
                BlobView::TooLarge { size } => {
                    writeln!(out, "{path}: {size} bytes, use --raw to print it")?;
                    Ok(())
                }
            })
        }
    }
}

/// The repository named by `--name`, or the only registered one.
fn select<'a>(
    cli: &Cli,
    registry: &'a RepoRegistry<Git2Backend>,
) -> anyhow::Result<&'a Repository> {
    if let Some(name) = &cli.name {
        return Ok(registry.get(name)?);
    }
    match registry.all() {
        [repo] => Ok(repo),
        [] => bail!("no repositories configured"),
        _ => bail!("several repositories configured; select one with --name"),
    }
}

fn emit<T, W, F>(cli: &Cli, out: &mut W, value: &T, text: F) -> anyhow::Result<()>
where
    T: serde::Serialize + ?Sized,
    W: Write,
    F: FnOnce(&mut W, &T) -> anyhow::Result<()>,
{
    if cli.json {
        serde_json::to_writer_pretty(&mut *out, value).context("failed to write JSON")?;
        writeln!(out)?;
        Ok(())
    } else {
        text(out, value)
    }
}
