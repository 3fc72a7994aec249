//! Read-only queries against the local clone's history.
//!
//! Only used to pick the base commit of a new release branch. Nothing here
//! checks out, commits, or otherwise touches the working tree.
use color_eyre::eyre::eyre;
use git2::BranchType;
use log::*;
#[cfg(test)]
use mockall::automock;
use regex::Regex;
use std::{path::PathBuf, sync::Mutex};

use crate::error::{ReleaseError, Result};

/// Name of the remote whose tracking branches mirror the forge.
pub const DEFAULT_REMOTE: &str = "origin";

#[cfg_attr(test, automock)]
pub trait Vcs: Send + Sync {
    /// Best common ancestor of two revisions.
    fn merge_base(&self, left: &str, right: &str) -> Result<String>;
    /// A parentless commit reachable from `rev`.
    fn root_commit(&self, rev: &str) -> Result<String>;
    /// Remote-tracking branch names (`origin/...`) matching a glob pattern,
    /// sorted lexicographically. `*` also matches `/`.
    fn list_remote_branches(&self, pattern: &str) -> Result<Vec<String>>;
}

/// [`Vcs`] backed by a local git repository through libgit2.
///
/// The repository is discovered on first use, so flows that never query
/// history do not need a local clone.
pub struct GitRepository {
    path: PathBuf,
    repo: Mutex<Option<git2::Repository>>,
}

impl GitRepository {
    /// Repository containing `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            repo: Mutex::new(None),
        }
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&git2::Repository) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .repo
            .lock()
            .map_err(|_| eyre!("local repository lock poisoned"))?;

        if guard.is_none() {
            let repo = git2::Repository::discover(&self.path)?;
            debug!("opened local repository at {}", repo.path().display());
            *guard = Some(repo);
        }

        match guard.as_ref() {
            Some(repo) => f(repo),
            None => Err(ReleaseError::Other(eyre!(
                "no repository found at {}",
                self.path.display()
            ))),
        }
    }
}

fn resolve_commit(repo: &git2::Repository, rev: &str) -> Result<git2::Oid> {
    let object = repo.revparse_single(rev)?;
    Ok(object.peel_to_commit()?.id())
}

/// Translate a git branch glob into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Ok(Regex::new(&expr)?)
}

impl Vcs for GitRepository {
    fn merge_base(&self, left: &str, right: &str) -> Result<String> {
        self.with_repo(|repo| {
            let left_oid = resolve_commit(repo, left)?;
            let right_oid = resolve_commit(repo, right)?;
            let base = repo.merge_base(left_oid, right_oid)?;
            info!("merge-base of {left} and {right}: {base}");
            Ok(base.to_string())
        })
    }

    fn root_commit(&self, rev: &str) -> Result<String> {
        self.with_repo(|repo| {
            let mut walk = repo.revwalk()?;
            walk.push(resolve_commit(repo, rev)?)?;

            for oid in walk {
                let commit = repo.find_commit(oid?)?;
                if commit.parent_count() == 0 {
                    info!("root commit of {rev}: {}", commit.id());
                    return Ok(commit.id().to_string());
                }
            }

            Err(ReleaseError::Other(eyre!(
                "no root commit reachable from {rev}"
            )))
        })
    }

    fn list_remote_branches(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = glob_to_regex(pattern)?;

        self.with_repo(|repo| {
            let mut names = vec![];

            for branch in repo.branches(Some(BranchType::Remote))? {
                let (branch, _) = branch?;
                if let Some(name) = branch.name()?
                    && matcher.is_match(name)
                {
                    names.push(name.to_string());
                }
            }

            names.sort();
            debug!("remote branches matching {pattern}: {names:?}");
            Ok(names)
        })
    }
}
