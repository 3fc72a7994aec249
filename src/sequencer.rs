//! Builds commits on remote branches through the git data API.
//!
//! A commit is always issued as: read branch tip, create one tree holding
//! every changed file on top of the tip's tree, create one commit whose
//! parent is the tip, move the branch to it. Each step needs the sha the
//! previous one returned, so the calls are never reordered or run in
//! parallel.
use log::*;
use std::rc::Rc;

use crate::{
    error::Result,
    forge::{
        manager::ForgeManager,
        request::{CreateCommitRequest, CreateTreeRequest, FileChange},
    },
};

/// Planned change to one repository file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdit {
    pub path: String,
    pub prior_content: String,
    /// `None` leaves the file untouched.
    pub new_content: Option<String>,
}

impl FileEdit {
    pub fn new(
        path: impl Into<String>,
        prior_content: impl Into<String>,
        new_content: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            prior_content: prior_content.into(),
            new_content,
        }
    }
}

pub struct CommitSequencer {
    forge: Rc<ForgeManager>,
}

impl CommitSequencer {
    pub fn new(forge: Rc<ForgeManager>) -> Self {
        Self { forge }
    }

    /// Commit every non-skipped edit to `branch` as a single commit and
    /// return the new tip. When all edits are skipped nothing is created and
    /// the current tip is returned.
    pub async fn commit_files(
        &self,
        branch: &str,
        edits: &[FileEdit],
    ) -> Result<String> {
        let changes = edits
            .iter()
            .filter_map(|edit| {
                edit.new_content.as_ref().map(|content| FileChange {
                    path: edit.path.clone(),
                    content: content.clone(),
                })
            })
            .collect::<Vec<FileChange>>();

        let paths = changes
            .iter()
            .map(|change| change.path.as_str())
            .collect::<Vec<&str>>()
            .join(", ");
        let failure_context = format!("branch: {branch}, paths: {paths}");

        let tip = self
            .forge
            .get_latest_commit(branch)
            .await
            .map_err(|err| err.with_context(&failure_context))?;

        if changes.is_empty() {
            info!("no file changes for {branch}: keeping tip {}", tip.sha);
            return Ok(tip.sha);
        }

        info!("committing {paths} to {branch}");

        let tree = self
            .forge
            .create_tree(CreateTreeRequest {
                base_tree: tip.sha.clone(),
                file_changes: changes,
            })
            .await
            .map_err(|err| err.with_context(&failure_context))?;

        let commit = self
            .forge
            .create_commit(CreateCommitRequest {
                message: format!("Update {paths}"),
                tree_sha: tree.sha,
                parent_sha: tip.sha,
            })
            .await
            .map_err(|err| err.with_context(&failure_context))?;

        self.forge
            .update_branch(branch, &commit.sha)
            .await
            .map_err(|err| err.with_context(&failure_context))?;

        Ok(commit.sha)
    }

    /// Create `target` at `tip`, the sha [`Self::commit_files`] returned for
    /// `staging`, then delete `staging`. The branch ref is never read back.
    pub async fn promote(
        &self,
        staging: &str,
        target: &str,
        tip: &str,
    ) -> Result<()> {
        info!("promoting {staging} ({tip}) to {target}");
        self.forge.create_branch(target, tip).await?;
        self.forge.delete_branch(staging).await?;

        Ok(())
    }
}
