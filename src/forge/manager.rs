//! Manager that wraps forge implementations
use log::*;
use std::{collections::HashMap, sync::Mutex};

use crate::{
    error::Result,
    forge::{
        config::RemoteConfig,
        journal::{Journal, RemoteAction},
        request::{
            Commit, CreateCommitRequest, CreatePrRequest, CreateTreeRequest,
            GetFileContentRequest, PrLabelsRequest, PullRequest, Tree,
        },
        traits::Forge,
    },
};

/// Sha returned for objects that were not created because of dry-run.
pub const DRY_RUN_SHA: &str = "fff";

/// The single forge handle of a run, built once at startup and passed by
/// reference to every component that talks to the remote.
pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
    journal: Journal,
    // refs "created" while in dry-run, so later reads of them resolve
    dry_run_refs: Mutex<HashMap<String, String>>,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
            journal: Journal::new(),
            dry_run_refs: Mutex::new(HashMap::new()),
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        self.remote_config.clone()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn dry_run_ref(&self, branch: &str) -> Option<String> {
        self.dry_run_refs
            .lock()
            .ok()
            .and_then(|refs| refs.get(branch).cloned())
    }

    fn set_dry_run_ref(&self, branch: &str, sha: Option<&str>) {
        if let Ok(mut refs) = self.dry_run_refs.lock() {
            match sha {
                Some(sha) => refs.insert(branch.to_string(), sha.to_string()),
                None => refs.remove(branch),
            };
        }
    }

    pub async fn has_branch(&self, branch: &str) -> Result<bool> {
        if self.remote_config.dry_run && self.dry_run_ref(branch).is_some() {
            return Ok(true);
        }
        self.forge.has_branch(branch).await
    }

    pub async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<String> {
        debug!("reading file {} at {:?}", req.path, req.git_ref);
        self.forge.get_file_content(req).await
    }

    pub async fn get_latest_commit(&self, branch: &str) -> Result<Commit> {
        if self.remote_config.dry_run
            && let Some(sha) = self.dry_run_ref(branch)
        {
            return Ok(Commit { sha });
        }
        self.forge.get_latest_commit(branch).await
    }

    pub async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create branch: {branch} at {sha}");
            self.set_dry_run_ref(branch, Some(sha));
            return Ok(());
        }

        self.forge.create_branch(branch, sha).await?;
        self.journal.record(RemoteAction::BranchCreated {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        Ok(())
    }

    /// Returns whether the branch existed. Only actual deletions are
    /// journaled.
    pub async fn delete_branch(&self, branch: &str) -> Result<bool> {
        if self.remote_config.dry_run {
            warn!("dry_run: would delete branch: {branch}");
            self.set_dry_run_ref(branch, None);
            return Ok(false);
        }

        let deleted = self.forge.delete_branch(branch).await?;
        if deleted {
            self.journal.record(RemoteAction::BranchDeleted {
                branch: branch.to_string(),
            });
        }
        Ok(deleted)
    }

    pub async fn create_tree(&self, req: CreateTreeRequest) -> Result<Tree> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create tree: req: {:#?}", req);
            return Ok(Tree {
                sha: DRY_RUN_SHA.into(),
            });
        }
        self.forge.create_tree(req).await
    }

    pub async fn create_commit(
        &self,
        req: CreateCommitRequest,
    ) -> Result<Commit> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create commit: req: {:#?}", req);
            return Ok(Commit {
                sha: DRY_RUN_SHA.into(),
            });
        }

        let commit = self.forge.create_commit(req).await?;
        self.journal.record(RemoteAction::CommitCreated {
            sha: commit.sha.clone(),
        });
        Ok(commit)
    }

    pub async fn update_branch(&self, branch: &str, sha: &str) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would move branch {branch} to {sha}");
            self.set_dry_run_ref(branch, Some(sha));
            return Ok(());
        }

        self.forge.update_branch(branch, sha).await?;
        self.journal.record(RemoteAction::BranchUpdated {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        Ok(())
    }

    pub async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create PR: req: {:#?}", req);
            return Ok(PullRequest { number: 0 });
        }

        let head = req.head_branch.clone();
        let base = req.base_branch.clone();
        let pr = self.forge.create_pr(req).await?;
        self.journal.record(RemoteAction::PullRequestOpened {
            number: pr.number,
            head,
            base,
        });
        Ok(pr)
    }

    pub async fn add_pr_labels(&self, req: PrLabelsRequest) -> Result<()> {
        if req.labels.is_empty() {
            return Ok(());
        }
        if self.remote_config.dry_run {
            warn!("dry_run: would add PR labels: req: {:#?}", req);
            return Ok(());
        }
        self.forge.add_pr_labels(req).await
    }
}
