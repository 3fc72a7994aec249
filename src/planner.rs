//! Decides which branches a cut creates and where the release branch starts.
use log::*;
use std::rc::Rc;

use crate::{
    error::{ReleaseError, Result},
    forge::manager::ForgeManager,
    project::Project,
    vcs::{DEFAULT_REMOTE, Vcs},
    version::VersionTriple,
};

/// Branches a release-candidate cut will create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    /// `release/<project>/<major.minor>`
    pub release_branch: String,
    /// `rc/<project>/<major.minor.patch>`
    pub rc_branch: String,
    /// Commit the release branch is created at.
    pub release_base_commit: String,
}

pub struct BranchPlanner {
    forge: Rc<ForgeManager>,
    vcs: Rc<dyn Vcs>,
}

impl BranchPlanner {
    pub fn new(forge: Rc<ForgeManager>, vcs: Rc<dyn Vcs>) -> Self {
        Self { forge, vcs }
    }

    /// Fails with [`ReleaseError::DuplicateCut`] when `branch` exists remotely.
    pub async fn ensure_absent(&self, branch: &str) -> Result<()> {
        if self.forge.has_branch(branch).await? {
            return Err(ReleaseError::duplicate_cut(branch));
        }
        Ok(())
    }

    /// Validate that neither branch of the cut exists and compute the base
    /// commit of the release branch.
    ///
    /// The base is the merge-base of the default branch with the newest
    /// existing release branch of the project, or the default branch's root
    /// commit when the project was never released.
    pub async fn plan_release_branches(
        &self,
        project: &Project,
        release_version: &VersionTriple,
        default_branch: &str,
    ) -> Result<ReleasePlan> {
        let release_branch = project.release_branch(release_version);
        let rc_branch = project.rc_branch(release_version);

        self.ensure_absent(&release_branch).await?;
        self.ensure_absent(&rc_branch).await?;

        let default_ref = format!("{DEFAULT_REMOTE}/{default_branch}");
        let existing = self
            .vcs
            .list_remote_branches(&project.release_branch_pattern())?;

        let release_base_commit = match existing.iter().max() {
            Some(latest) => {
                info!(
                    "latest release branch of {}: {latest}",
                    project.name
                );
                self.vcs.merge_base(&default_ref, latest)?
            }
            None => {
                info!(
                    "no release branches found for {}: starting from root commit",
                    project.name
                );
                self.vcs.root_commit(&default_ref)?
            }
        };

        Ok(ReleasePlan {
            release_branch,
            rc_branch,
            release_base_commit,
        })
    }
}
