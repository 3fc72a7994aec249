//! Append-only journal of remote mutations performed during a run.
//!
//! Nothing is rolled back when a flow fails part way. The journal is what an
//! operator reads to clean up by hand.
use log::*;
use std::{fmt, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAction {
    BranchCreated { branch: String, sha: String },
    BranchUpdated { branch: String, sha: String },
    BranchDeleted { branch: String },
    CommitCreated { sha: String },
    PullRequestOpened { number: u64, head: String, base: String },
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BranchCreated { branch, sha } => {
                write!(f, "created branch {branch} at {sha}")
            }
            Self::BranchUpdated { branch, sha } => {
                write!(f, "moved branch {branch} to {sha}")
            }
            Self::BranchDeleted { branch } => {
                write!(f, "deleted branch {branch}")
            }
            Self::CommitCreated { sha } => write!(f, "created commit {sha}"),
            Self::PullRequestOpened { number, head, base } => {
                write!(f, "opened pull request #{number} ({head} -> {base})")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Journal {
    actions: Mutex<Vec<RemoteAction>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, action: RemoteAction) {
        debug!("journal: {action}");
        // a poisoned lock only means another recorder panicked mid-push
        let mut actions = match self.actions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        actions.push(action);
    }

    pub fn actions(&self) -> Vec<RemoteAction> {
        match self.actions.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Log every recorded action, oldest first.
    pub fn report(&self) {
        let actions = self.actions();

        if actions.is_empty() {
            info!("no remote changes were made");
            return;
        }

        warn!("remote changes made before the failure (not rolled back):");
        for action in actions {
            warn!("  {action}");
        }
    }
}
