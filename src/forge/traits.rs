//! Traits related to remote git forges
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    error::Result,
    forge::{
        config::RemoteConfig,
        request::{
            Commit, CreateCommitRequest, CreatePrRequest, CreateTreeRequest,
            GetFileContentRequest, PrLabelsRequest, PullRequest, Tree,
        },
    },
};

/// Remote object store operations needed to cut releases.
///
/// Implementations classify every failure with a
/// [`RemoteErrorKind`](crate::error::RemoteErrorKind) so callers never
/// inspect message text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn remote_config(&self) -> RemoteConfig;

    async fn has_branch(&self, branch: &str) -> Result<bool>;

    /// Fails with kind `AlreadyExists` when the branch exists.
    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()>;

    /// Returns whether a branch was removed; a missing branch is success.
    /// A protected branch fails with
    /// [`ReleaseError::ProtectedBranch`](crate::error::ReleaseError::ProtectedBranch).
    async fn delete_branch(&self, branch: &str) -> Result<bool>;

    /// Raw file contents. A missing file fails with kind `NotFound`.
    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<String>;

    async fn get_latest_commit(&self, branch: &str) -> Result<Commit>;

    async fn create_tree(&self, req: CreateTreeRequest) -> Result<Tree>;

    async fn create_commit(&self, req: CreateCommitRequest) -> Result<Commit>;

    /// Move an existing branch to `sha` (fast-forward only).
    async fn update_branch(&self, branch: &str, sha: &str) -> Result<()>;

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;

    async fn add_pr_labels(&self, req: PrLabelsRequest) -> Result<()>;
}
