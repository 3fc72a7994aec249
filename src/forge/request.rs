use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to read a file, optionally at a specific ref.
pub struct GetFileContentRequest {
    /// Path relative to the repository root.
    pub path: String,
    /// Branch, tag or sha to read from. Default branch when `None`.
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Full replacement contents of one file in a new tree.
pub struct FileChange {
    /// Relative path to the file starting from repo root
    pub path: String,
    /// New file contents
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a tree on top of an existing one.
pub struct CreateTreeRequest {
    /// Tree (or commit) sha the new tree is based on.
    pub base_tree: String,
    pub file_changes: Vec<FileChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a commit object. Does not move any ref.
pub struct CreateCommitRequest {
    pub message: String,
    pub tree_sha: String,
    pub parent_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to add labels to a pull request.
pub struct PrLabelsRequest {
    pub pr_number: u64,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tree {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Pull request information.
pub struct PullRequest {
    pub number: u64,
}
