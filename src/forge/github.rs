//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{
    Octocrab,
    models::repos::Object,
    params::repos::Reference,
};
use reqwest::StatusCode;
use serde::Serialize;

use crate::{
    error::{ReleaseError, RemoteErrorKind, Result},
    forge::{
        config::{RemoteConfig, TREE_BLOB_MODE, TREE_BLOB_TYPE},
        request::{
            Commit, CreateCommitRequest, CreatePrRequest, CreateTreeRequest,
            GetFileContentRequest, PrLabelsRequest, PullRequest, Tree,
        },
        traits::Forge,
    },
};

// ref used when a read does not name one
const RAW_DEFAULT_REF: &str = "HEAD";

#[derive(Debug, Serialize)]
struct GithubTreeEntry {
    pub path: String,
    pub mode: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
struct GithubTree {
    pub base_tree: String,
    pub tree: Vec<GithubTreeEntry>,
}

/// Map an octocrab failure to a typed remote error.
///
/// This is the only place GitHub's status codes and messages are inspected.
pub fn classify(
    err: octocrab::Error,
    context: impl Into<String>,
) -> ReleaseError {
    let context = context.into();

    match &err {
        octocrab::Error::GitHub { source, .. } => {
            let message = source.message.clone();
            let kind = kind_for(source.status_code, &message);
            ReleaseError::remote(kind, context, message)
        }
        _ => ReleaseError::remote(
            RemoteErrorKind::Other,
            context,
            err.to_string(),
        ),
    }
}

fn kind_for(status: StatusCode, message: &str) -> RemoteErrorKind {
    let lowered = message.to_lowercase();

    if lowered.contains("protected branch") {
        RemoteErrorKind::ProtectedBranch
    } else if status == StatusCode::TOO_MANY_REQUESTS
        || lowered.contains("rate limit")
    {
        RemoteErrorKind::RateLimited
    } else if status == StatusCode::NOT_FOUND
        || lowered.contains("reference does not exist")
    {
        RemoteErrorKind::NotFound
    } else if lowered.contains("already exists") {
        RemoteErrorKind::AlreadyExists
    } else if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        RemoteErrorKind::Authentication
    } else {
        RemoteErrorKind::Other
    }
}

/// GitHub forge implementation using Octocrab for refs, git data objects,
/// contents and pull requests.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_url.trim_end_matches('/').to_string();
        let builder = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?;
        let instance = builder.build()?;

        Ok(Self {
            config,
            base_uri,
            instance,
        })
    }

    fn git_endpoint(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/{path}",
            self.base_uri, self.config.owner, self.config.repo
        )
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn has_branch(&self, branch: &str) -> Result<bool> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = classify(err, format!("looking up branch {branch}"));
                if err.remote_kind() == Some(RemoteErrorKind::NotFound) {
                    debug!("branch {branch} does not exist");
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        info!("creating branch {branch} at {sha}");

        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .create_ref(&Reference::Branch(branch.to_string()), sha)
            .await
            .map_err(|err| classify(err, format!("creating branch {branch}")))?;

        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<bool> {
        info!("deleting branch {branch}");

        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .delete_ref(&Reference::Branch(branch.to_string()))
            .await;

        let Err(err) = result else {
            return Ok(true);
        };

        match classify(err, format!("deleting branch {branch}")) {
            ReleaseError::RemoteApi {
                kind: RemoteErrorKind::NotFound,
                ..
            } => {
                info!("branch {branch} does not exist: nothing to delete");
                Ok(false)
            }
            ReleaseError::RemoteApi {
                kind: RemoteErrorKind::ProtectedBranch,
                message,
                ..
            } => Err(ReleaseError::ProtectedBranch {
                branch: branch.to_string(),
                message,
            }),
            other => Err(other),
        }
    }

    /// Reads through the raw media type. The JSON contents API leaves
    /// `content` empty for files over 1 MB, which lock documents often are.
    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<String> {
        let context = format!("reading file {}", req.path);
        let git_ref = req.git_ref.unwrap_or_else(|| RAW_DEFAULT_REF.into());

        let response = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .raw_file(git_ref, &req.path)
            .await
            .map_err(|err| classify(err, context.clone()))?;

        let response = octocrab::map_github_error(response)
            .await
            .map_err(|err| classify(err, context.clone()))?;

        self.instance
            .body_to_string(response)
            .await
            .map_err(|err| classify(err, context))
    }

    async fn get_latest_commit(&self, branch: &str) -> Result<Commit> {
        let context = format!("reading tip of branch {branch}");

        let branch_ref = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await
            .map_err(|err| classify(err, context.clone()))?;

        match branch_ref.object {
            Object::Commit { sha, .. } => Ok(Commit { sha }),
            _ => Err(ReleaseError::remote(
                RemoteErrorKind::Other,
                context,
                "branch ref does not point at a commit",
            )),
        }
    }

    async fn create_tree(&self, req: CreateTreeRequest) -> Result<Tree> {
        let tree = req
            .file_changes
            .into_iter()
            .map(|change| GithubTreeEntry {
                path: change
                    .path
                    .strip_prefix("./")
                    .unwrap_or(&change.path)
                    .to_string(),
                mode: TREE_BLOB_MODE.into(),
                kind: TREE_BLOB_TYPE.into(),
                content: change.content,
            })
            .collect::<Vec<GithubTreeEntry>>();

        info!("creating tree starting from: {}", req.base_tree);

        let body = serde_json::json!(GithubTree {
            base_tree: req.base_tree,
            tree,
        });

        let tree: Tree = self
            .instance
            .post(self.git_endpoint("trees"), Some(&body))
            .await
            .map_err(|err| classify(err, "creating tree"))?;

        info!("created new tree: {}", tree.sha);

        Ok(tree)
    }

    async fn create_commit(&self, req: CreateCommitRequest) -> Result<Commit> {
        let body = serde_json::json!({
          "message": req.message,
          "tree": req.tree_sha,
          "parents": vec![req.parent_sha],
        });

        let commit: Commit = self
            .instance
            .post(self.git_endpoint("commits"), Some(&body))
            .await
            .map_err(|err| classify(err, "creating commit"))?;

        info!("created commit: {}", commit.sha);

        Ok(commit)
    }

    async fn update_branch(&self, branch: &str, sha: &str) -> Result<()> {
        info!("moving branch {branch} to {sha}");

        let _: serde_json::Value = self
            .instance
            .patch(
                self.git_endpoint(&format!("refs/heads/{branch}")),
                Some(&serde_json::json!({
                  "sha": sha,
                  "force": false
                })),
            )
            .await
            .map_err(|err| classify(err, format!("updating branch {branch}")))?;

        Ok(())
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let context = format!(
            "creating pull request {} -> {}",
            req.head_branch, req.base_branch
        );

        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .send()
            .await
            .map_err(|err| classify(err, context))?;

        Ok(PullRequest { number: pr.number })
    }

    async fn add_pr_labels(&self, req: PrLabelsRequest) -> Result<()> {
        self.instance
            .issues(&self.config.owner, &self.config.repo)
            .add_labels(req.pr_number, &req.labels)
            .await
            .map_err(|err| {
                classify(
                    err,
                    format!("labelling pull request {}", req.pr_number),
                )
            })?;

        Ok(())
    }
}
