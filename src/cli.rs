//! CLI argument parsing and remote configuration.
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::{
    error::{ReleaseError, Result},
    event::PushEvent,
    forge::config::{DEFAULT_API_URL, RemoteConfig},
    orchestrator::config::OrchestratorConfig,
    project::Project,
};

pub const DEFAULT_PROJECT_PATH: &str = "projects";

/// Global CLI arguments shared by every flow.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "", global = true)]
    /// GitHub access token. Falls back to INPUT_TOKEN, then GITHUB_TOKEN.
    pub token: String,

    #[arg(long, default_value = "", global = true)]
    /// Name of the sub-project to release.
    pub project: String,

    #[arg(long, default_value = DEFAULT_PROJECT_PATH, global = true)]
    /// Directory holding the sub-projects, relative to the repository root.
    pub project_path: String,

    #[arg(long, global = true)]
    /// Version to release. Defaults to the current manifest version.
    pub release_version: Option<String>,

    #[arg(long, global = true)]
    /// Version to raise to. Defaults to a minor bump of the current version.
    pub next_version: Option<String>,

    // not global: clap would let values after the subcommand replace the
    // ones before it
    #[arg(long = "label", value_delimiter = ',')]
    /// Label for release candidate pull requests. Repeatable or comma
    /// separated, given before the subcommand.
    pub labels: Vec<String>,

    #[arg(long, global = true)]
    /// Push event payload. Falls back to GITHUB_EVENT_PATH.
    pub event_path: Option<PathBuf>,

    #[arg(long, default_value = "", global = true)]
    /// REST API base URL. Falls back to GITHUB_API_URL, then api.github.com.
    pub api_url: String,

    #[arg(long, default_value = ".", global = true)]
    /// Local clone used to resolve release branch base commits.
    pub repo_path: PathBuf,

    #[arg(long, default_value_t = false, global = true)]
    /// Log remote mutations instead of performing them.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release operation subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open a pull request raising the project to its next version.
    Raise,

    /// Cut a release candidate branch and open its pull request.
    Candidate,

    /// Run both flows against the same snapshot.
    All,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Args {
    /// Token from `--token`, then the given environment lookup.
    fn resolve_token(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SecretString> {
        non_empty(Some(self.token.clone()))
            .or_else(|| non_empty(lookup("INPUT_TOKEN")))
            .or_else(|| non_empty(lookup("GITHUB_TOKEN")))
            .map(SecretString::from)
            .ok_or_else(|| {
                ReleaseError::invalid_config("must set github token")
            })
    }

    fn resolve_api_url(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> String {
        non_empty(Some(self.api_url.clone()))
            .or_else(|| non_empty(lookup("GITHUB_API_URL")))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn resolve_event_path(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<PathBuf> {
        self.event_path
            .clone()
            .or_else(|| {
                non_empty(lookup("GITHUB_EVENT_PATH")).map(PathBuf::from)
            })
            .ok_or_else(|| {
                ReleaseError::invalid_config(
                    "must set --event-path or GITHUB_EVENT_PATH",
                )
            })
    }

    /// Path of the push event payload.
    pub fn event_path(&self) -> Result<PathBuf> {
        self.resolve_event_path(|key| env::var(key).ok())
    }

    /// Connection settings for the repository named in the event.
    pub fn remote_config(&self, event: &PushEvent) -> Result<RemoteConfig> {
        Ok(RemoteConfig {
            api_url: self.resolve_api_url(|key| env::var(key).ok()),
            owner: event.owner()?,
            repo: event.repository.name.clone(),
            token: self.resolve_token(|key| env::var(key).ok())?,
            dry_run: self.dry_run,
        })
    }

    /// Labels with surrounding whitespace and empty entries removed.
    pub fn labels(&self) -> Vec<String> {
        self.labels
            .iter()
            .filter_map(|label| non_empty(Some(label.clone())))
            .collect()
    }

    pub fn project(&self) -> Result<Project> {
        let name = self.project.trim();
        if name.is_empty() {
            return Err(ReleaseError::invalid_config("must set --project"));
        }
        Ok(Project::new(name, self.project_path.trim()))
    }

    pub fn orchestrator_config(
        &self,
        event: &PushEvent,
    ) -> Result<OrchestratorConfig> {
        OrchestratorConfig::builder()
            .project(self.project()?)
            .default_branch(event.repository.default_branch.clone())
            .trigger_sha(event.after.clone())
            .release_version(non_empty(self.release_version.clone()))
            .next_version(non_empty(self.next_version.clone()))
            .labels(self.labels())
            .build()
    }
}
