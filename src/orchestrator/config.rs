use chrono::{Local, NaiveDate};
use derive_builder::Builder;

use crate::{
    error::{ReleaseError, Result},
    project::Project,
};

#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorConfig {
    pub project: Project,
    /// Branch version raises merge into and release branches fork from.
    pub default_branch: String,
    /// Commit that triggered the run, base of `next/` and staging branches.
    pub trigger_sha: String,
    /// Overrides the version read from the manifest.
    #[builder(default)]
    pub release_version: Option<String>,
    /// Version to raise to. A minor bump of the current version when unset.
    #[builder(default)]
    pub next_version: Option<String>,
    /// Labels added to release candidate pull requests.
    #[builder(default)]
    pub labels: Vec<String>,
    #[builder(default = "Local::now().date_naive()")]
    pub release_date: NaiveDate,
}

impl OrchestratorConfigBuilder {
    pub fn build(&self) -> Result<OrchestratorConfig> {
        let config = self._build().map_err(|e| {
            ReleaseError::invalid_config(format!(
                "Failed to build orchestrator config: {}",
                e
            ))
        })?;

        if config.project.name.trim().is_empty() {
            return Err(ReleaseError::invalid_config("project name is empty"));
        }

        if config.default_branch.trim().is_empty() {
            return Err(ReleaseError::invalid_config("default branch is empty"));
        }

        if config.trigger_sha.trim().is_empty() {
            return Err(ReleaseError::invalid_config(
                "triggering commit sha is empty",
            ));
        }

        Ok(config)
    }
}

impl OrchestratorConfig {
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}
