//! Push event payload delivered to the workflow run.
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::error::{ReleaseError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepository {
    pub name: String,
    /// `<owner>/<name>`
    pub full_name: String,
    pub default_branch: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    /// Sha of the commit that triggered the run.
    pub after: String,
    pub repository: EventRepository,
}

impl PushEvent {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await.map_err(|err| {
            ReleaseError::invalid_config(format!(
                "failed to read event payload {}: {err}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let event: PushEvent = serde_json::from_str(content)?;
        if event.after.is_empty() {
            return Err(ReleaseError::invalid_config(
                "event payload has no triggering commit",
            ));
        }
        Ok(event)
    }

    /// Repository owner taken from `full_name`.
    pub fn owner(&self) -> Result<String> {
        self.repository
            .full_name
            .split_once('/')
            .map(|(owner, _)| owner.to_string())
            .filter(|owner| !owner.is_empty())
            .ok_or_else(|| {
                ReleaseError::invalid_config(format!(
                    "repository full name '{}' is not <owner>/<repo>",
                    self.repository.full_name
                ))
            })
    }
}
