//! Common test helper functions shared across test modules.
//!
//! This module provides reusable fixtures for the widgets project and a
//! helper for wrapping a mock forge in a [`ForgeManager`].
use chrono::NaiveDate;
use secrecy::SecretString;
use std::rc::Rc;

use crate::{
    forge::{config::RemoteConfig, manager::ForgeManager, traits::MockForge},
    project::Project,
};

/// Sha of the commit that triggers test runs.
pub const TRIGGER_SHA: &str = "trigger0";

pub const MANIFEST: &str = r#"{
    "name": "widgets",
    "version": "1.2.0",
    "private": true
}
"#;

pub const LOCK: &str = r#"{
    "name": "monorepo",
    "lockfileVersion": 3,
    "requires": true,
    "packages": {
        "": {
            "name": "monorepo",
            "workspaces": [
                "projects/*"
            ]
        },
        "projects/gadgets": {
            "name": "gadgets",
            "version": "0.4.0"
        },
        "projects/widgets": {
            "name": "widgets",
            "version": "1.2.0"
        }
    }
}
"#;

pub const CHANGELOG: &str = "# Changelog\n\n## [1.2.0] - Unreleased\n\n- add sprockets\n\n## [1.1.0] - 01.02.2024\n\n- first release\n";

/// Changelog whose top entry is already released.
pub const RELEASED_CHANGELOG: &str =
    "# Changelog\n\n## [1.1.0] - 01.02.2024\n\n- first release\n";

/// Creates a test RemoteConfig with sensible defaults.
pub fn create_test_remote_config() -> RemoteConfig {
    RemoteConfig {
        owner: "acme".to_string(),
        repo: "monorepo".to_string(),
        token: SecretString::from("test-token".to_string()),
        ..RemoteConfig::default()
    }
}

/// Wraps a mock forge in a manager. Sets the `remote_config` expectation, so
/// callers only set the expectations their test is about.
pub fn create_test_forge_manager(
    mut mock_forge: MockForge,
) -> Rc<ForgeManager> {
    mock_forge
        .expect_remote_config()
        .returning(create_test_remote_config);
    Rc::new(ForgeManager::new(Box::new(mock_forge)))
}

pub fn create_test_project() -> Project {
    Project::new("widgets", "projects")
}

/// Fixed release date used by orchestrator tests.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}
