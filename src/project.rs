//! Sub-project identity, the file paths derived from it, and branch names.
use std::path::Path;

use crate::version::VersionTriple;

/// Repository-root lock document shared by every sub-project.
pub const LOCK_FILE: &str = "package-lock.json";
/// Version manifest inside each project directory.
pub const MANIFEST_FILE: &str = "package.json";
/// Changelog inside each project directory.
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";
/// Random marker written on every release candidate.
pub const FINGERPRINT_FILE: &str = ".release-fingerprint";

/// Identifies the sub-project directory `<project_path>/<project>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Project name, also used in branch names.
    pub name: String,
    /// Directory holding all projects, relative to the repository root.
    pub project_path: String,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        project_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            project_path: project_path.into(),
        }
    }

    /// Project directory relative to the repository root.
    pub fn dir(&self) -> String {
        normalize(
            &Path::new(&self.project_path)
                .join(&self.name)
                .display()
                .to_string(),
        )
    }

    pub fn manifest_path(&self) -> String {
        self.file_path(MANIFEST_FILE)
    }

    pub fn changelog_path(&self) -> String {
        self.file_path(CHANGELOG_FILE)
    }

    pub fn fingerprint_path(&self) -> String {
        self.file_path(FINGERPRINT_FILE)
    }

    pub fn lock_path(&self) -> String {
        LOCK_FILE.to_string()
    }

    /// Key of this project's record in the lock document's `packages` map.
    pub fn lock_key(&self) -> String {
        self.dir()
    }

    /// `next/<project>`
    pub fn next_branch(&self) -> String {
        format!("next/{}", self.name)
    }

    /// `release/<project>/<major.minor>`
    pub fn release_branch(&self, version: &VersionTriple) -> String {
        format!("release/{}/{}", self.name, version.release_line())
    }

    /// `rc/<project>/<major.minor.patch>`
    pub fn rc_branch(&self, version: &VersionTriple) -> String {
        format!("rc/{}/{}", self.name, version)
    }

    /// `temp/rc_<project>_<version>`
    pub fn staging_branch(&self, version: &VersionTriple) -> String {
        format!("temp/rc_{}_{}", self.name, version)
    }

    /// Pattern matching every remote-tracking release branch of this project.
    pub fn release_branch_pattern(&self) -> String {
        format!("*/release/{}/*", self.name)
    }

    fn file_path(&self, file: &str) -> String {
        normalize(&Path::new(&self.dir()).join(file).display().to_string())
    }
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}
