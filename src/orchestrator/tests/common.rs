//! Common test utilities for orchestrator tests.

use std::{
    collections::HashMap,
    rc::Rc,
    sync::{Arc, Mutex},
};

use crate::{
    error::{ReleaseError, RemoteErrorKind},
    forge::{
        manager::ForgeManager,
        request::{
            Commit, CreateCommitRequest, CreatePrRequest, CreateTreeRequest,
            PrLabelsRequest, PullRequest, Tree,
        },
        traits::MockForge,
    },
    orchestrator::{
        Orchestrator, OrchestratorParams,
        config::{OrchestratorConfig, OrchestratorConfigBuilder},
    },
    test_helpers::{
        CHANGELOG, LOCK, MANIFEST, TRIGGER_SHA, create_test_forge_manager,
        create_test_project, test_date,
    },
    vcs::MockVcs,
};

pub use crate::test_helpers::RELEASED_CHANGELOG;

pub const MANIFEST_PATH: &str = "projects/widgets/package.json";
pub const LOCK_PATH: &str = "package-lock.json";
pub const CHANGELOG_PATH: &str = "projects/widgets/CHANGELOG.md";
pub const FINGERPRINT_PATH: &str = "projects/widgets/.release-fingerprint";
pub const ROOT_SHA: &str = "root000";

/// Config for the widgets project triggered at [`TRIGGER_SHA`] on `main`.
pub fn test_config() -> OrchestratorConfigBuilder {
    let mut builder = OrchestratorConfig::builder();
    builder
        .project(create_test_project())
        .default_branch("main")
        .trigger_sha(TRIGGER_SHA)
        .release_date(test_date());
    builder
}

/// Creates a test Orchestrator with the provided mocks. Returns the forge
/// manager as well so tests can inspect the journal.
pub fn create_test_orchestrator(
    mock_forge: MockForge,
    mock_vcs: MockVcs,
    config: OrchestratorConfig,
) -> (Orchestrator, Rc<ForgeManager>) {
    let forge = create_test_forge_manager(mock_forge);

    let orchestrator = Orchestrator::new(OrchestratorParams {
        config: Rc::new(config),
        forge: Rc::clone(&forge),
        vcs: Rc::new(mock_vcs),
    });

    (orchestrator, forge)
}

/// Local clone without any release branch of the project.
pub fn first_release_vcs() -> MockVcs {
    let mut mock_vcs = MockVcs::new();
    mock_vcs
        .expect_list_remote_branches()
        .returning(|_| Ok(vec![]));
    mock_vcs
        .expect_root_commit()
        .withf(|rev| rev == "origin/main")
        .returning(|_| Ok(ROOT_SHA.to_string()));
    mock_vcs
}

fn not_found(context: String) -> ReleaseError {
    ReleaseError::remote(RemoteErrorKind::NotFound, context, "Not Found")
}

/// In-memory remote repository behind a [`MockForge`].
///
/// Branches, files and every mutating request are kept in shared state so
/// tests can assert on the end result instead of individual calls.
#[derive(Clone, Default)]
pub struct RemoteState {
    refs: Arc<Mutex<HashMap<String, String>>>,
    created_at: Arc<Mutex<HashMap<String, String>>>,
    lagging_reads: Arc<Mutex<bool>>,
    files: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    trees: Arc<Mutex<Vec<CreateTreeRequest>>>,
    commits: Arc<Mutex<Vec<CreateCommitRequest>>>,
    prs: Arc<Mutex<Vec<CreatePrRequest>>>,
    labels: Arc<Mutex<Vec<PrLabelsRequest>>>,
    failures: Arc<Mutex<Vec<(String, RemoteErrorKind)>>>,
}

impl RemoteState {
    /// Default branch `main` holding the widgets fixtures.
    pub fn new() -> Self {
        Self::default()
            .with_branch("main", "main000")
            .with_file(MANIFEST_PATH, MANIFEST)
            .with_file(LOCK_PATH, LOCK)
            .with_file(CHANGELOG_PATH, CHANGELOG)
    }

    pub fn with_branch(self, name: &str, sha: &str) -> Self {
        self.set_ref(name, sha);
        self.created_at
            .lock()
            .unwrap()
            .insert(name.to_string(), sha.to_string());
        self
    }

    /// Branch tip reads report the sha a branch was created at, as a
    /// replica that has not seen later ref updates would.
    pub fn lagging_reads(self) -> Self {
        *self.lagging_reads.lock().unwrap() = true;
        self
    }

    fn set_ref(&self, name: &str, sha: &str) {
        self.refs
            .lock()
            .unwrap()
            .insert(name.to_string(), sha.to_string());
    }

    fn read_tip(&self, name: &str) -> Option<String> {
        if *self.lagging_reads.lock().unwrap() {
            self.created_at.lock().unwrap().get(name).cloned()
        } else {
            self.branch(name)
        }
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self
    }

    /// Fail every mutating call whose description starts with `call`.
    pub fn failing(self, call: &str, kind: RemoteErrorKind) -> Self {
        self.failures
            .lock()
            .unwrap()
            .push((call.to_string(), kind));
        self
    }

    pub fn branch(&self, name: &str) -> Option<String> {
        self.refs.lock().unwrap().get(name).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn trees(&self) -> Vec<CreateTreeRequest> {
        self.trees.lock().unwrap().clone()
    }

    pub fn commits(&self) -> Vec<CreateCommitRequest> {
        self.commits.lock().unwrap().clone()
    }

    pub fn prs(&self) -> Vec<CreatePrRequest> {
        self.prs.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<PrLabelsRequest> {
        self.labels.lock().unwrap().clone()
    }

    /// Content of `path` in the tree created for `base`.
    pub fn tree_file(&self, base: &str, path: &str) -> Option<String> {
        self.trees()
            .into_iter()
            .find(|tree| tree.base_tree == base)?
            .file_changes
            .into_iter()
            .find(|change| change.path == path)
            .map(|change| change.content)
    }

    /// Injected failure for `call`, checked before the call takes effect.
    fn check(&self, call: &str) -> Result<(), ReleaseError> {
        let failures = self.failures.lock().unwrap();
        match failures.iter().find(|(prefix, _)| call.starts_with(prefix)) {
            Some((_, kind)) => Err(ReleaseError::remote(
                *kind,
                call.to_string(),
                "injected failure",
            )),
            None => Ok(()),
        }
    }

    fn record(&self, call: String) -> Result<(), ReleaseError> {
        self.check(&call)?;
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    pub fn mock_forge(&self) -> MockForge {
        let mut mock_forge = MockForge::new();

        let state = self.clone();
        mock_forge.expect_get_file_content().returning(move |req| {
            state
                .files
                .lock()
                .unwrap()
                .get(&req.path)
                .cloned()
                .ok_or_else(|| not_found(format!("reading file {}", req.path)))
        });

        let state = self.clone();
        mock_forge
            .expect_has_branch()
            .returning(move |branch| Ok(state.branch(branch).is_some()));

        let state = self.clone();
        mock_forge
            .expect_get_latest_commit()
            .returning(move |branch| {
                state.read_tip(branch).map(|sha| Commit { sha }).ok_or_else(
                    || not_found(format!("reading tip of branch {branch}")),
                )
            });

        let state = self.clone();
        mock_forge
            .expect_create_branch()
            .returning(move |branch, sha| {
                if state.branch(branch).is_some() {
                    return Err(ReleaseError::remote(
                        RemoteErrorKind::AlreadyExists,
                        format!("creating branch {branch}"),
                        "Reference already exists",
                    ));
                }
                state.record(format!("create_branch {branch} {sha}"))?;
                state.set_ref(branch, sha);
                state
                    .created_at
                    .lock()
                    .unwrap()
                    .insert(branch.to_string(), sha.to_string());
                Ok(())
            });

        let state = self.clone();
        mock_forge.expect_delete_branch().returning(move |branch| {
            state
                .record(format!("delete_branch {branch}"))
                .map_err(|err| match err {
                    ReleaseError::RemoteApi {
                        kind: RemoteErrorKind::ProtectedBranch,
                        message,
                        ..
                    } => ReleaseError::ProtectedBranch {
                        branch: branch.to_string(),
                        message,
                    },
                    other => other,
                })?;
            state.created_at.lock().unwrap().remove(branch);
            Ok(state.refs.lock().unwrap().remove(branch).is_some())
        });

        let state = self.clone();
        mock_forge
            .expect_update_branch()
            .returning(move |branch, sha| {
                if state.branch(branch).is_none() {
                    return Err(not_found(format!("updating branch {branch}")));
                }
                state.record(format!("update_branch {branch} {sha}"))?;
                state.set_ref(branch, sha);
                Ok(())
            });

        let state = self.clone();
        mock_forge.expect_create_tree().returning(move |req| {
            let sha = format!("tree{}", state.trees().len() + 1);
            state.record(format!("create_tree {sha}"))?;
            state.trees.lock().unwrap().push(req);
            Ok(Tree { sha })
        });

        let state = self.clone();
        mock_forge.expect_create_commit().returning(move |req| {
            let sha = format!("commit{}", state.commits().len() + 1);
            state.record(format!("create_commit {sha}"))?;
            state.commits.lock().unwrap().push(req);
            Ok(Commit { sha })
        });

        let state = self.clone();
        mock_forge.expect_create_pr().returning(move |req| {
            state.record(format!(
                "create_pr {} {}",
                req.head_branch, req.base_branch
            ))?;
            let mut prs = state.prs.lock().unwrap();
            prs.push(req);
            Ok(PullRequest {
                number: prs.len() as u64,
            })
        });

        let state = self.clone();
        mock_forge.expect_add_pr_labels().returning(move |req| {
            state.record(format!("add_pr_labels {}", req.pr_number))?;
            state.labels.lock().unwrap().push(req);
            Ok(())
        });

        mock_forge
    }
}
