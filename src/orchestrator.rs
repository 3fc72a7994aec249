//! Version-raise and release-candidate flows.
//!
//! Both flows work from one [`Snapshot`] of the project's files taken from
//! the default branch. Every new file content is computed before the first
//! remote mutation, so an invalid version or malformed document never leaves
//! branches behind.
use log::*;
use nanoid::nanoid;
use std::{fmt, rc::Rc};

use crate::{
    changelog::{StampOptions, StampOutcome, stamp_and_advance},
    error::{ReleaseError, RemoteErrorKind, Result},
    forge::{
        manager::ForgeManager,
        request::{CreatePrRequest, GetFileContentRequest, PrLabelsRequest},
    },
    manifest::{manifest_version, set_lock_version, set_manifest_version},
    orchestrator::config::OrchestratorConfig,
    planner::BranchPlanner,
    sequencer::{CommitSequencer, FileEdit},
    vcs::Vcs,
    version::{VersionTriple, validate_raise},
};

pub mod config;

pub const RAISE_PR_BODY: &str = "Bump version";

/// Files of the project as read from the default branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub manifest: String,
    pub lock: String,
    pub changelog: String,
}

/// How a flow ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed { head_branch: String, pr_number: u64 },
    Skipped { reason: String },
}

impl fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed {
                head_branch,
                pr_number,
            } => {
                write!(f, "opened pull request #{pr_number} from {head_branch}")
            }
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

pub struct OrchestratorParams {
    pub config: Rc<OrchestratorConfig>,
    pub forge: Rc<ForgeManager>,
    pub vcs: Rc<dyn Vcs>,
}

pub struct Orchestrator {
    config: Rc<OrchestratorConfig>,
    forge: Rc<ForgeManager>,
    planner: BranchPlanner,
    sequencer: CommitSequencer,
}

/// Creating a branch that already exists means the version was cut before.
fn already_cut(err: ReleaseError, branch: &str) -> ReleaseError {
    if err.remote_kind() == Some(RemoteErrorKind::AlreadyExists) {
        ReleaseError::duplicate_cut(branch)
    } else {
        err
    }
}

impl Orchestrator {
    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            planner: BranchPlanner::new(
                Rc::clone(&params.forge),
                Rc::clone(&params.vcs),
            ),
            sequencer: CommitSequencer::new(Rc::clone(&params.forge)),
            config: params.config,
            forge: params.forge,
        }
    }

    /// Read manifest, lock and changelog concurrently.
    pub async fn read_snapshot(&self) -> Result<Snapshot> {
        let project = &self.config.project;
        let read = |path: String| {
            self.forge.get_file_content(GetFileContentRequest {
                path,
                git_ref: Some(self.config.default_branch.clone()),
            })
        };

        let (manifest, lock, changelog) = tokio::try_join!(
            read(project.manifest_path()),
            read(project.lock_path()),
            read(project.changelog_path()),
        )?;

        Ok(Snapshot {
            manifest,
            lock,
            changelog,
        })
    }

    /// Open `next/<project>` with the manifest and lock raised to the next
    /// version and the changelog advanced, then propose it to the default
    /// branch.
    pub async fn raise_version(
        &self,
        snapshot: &Snapshot,
    ) -> Result<FlowOutcome> {
        let project = &self.config.project;
        let manifest_path = project.manifest_path();
        let lock_path = project.lock_path();
        let previous = manifest_version(&snapshot.manifest)
            .map_err(|err| err.in_file(&manifest_path))?;

        let next = match &self.config.next_version {
            Some(next) => next.clone(),
            None => {
                let bumped = previous
                    .parse::<VersionTriple>()
                    .map_err(|err| {
                        ReleaseError::validation(format!(
                            "current version: {err}"
                        ))
                    })?
                    .bump_minor();
                info!("no next version given: raising to {bumped}");
                bumped.to_string()
            }
        };

        let next_version = validate_raise(&previous, &next)?;
        let release_version: VersionTriple = self
            .config
            .release_version
            .as_deref()
            .unwrap_or(&previous)
            .parse()?;

        info!(
            "raising {} from {previous} to {next_version}, releasing \
             {release_version}",
            project.name
        );

        let next_str = next_version.to_string();
        let changelog = match stamp_and_advance(
            &snapshot.changelog,
            &StampOptions {
                release_version: release_version.to_string(),
                next_version: Some(next_str.clone()),
                prepare_next_entry: true,
                date: self.config.release_date,
            },
        )? {
            StampOutcome::Stamped { changelog, .. } => Some(changelog),
            StampOutcome::Skipped { .. } => {
                info!("changelog has no unreleased section: leaving it as is");
                None
            }
        };

        let edits = vec![
            FileEdit::new(
                &manifest_path,
                snapshot.manifest.clone(),
                Some(
                    set_manifest_version(&snapshot.manifest, &next_str)
                        .map_err(|err| err.in_file(&manifest_path))?,
                ),
            ),
            FileEdit::new(
                &lock_path,
                snapshot.lock.clone(),
                Some(
                    set_lock_version(
                        &snapshot.lock,
                        &project.lock_key(),
                        &next_str,
                    )
                    .map_err(|err| err.in_file(&lock_path))?,
                ),
            ),
            FileEdit::new(
                project.changelog_path(),
                snapshot.changelog.clone(),
                changelog,
            ),
        ];

        let branch = project.next_branch();
        self.planner.ensure_absent(&branch).await?;
        self.forge
            .create_branch(&branch, &self.config.trigger_sha)
            .await
            .map_err(|err| already_cut(err, &branch))?;

        self.sequencer.commit_files(&branch, &edits).await?;

        let pr = self
            .forge
            .create_pr(CreatePrRequest {
                head_branch: branch.clone(),
                base_branch: self.config.default_branch.clone(),
                title: format!("Next {}", project.name),
                body: RAISE_PR_BODY.to_string(),
            })
            .await?;

        info!("opened version raise pull request #{}", pr.number);

        Ok(FlowOutcome::Completed {
            head_branch: branch,
            pr_number: pr.number,
        })
    }

    /// Freeze the unreleased changelog section on a new rc branch and
    /// propose it to the project's release branch.
    pub async fn cut_release_candidate(
        &self,
        snapshot: &Snapshot,
    ) -> Result<FlowOutcome> {
        let project = &self.config.project;
        let manifest_path = project.manifest_path();
        let lock_path = project.lock_path();

        let release_version: VersionTriple = match &self.config.release_version
        {
            Some(version) => version.parse()?,
            None => manifest_version(&snapshot.manifest)
                .map_err(|err| err.in_file(&manifest_path))?
                .parse()?,
        };
        let release_str = release_version.to_string();

        let (changelog, released_body) = match stamp_and_advance(
            &snapshot.changelog,
            &StampOptions {
                release_version: release_str.clone(),
                next_version: None,
                prepare_next_entry: false,
                date: self.config.release_date,
            },
        )? {
            StampOutcome::Stamped {
                changelog,
                released_body,
            } => (changelog, released_body),
            StampOutcome::Skipped { .. } => {
                let reason = format!(
                    "changelog of {} has no unreleased section to release",
                    project.name
                );
                info!("{reason}");
                return Ok(FlowOutcome::Skipped { reason });
            }
        };

        let edits = vec![
            FileEdit::new(
                project.changelog_path(),
                snapshot.changelog.clone(),
                Some(changelog),
            ),
            FileEdit::new(
                &manifest_path,
                snapshot.manifest.clone(),
                Some(
                    set_manifest_version(&snapshot.manifest, &release_str)
                        .map_err(|err| err.in_file(&manifest_path))?,
                ),
            ),
            FileEdit::new(
                &lock_path,
                snapshot.lock.clone(),
                Some(
                    set_lock_version(
                        &snapshot.lock,
                        &project.lock_key(),
                        &release_str,
                    )
                    .map_err(|err| err.in_file(&lock_path))?,
                ),
            ),
            // keeps the rc tip distinct from the release branch tip
            FileEdit::new(
                project.fingerprint_path(),
                "",
                Some(format!("{}\n", nanoid!())),
            ),
        ];

        let plan = self
            .planner
            .plan_release_branches(
                project,
                &release_version,
                &self.config.default_branch,
            )
            .await?;

        info!(
            "cutting {release_version} of {}: {} at {}",
            project.name, plan.release_branch, plan.release_base_commit
        );

        self.forge
            .create_branch(&plan.release_branch, &plan.release_base_commit)
            .await
            .map_err(|err| already_cut(err, &plan.release_branch))?;

        let staging = project.staging_branch(&release_version);
        self.forge.delete_branch(&staging).await?;
        self.forge
            .create_branch(&staging, &self.config.trigger_sha)
            .await?;

        let tip = self.sequencer.commit_files(&staging, &edits).await?;
        self.sequencer
            .promote(&staging, &plan.rc_branch, &tip)
            .await
            .map_err(|err| already_cut(err, &plan.rc_branch))?;

        let pr = self
            .forge
            .create_pr(CreatePrRequest {
                head_branch: plan.rc_branch.clone(),
                base_branch: plan.release_branch.clone(),
                title: format!("Release {release_version}-{}", project.name),
                body: format!("## Changelog\n\n{released_body}"),
            })
            .await?;

        self.forge
            .add_pr_labels(PrLabelsRequest {
                pr_number: pr.number,
                labels: self.config.labels.clone(),
            })
            .await?;

        info!("opened release candidate pull request #{}", pr.number);

        Ok(FlowOutcome::Completed {
            head_branch: plan.rc_branch,
            pr_number: pr.number,
        })
    }

    pub async fn run_raise(&self) -> Result<FlowOutcome> {
        let snapshot = self.read_snapshot().await?;
        self.raise_version(&snapshot).await
    }

    pub async fn run_candidate(&self) -> Result<FlowOutcome> {
        let snapshot = self.read_snapshot().await?;
        self.cut_release_candidate(&snapshot).await
    }

    /// Run both flows concurrently against one snapshot. Neither flow is
    /// cancelled when the other fails; the first error is returned after
    /// both finished.
    pub async fn run_all(&self) -> Result<Vec<FlowOutcome>> {
        let snapshot = self.read_snapshot().await?;

        let (raise, candidate) = tokio::join!(
            self.raise_version(&snapshot),
            self.cut_release_candidate(&snapshot),
        );

        match (raise, candidate) {
            (Ok(raise), Ok(candidate)) => Ok(vec![raise, candidate]),
            (Err(err), Ok(candidate)) => {
                info!("release candidate flow finished: {candidate}");
                Err(err)
            }
            (Ok(raise), Err(err)) => {
                info!("version raise flow finished: {raise}");
                Err(err)
            }
            (Err(raise_err), Err(candidate_err)) => {
                error!("release candidate flow failed: {candidate_err}");
                Err(raise_err)
            }
        }
    }
}
