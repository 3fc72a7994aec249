//! Command execution for release-cut.
//!
//! Builds the single forge handle and local repository handle of the run,
//! hands them to the [`Orchestrator`] and runs the flow selected on the
//! command line.
use log::*;
use std::rc::Rc;

use crate::{
    cli::{Args, Command},
    error::Result,
    event::PushEvent,
    forge::{github::Github, manager::ForgeManager},
    orchestrator::{FlowOutcome, Orchestrator, OrchestratorParams},
    vcs::GitRepository,
};

/// Run the selected flow. On failure the remote changes made so far are
/// logged before the error is returned.
pub async fn execute(args: &Args) -> Result<Vec<FlowOutcome>> {
    let event_path = args.event_path()?;
    let event = PushEvent::load(&event_path).await?;
    debug!("loaded push event from {}", event_path.display());

    let remote_config = args.remote_config(&event)?;
    let config = Rc::new(args.orchestrator_config(&event)?);

    info!(
        "{:?} for {} in {}/{} at {}",
        args.command,
        config.project.name,
        remote_config.owner,
        remote_config.repo,
        config.trigger_sha
    );

    if remote_config.dry_run {
        warn!("dry_run: no remote changes will be made");
    }

    let github = Github::new(remote_config)?;
    let forge = Rc::new(ForgeManager::new(Box::new(github)));

    let orchestrator = Orchestrator::new(OrchestratorParams {
        config,
        forge: Rc::clone(&forge),
        vcs: Rc::new(GitRepository::new(&args.repo_path)),
    });

    let result = match args.command {
        Command::Raise => orchestrator.run_raise().await.map(|o| vec![o]),
        Command::Candidate => {
            orchestrator.run_candidate().await.map(|o| vec![o])
        }
        Command::All => orchestrator.run_all().await,
    };

    match result {
        Ok(outcomes) => {
            for outcome in outcomes.iter() {
                info!("{outcome}");
            }
            Ok(outcomes)
        }
        Err(err) => {
            forge.journal().report();
            Err(err)
        }
    }
}
