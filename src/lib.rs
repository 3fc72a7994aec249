pub mod changelog;
pub mod cli;
pub mod command;
pub mod error;
pub mod event;
pub mod forge;
pub mod manifest;
pub mod orchestrator;
pub mod planner;
pub mod project;
pub mod sequencer;
pub mod vcs;
pub mod version;

pub use cli::{Args, Command};
pub use error::{ReleaseError, Result};

#[cfg(test)]
pub mod test_helpers;
