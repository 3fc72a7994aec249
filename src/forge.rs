//! Remote object store interface for the hosting platform.
//!
//! Provides token-based authentication, branch refs, tree and commit objects,
//! file contents and pull requests through a common trait.

/// Configuration and authentication for the forge connection.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Append-only record of remote mutations.
pub mod journal;

/// Manager that adds dry-run handling and journaling around a forge.
pub mod manager;

/// Request and response types shared by forge implementations.
pub mod request;

/// Common trait for forge platform abstraction.
pub mod traits;
