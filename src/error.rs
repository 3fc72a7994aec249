//! Error types for release-cut with typed remote failure kinds.

use std::fmt;

use thiserror::Error;

/// Discriminant attached to every hosting-API failure by the forge layer.
///
/// Callers branch on this value and never on the error message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The addressed object (branch, file, ref) does not exist.
    NotFound,
    /// The object being created exists already.
    AlreadyExists,
    /// The branch is protected and refuses the mutation.
    ProtectedBranch,
    /// Token rejected or missing permissions.
    Authentication,
    /// API rate limit exceeded.
    RateLimited,
    /// Any other failure (network, 5xx, unexpected payload).
    Other,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::ProtectedBranch => "protected branch",
            Self::Authentication => "authentication",
            Self::RateLimited => "rate limited",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Main error type for release-cut operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    // Input errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid version: {0}")]
    Validation(String),

    // Repository state errors
    #[error(
        "Branch '{branch}' already exists: this version was already cut, refusing to overwrite it"
    )]
    DuplicateCut { branch: String },

    #[error("Remote API error ({kind}) while {context}: {message}")]
    RemoteApi {
        kind: RemoteErrorKind,
        context: String,
        message: String,
    },

    #[error(
        "Branch '{branch}' is protected ({message}): you are probably trying to cut a version that was already cut"
    )]
    ProtectedBranch { branch: String, message: String },

    // Document errors
    #[error("Malformed changelog: {0}")]
    MalformedChangelog(String),

    #[error("No package entry '{key}' found in lock document")]
    MissingProjectEntry { key: String },

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Malformed JSON in {path}: {source}")]
    MalformedDocument {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReleaseError
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a duplicate cut error for the given branch
    pub fn duplicate_cut(branch: impl Into<String>) -> Self {
        Self::DuplicateCut {
            branch: branch.into(),
        }
    }

    /// Create a remote API error of the given kind
    pub fn remote(
        kind: RemoteErrorKind,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RemoteApi {
            kind,
            context: context.into(),
            message: message.into(),
        }
    }

    /// Kind of the remote failure, if this is one.
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            Self::RemoteApi { kind, .. } => Some(*kind),
            Self::ProtectedBranch { .. } => {
                Some(RemoteErrorKind::ProtectedBranch)
            }
            _ => None,
        }
    }

    /// Append operation context to a remote error. Other variants are
    /// returned unchanged.
    pub fn with_context(self, extra: impl fmt::Display) -> Self {
        match self {
            Self::RemoteApi {
                kind,
                context,
                message,
            } => Self::RemoteApi {
                kind,
                context: format!("{context} [{extra}]"),
                message,
            },
            other => other,
        }
    }

    /// Attach the repository path of the document a JSON error came from.
    pub fn in_file(self, path: impl Into<String>) -> Self {
        match self {
            Self::JsonParseError(source) => Self::MalformedDocument {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}

// Unclassified octocrab failures (client construction, etc). Calls that need
// a specific kind go through forge::github::classify instead.
impl From<octocrab::Error> for ReleaseError {
    fn from(err: octocrab::Error) -> Self {
        Self::remote(
            RemoteErrorKind::Other,
            "calling GitHub API",
            err.to_string(),
        )
    }
}
