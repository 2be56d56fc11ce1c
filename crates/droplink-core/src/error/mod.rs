//! Unified error handling for droplink.
//!
//! All crates in the workspace report failures through [`LinkError`] so that
//! the CLI can render one consistent error surface, walk source chains, and
//! attach suggestions where a fix is obvious.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used across all droplink crates.
pub type LinkResult<T> = std::result::Result<T, LinkError>;

/// One artifact that failed during a run, kept with its error so the
/// run-level report can show every failure rather than just the first.
#[derive(Debug)]
pub struct ArtifactFailure {
    /// Artifact name as reported by the build service.
    pub artifact: String,
    /// The error that stopped this artifact.
    pub error: LinkError,
}

/// Unified error type for all droplink operations.
#[derive(Error, Debug)]
pub enum LinkError {
    // Share resolution errors
    #[error("share path '{path}' is not hosted on this machine")]
    NonLocalShare { path: String },

    #[error("failed to resolve share '{share}': {message}")]
    ShareQuery {
        share: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Link errors
    #[error("link source {path} does not exist")]
    SourceNotFound { path: Utf8PathBuf },

    #[error("failed to remove existing destination {path}")]
    DestinationCleanup {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path is not valid UTF-8: {path:?}")]
    PathEncoding { path: std::path::PathBuf },

    // Build service errors
    #[error("build {build_id} not found in project '{project}'")]
    BuildNotFound { project: String, build_id: u32 },

    #[error("build service rejected the request with status {status}")]
    ServiceAuth { status: u16 },

    #[error("build service error: {message}")]
    Service {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Configuration errors
    #[error("invalid configuration for '{field}': {reason}")]
    Config { field: String, reason: String },

    // Run summary, carries every per-artifact failure
    #[error("{} of {attempted} artifacts failed to link", .failures.len())]
    LinkRun {
        attempted: usize,
        failures: Vec<ArtifactFailure>,
    },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl LinkError {
    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a share query error with context.
    pub fn share_query(
        share: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ShareQuery {
            share: share.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a build service error with context.
    pub fn service(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Service {
            message: message.into(),
            source,
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if one exists.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NonLocalShare { .. } => Some(
                "Artifacts can only be linked from shares hosted on the machine \
                 running this step. Run the step on the hosting machine, or copy \
                 the artifacts instead of linking them.",
            ),
            Self::ShareQuery { .. } => Some(
                "Check that the share exists and that this account is allowed \
                 to query it.",
            ),
            Self::SourceNotFound { .. } => Some(
                "The build may have been cleaned up, or the artifact was \
                 published from a different machine.",
            ),
            Self::BuildNotFound { .. } => Some(
                "Check the build id and that the project name is spelled the \
                 way the build service knows it.",
            ),
            Self::ServiceAuth { .. } => Some(
                "Check that the access token or PAT is valid and has read \
                 access to builds.",
            ),
            Self::Config { .. } => Some("Check the flag value or the corresponding environment variable."),
            _ => None,
        }
    }
}
