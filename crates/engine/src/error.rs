//! Failures surfaced by [`Engine::handle`](crate::Engine::handle).
//!
//! Every variant carries enough context (operation, actor, target) for a
//! front end to render a message without re-deriving anything.

use gsbot_core::error::CoreError;
use gsbot_core::types::Snowflake;
use gsbot_db::StoreError;

/// Failures from an image upload backend.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid upload source: {0}")]
    InvalidSource(String),

    #[error("Upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Upload response did not include an image url")]
    MissingUrl,
}

#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    #[error("{operation}: no character matching '{target}' in group {group_id}")]
    NotFound {
        operation: &'static str,
        actor_id: Snowflake,
        group_id: Snowflake,
        target: String,
    },

    #[error("{operation}: member {actor_id} is not allowed to modify '{target}'")]
    Unauthorized {
        operation: &'static str,
        actor_id: Snowflake,
        target: String,
    },

    #[error("{operation}: invalid parameter: {reason}")]
    InvalidParameter {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation}: store read failed: {source}")]
    StoreReadFailure {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{operation}: store write failed: {source}")]
    StoreWriteFailure {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{operation}: upload failed: {source}")]
    UploadFailure {
        operation: &'static str,
        #[source]
        source: UploadError,
    },

    #[error("Purge of group {group_id} requested by {actor_id} timed out awaiting confirmation")]
    Timeout {
        actor_id: Snowflake,
        group_id: Snowflake,
    },

    #[error("Purge of group {group_id} requested by {actor_id} cancelled by reply '{reply}'")]
    Cancelled {
        actor_id: Snowflake,
        group_id: Snowflake,
        reply: String,
    },

    #[error("{operation}: {reason}")]
    Conflict {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation}: internal error: {reason}")]
    Internal {
        operation: &'static str,
        reason: String,
    },
}

impl HandleError {
    /// Stable machine-readable code for front ends.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::StoreReadFailure { .. } => "STORE_READ_FAILURE",
            Self::StoreWriteFailure { .. } => "STORE_WRITE_FAILURE",
            Self::UploadFailure { .. } => "UPLOAD_FAILURE",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Cancelled { .. } => "CANCELLED",
            Self::Conflict { .. } => "CONFLICT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Attach an operation name to a pure-core failure.
    pub fn from_core(operation: &'static str, err: CoreError) -> Self {
        match err {
            CoreError::Validation(reason) => Self::InvalidParameter { operation, reason },
            CoreError::Internal(reason) => Self::Internal { operation, reason },
        }
    }
}
