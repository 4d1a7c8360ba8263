/// Domain-level failures raised by pure core logic.
///
/// Carries only machine-readable context; callers decide how (and whether)
/// to render it for a user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid parameter: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
