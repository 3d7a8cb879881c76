use thiserror::Error;

use pvc_store::StoreError;
use pvc_tags::TagError;
use pvc_types::TypeError;

/// Errors surfaced by the SDK.
///
/// Lower layers are folded into a small taxonomy that callers can match on
/// without knowing which component failed.
#[derive(Debug, Error)]
pub enum SdkError {
    /// A prompt, commit, or label association is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The (commit, label) pair already exists, or a unique label is held
    /// by another commit.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation would leave zero or several production markers, or a
    /// non-monotonic release history. The whole operation was rolled back.
    #[error("invalid version state: {0}")]
    InvalidVersionState(String),

    /// Caller-supplied input is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The text-completion collaborator failed.
    #[error("completion failed: {0}")]
    Completion(String),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SdkError {
    /// Returns `true` if retrying the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidVersionState(_))
    }
}

impl From<StoreError> for SdkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CommitNotFound(_) | StoreError::PromptNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            StoreError::PromptExists(_) => Self::Conflict(err.to_string()),
            StoreError::LockPoisoned(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TagError> for SdkError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::NotFound { .. } => Self::NotFound(err.to_string()),
            TagError::Conflict { .. } | TagError::PromptMismatch { .. } => {
                Self::Conflict(err.to_string())
            }
            TagError::InvalidVersionState { .. } => Self::InvalidVersionState(err.to_string()),
            TagError::InvalidLabel { .. } => Self::Validation(err.to_string()),
            TagError::LockPoisoned(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TypeError> for SdkError {
    fn from(err: TypeError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
