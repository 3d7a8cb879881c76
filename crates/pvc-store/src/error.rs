use pvc_types::{CommitId, PromptId};

/// Errors from commit store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested commit does not exist.
    #[error("commit not found: {0}")]
    CommitNotFound(CommitId),

    /// The prompt a commit refers to does not exist.
    #[error("prompt not found: {0}")]
    PromptNotFound(PromptId),

    /// A prompt with this id is already registered.
    #[error("prompt already exists: {0}")]
    PromptExists(PromptId),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
