//! Error types for tag ledger operations.

use thiserror::Error;

use pvc_types::{CommitId, PromptId};

/// Errors that can occur during tag ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// The (commit, label) association does not exist.
    #[error("label {label:?} not found on commit {commit}")]
    NotFound { commit: CommitId, label: String },

    /// The association already exists, or the label is held elsewhere in a
    /// way that forbids another copy.
    #[error("label {label:?} conflicts on commit {commit}: {reason}")]
    Conflict {
        commit: CommitId,
        label: String,
        reason: String,
    },

    /// The write would leave zero or several production markers, or a
    /// non-monotonic release history.
    #[error("invalid version state for prompt {prompt}: {reason}")]
    InvalidVersionState { prompt: PromptId, reason: String },

    /// The label text is not acceptable.
    #[error("invalid label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    /// The commit already has labels under a different prompt.
    #[error("commit {commit} belongs to prompt {owner}, not {prompt}")]
    PromptMismatch {
        commit: CommitId,
        owner: PromptId,
        prompt: PromptId,
    },

    /// A lock guarding ledger state was poisoned.
    #[error("ledger lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convenience type alias for ledger operations.
pub type Result<T> = std::result::Result<T, TagError>;
