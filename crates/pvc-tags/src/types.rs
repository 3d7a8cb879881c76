//! Ledger operation types.

use serde::{Deserialize, Serialize};

use pvc_types::CommitId;

/// One label mutation inside a ledger transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagOp {
    /// Attach `label` to `commit`.
    Attach { commit: CommitId, label: String },
    /// Remove `label` from `commit`.
    Detach { commit: CommitId, label: String },
    /// Remove `label` from every commit of the transaction's prompt.
    /// Succeeds even if no commit carries it.
    DetachAcrossPrompt { label: String },
}

impl TagOp {
    pub fn attach(commit: CommitId, label: impl Into<String>) -> Self {
        Self::Attach {
            commit,
            label: label.into(),
        }
    }

    pub fn detach(commit: CommitId, label: impl Into<String>) -> Self {
        Self::Detach {
            commit,
            label: label.into(),
        }
    }

    pub fn detach_across_prompt(label: impl Into<String>) -> Self {
        Self::DetachAcrossPrompt {
            label: label.into(),
        }
    }

    /// The label this operation touches.
    pub fn label(&self) -> &str {
        match self {
            Self::Attach { label, .. } => label,
            Self::Detach { label, .. } => label,
            Self::DetachAcrossPrompt { label } => label,
        }
    }
}
