//! Promotion of a commit to production.
//!
//! A prompt is either without a production commit or has exactly one. A
//! promotion moves `PROD` to the target commit and records a new release
//! version in one ledger transaction, so a failure leaves the previous state
//! untouched.

use serde::{Deserialize, Serialize};
use tracing::info;

use pvc_store::Commit;
use pvc_tags::{TagLedger, TagOp};
use pvc_types::{CommitId, Version, VersionAllocator, PROD_LABEL};

use crate::error::SdkResult;
use crate::history::CommitView;

/// Result of a successful promotion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// The promoted commit with its refreshed labels.
    pub commit: CommitView,
    /// The release version allocated by this promotion.
    pub version: Version,
    /// The commit that carried `PROD` before, if any.
    pub previous_prod: Option<CommitId>,
}

/// Promote `commit` to production.
///
/// The caller must hold the prompt's lock so no other promotion computes a
/// version from the same label set. If the ledger rejects the write anyway
/// the error is retryable and no label has changed.
pub fn push_to_prod(
    ledger: &dyn TagLedger,
    allocator: &VersionAllocator,
    commit: Commit,
) -> SdkResult<Promotion> {
    let prompt = commit.prompt_id;
    let version = allocator.next_after(ledger.latest_version(&prompt)?)?;
    let previous_prod = ledger.find_by_label(&prompt, PROD_LABEL)?;

    ledger.transact(
        &prompt,
        &[
            TagOp::detach_across_prompt(PROD_LABEL),
            TagOp::attach(commit.id, PROD_LABEL),
            TagOp::attach(commit.id, version.to_label()),
        ],
    )?;

    let labels = ledger.labels_for_commit(&commit.id)?;
    info!(
        prompt = %prompt,
        commit = %commit.id,
        version = %version,
        previous = ?previous_prod,
        "pushed to production"
    );
    Ok(Promotion {
        commit: CommitView::new(commit, labels),
        version,
        previous_prod,
    })
}
