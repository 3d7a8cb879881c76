//! The [`TagLedger`] trait defining the label storage interface.

use std::collections::{BTreeMap, BTreeSet};

use pvc_types::{CommitId, PromptId, Version, VersionAllocator, MAIN_LABEL};

use crate::error::{Result, TagError};
use crate::types::TagOp;

/// Storage backend for (commit, label) associations.
///
/// Implementations must be thread-safe (`Send + Sync`). Every row belongs to
/// one prompt, the prompt of its commit. Backends enforce these constraints
/// on every write:
///
/// - a (commit, label) pair is unique;
/// - at most one commit per prompt carries `main`;
/// - at most one commit per prompt carries `PROD`;
/// - each new version label is strictly greater than every version label
///   the prompt has ever held, and version labels are never detached.
///
/// [`transact`](TagLedger::transact) applies a batch all-or-nothing; the
/// single-row helpers are one-operation transactions.
pub trait TagLedger: Send + Sync {
    /// Apply `ops` to the labels of `prompt` atomically. On error no
    /// operation in the batch takes effect.
    fn transact(&self, prompt: &PromptId, ops: &[TagOp]) -> Result<()>;

    /// Remove every label of `commit` regardless of class, returning what
    /// was removed. Used when the commit itself is deleted.
    fn detach_all(&self, commit: &CommitId) -> Result<BTreeSet<String>>;

    /// The prompt owning `commit`'s labels, if it has any.
    fn prompt_of(&self, commit: &CommitId) -> Result<Option<PromptId>>;

    /// Labels attached to `commit`. Empty if it has none.
    fn labels_for_commit(&self, commit: &CommitId) -> Result<BTreeSet<String>>;

    /// Every labelled commit of `prompt` with its label set.
    fn labelled_commits(&self, prompt: &PromptId) -> Result<BTreeMap<CommitId, BTreeSet<String>>>;

    /// Every distinct label in use, across all prompts.
    fn distinct_labels(&self) -> Result<BTreeSet<String>>;

    /// Every (prompt, commit) carrying `label`, across all prompts.
    fn commits_with_label(&self, label: &str) -> Result<Vec<(PromptId, CommitId)>>;

    /// Attach `label` to `commit`, a commit of `prompt`.
    fn attach(&self, prompt: &PromptId, commit: &CommitId, label: &str) -> Result<()> {
        self.transact(prompt, &[TagOp::attach(*commit, label)])
    }

    /// Remove `label` from `commit`.
    fn detach(&self, commit: &CommitId, label: &str) -> Result<()> {
        let prompt = self.prompt_of(commit)?.ok_or_else(|| TagError::NotFound {
            commit: *commit,
            label: label.to_string(),
        })?;
        self.transact(&prompt, &[TagOp::detach(*commit, label)])
    }

    /// Remove `label` from every commit of `prompt`.
    fn detach_label_across_prompt(&self, prompt: &PromptId, label: &str) -> Result<()> {
        self.transact(prompt, &[TagOp::detach_across_prompt(label)])
    }

    /// The highest version ever attached within `prompt`, including versions
    /// whose commits were since deleted. The default only sees live labels.
    fn latest_version(&self, prompt: &PromptId) -> Result<Option<Version>> {
        Ok(VersionAllocator::latest(self.labels_for_prompt(prompt)?))
    }

    /// Whether `main` was ever attached within `prompt`. The default only
    /// sees live labels.
    fn main_assigned(&self, prompt: &PromptId) -> Result<bool> {
        Ok(self.find_by_label(prompt, MAIN_LABEL)?.is_some())
    }

    /// Every label used across `prompt`'s commits.
    fn labels_for_prompt(&self, prompt: &PromptId) -> Result<BTreeSet<String>> {
        Ok(self
            .labelled_commits(prompt)?
            .into_values()
            .flatten()
            .collect())
    }

    /// The commit of `prompt` carrying `label`. When a free-form label sits
    /// on several commits the newest one wins.
    fn find_by_label(&self, prompt: &PromptId, label: &str) -> Result<Option<CommitId>> {
        Ok(self
            .labelled_commits(prompt)?
            .into_iter()
            .rev()
            .find(|(_, labels)| labels.contains(label))
            .map(|(commit, _)| commit))
    }

    /// Like [`find_by_label`](TagLedger::find_by_label) but ignoring ASCII case.
    fn find_by_label_ignore_case(&self, prompt: &PromptId, label: &str) -> Result<Option<CommitId>> {
        Ok(self
            .labelled_commits(prompt)?
            .into_iter()
            .rev()
            .find(|(_, labels)| labels.iter().any(|l| l.eq_ignore_ascii_case(label)))
            .map(|(commit, _)| commit))
    }

    /// Distinct labels containing `query`, ignoring case.
    fn search_labels(&self, query: &str) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        Ok(self
            .distinct_labels()?
            .into_iter()
            .filter(|l| l.to_lowercase().contains(&needle))
            .collect())
    }
}
