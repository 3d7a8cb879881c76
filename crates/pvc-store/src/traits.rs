use pvc_types::{CommitId, PromptId, UserId};

use crate::error::StoreResult;
use crate::record::{Commit, CommitFilter, CommitUpdate, NewCommit, Page, Prompt};

/// Storage backend for prompts and their commits.
///
/// All implementations must satisfy these invariants:
/// - Commit ids are generated here and are never reused.
/// - A commit can only be created for a registered prompt.
/// - `amend` changes text fields only; identity fields are immutable.
/// - Listings are ordered newest first by creation order.
pub trait CommitStore: Send + Sync {
    /// Register a prompt so commits can be created against it.
    fn insert_prompt(&self, prompt: Prompt) -> StoreResult<()>;

    /// Read a prompt. Returns `Ok(None)` if it is not registered.
    fn prompt(&self, id: &PromptId) -> StoreResult<Option<Prompt>>;

    /// Create a commit, assigning its id and timestamp.
    ///
    /// Fails with [`StoreError::PromptNotFound`](crate::StoreError::PromptNotFound)
    /// if the prompt is unknown.
    fn create(&self, commit: NewCommit) -> StoreResult<Commit>;

    /// Read a commit. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &CommitId) -> StoreResult<Option<Commit>>;

    /// Amend the text fields of a commit and return the updated record.
    fn amend(&self, id: &CommitId, update: &CommitUpdate) -> StoreResult<Commit>;

    /// Delete a commit, returning the removed record.
    fn delete(&self, id: &CommitId) -> StoreResult<Commit>;

    /// List a prompt's commits matching `filter`, newest first, windowed by
    /// `page`. Also returns the total number of matching commits.
    fn list_by_prompt(
        &self,
        prompt: &PromptId,
        filter: &CommitFilter,
        page: Page,
    ) -> StoreResult<(Vec<Commit>, usize)>;

    /// Number of live commits for a prompt.
    fn count_for_prompt(&self, prompt: &PromptId) -> StoreResult<usize> {
        let (_, total) = self.list_by_prompt(prompt, &CommitFilter::All, Page::new(0, 0))?;
        Ok(total)
    }

    /// All commits authored by `user`, newest first.
    fn list_by_author(&self, user: &UserId) -> StoreResult<Vec<Commit>>;

    /// Read multiple commits. Missing ids are skipped.
    fn get_many(&self, ids: &[CommitId]) -> StoreResult<Vec<Commit>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(commit) = self.get(id)? {
                out.push(commit);
            }
        }
        Ok(out)
    }
}
