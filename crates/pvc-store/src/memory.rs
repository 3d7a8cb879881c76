use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use pvc_types::{CommitId, PromptId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::record::{Commit, CommitFilter, CommitUpdate, NewCommit, Page, Prompt};
use crate::traits::CommitStore;

/// In-memory, HashMap-based commit store.
///
/// Intended for tests and embedding. State lives behind a single `RwLock`;
/// records are cloned on read and write.
pub struct InMemoryCommitStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    prompts: HashMap<PromptId, Prompt>,
    commits: HashMap<CommitId, Commit>,
    /// Commit ids per prompt in creation order (oldest first).
    history: HashMap<PromptId, Vec<CommitId>>,
}

impl InMemoryCommitStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreState::default()),
        }
    }

    /// Total number of commits across all prompts.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.commits.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read_state(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_state(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryCommitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitStore for InMemoryCommitStore {
    fn insert_prompt(&self, prompt: Prompt) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.prompts.contains_key(&prompt.id) {
            return Err(StoreError::PromptExists(prompt.id));
        }
        state.history.entry(prompt.id).or_default();
        state.prompts.insert(prompt.id, prompt);
        Ok(())
    }

    fn prompt(&self, id: &PromptId) -> StoreResult<Option<Prompt>> {
        Ok(self.read_state()?.prompts.get(id).cloned())
    }

    fn create(&self, commit: NewCommit) -> StoreResult<Commit> {
        let mut state = self.write_state()?;
        if !state.prompts.contains_key(&commit.prompt_id) {
            return Err(StoreError::PromptNotFound(commit.prompt_id));
        }

        let record = Commit {
            id: CommitId::new(),
            prompt_id: commit.prompt_id,
            system_prompt: commit.system_prompt,
            user_query: commit.user_query,
            commit_message: commit.message,
            created_by: commit.author,
            created_at: chrono::Utc::now(),
        };

        state
            .history
            .entry(record.prompt_id)
            .or_default()
            .push(record.id);
        state.commits.insert(record.id, record.clone());
        debug!(commit = %record.id, prompt = %record.prompt_id, "commit stored");
        Ok(record)
    }

    fn get(&self, id: &CommitId) -> StoreResult<Option<Commit>> {
        Ok(self.read_state()?.commits.get(id).cloned())
    }

    fn amend(&self, id: &CommitId, update: &CommitUpdate) -> StoreResult<Commit> {
        let mut state = self.write_state()?;
        let commit = state
            .commits
            .get_mut(id)
            .ok_or(StoreError::CommitNotFound(*id))?;
        update.apply_to(commit);
        Ok(commit.clone())
    }

    fn delete(&self, id: &CommitId) -> StoreResult<Commit> {
        let mut state = self.write_state()?;
        let removed = state
            .commits
            .remove(id)
            .ok_or(StoreError::CommitNotFound(*id))?;
        if let Some(ids) = state.history.get_mut(&removed.prompt_id) {
            ids.retain(|c| c != id);
        }
        Ok(removed)
    }

    fn list_by_prompt(
        &self,
        prompt: &PromptId,
        filter: &CommitFilter,
        page: Page,
    ) -> StoreResult<(Vec<Commit>, usize)> {
        let state = self.read_state()?;
        let matching: Vec<&CommitId> = state
            .history
            .get(prompt)
            .map(|ids| ids.iter().rev().filter(|id| filter.matches(id)).collect())
            .unwrap_or_default();
        let total = matching.len();
        let commits = page
            .apply(matching)
            .into_iter()
            .filter_map(|id| state.commits.get(id).cloned())
            .collect();
        Ok((commits, total))
    }

    fn list_by_author(&self, user: &UserId) -> StoreResult<Vec<Commit>> {
        let state = self.read_state()?;
        let mut commits: Vec<Commit> = state
            .commits
            .values()
            .filter(|c| &c.created_by == user)
            .cloned()
            .collect();
        commits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(commits)
    }
}

impl std::fmt::Debug for InMemoryCommitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryCommitStore")
            .field("commit_count", &count)
            .finish()
    }
}
