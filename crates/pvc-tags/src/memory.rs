//! In-memory tag ledger for testing and ephemeral use.
//!
//! [`InMemoryTagLedger`] keeps every prompt's label rows in a `HashMap`
//! protected by a single `RwLock`. A transaction works on a copy of one
//! prompt's rows and swaps it in only when every operation succeeded, so a
//! failed batch leaves nothing behind.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use pvc_types::{CommitId, LabelClass, PromptId, Version};

use crate::error::{Result, TagError};
use crate::names::validate_label;
use crate::traits::TagLedger;
use crate::types::TagOp;

/// An in-memory implementation of [`TagLedger`].
#[derive(Debug, Default)]
pub struct InMemoryTagLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    prompts: HashMap<PromptId, PromptTags>,
    owners: HashMap<CommitId, PromptId>,
}

/// Label rows of one prompt.
///
/// `released` and `main_assigned` outlive the rows that set them, so a
/// deleted release still bounds the next version and a deleted `main`
/// commit is not replaced automatically.
#[derive(Clone, Debug, Default)]
struct PromptTags {
    commits: BTreeMap<CommitId, BTreeSet<String>>,
    released: Option<Version>,
    main_assigned: bool,
}

impl PromptTags {
    fn holders<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a CommitId> + 'a {
        self.commits
            .iter()
            .filter(move |(_, labels)| labels.contains(label))
            .map(|(commit, _)| commit)
    }

    fn apply(&mut self, prompt: &PromptId, op: &TagOp) -> Result<()> {
        match op {
            TagOp::Attach { commit, label } => self.attach(prompt, commit, label),
            TagOp::Detach { commit, label } => self.detach(prompt, commit, label),
            TagOp::DetachAcrossPrompt { label } => {
                ensure_detachable(prompt, label)?;
                for labels in self.commits.values_mut() {
                    labels.remove(label.as_str());
                }
                self.commits.retain(|_, labels| !labels.is_empty());
                Ok(())
            }
        }
    }

    fn attach(&mut self, prompt: &PromptId, commit: &CommitId, label: &str) -> Result<()> {
        validate_label(label)?;

        if self
            .commits
            .get(commit)
            .is_some_and(|labels| labels.contains(label))
        {
            return Err(TagError::Conflict {
                commit: *commit,
                label: label.to_string(),
                reason: "already attached".into(),
            });
        }

        match LabelClass::of(label) {
            LabelClass::Main => {
                if let Some(holder) = self.holders(label).next() {
                    return Err(TagError::Conflict {
                        commit: *commit,
                        label: label.to_string(),
                        reason: format!("already held by commit {holder}"),
                    });
                }
            }
            LabelClass::Prod => {
                if let Some(holder) = self.holders(label).next() {
                    return Err(TagError::InvalidVersionState {
                        prompt: *prompt,
                        reason: format!("{label} already held by commit {holder}"),
                    });
                }
            }
            LabelClass::Version(version) => {
                if let Some(latest) = self.released {
                    if version <= latest {
                        return Err(TagError::InvalidVersionState {
                            prompt: *prompt,
                            reason: format!("{version} is not greater than released {latest}"),
                        });
                    }
                }
            }
            LabelClass::Free => {}
        }

        match LabelClass::of(label) {
            LabelClass::Main => self.main_assigned = true,
            LabelClass::Version(version) => self.released = Some(version),
            LabelClass::Prod | LabelClass::Free => {}
        }

        self.commits
            .entry(*commit)
            .or_default()
            .insert(label.to_string());
        Ok(())
    }

    fn detach(&mut self, prompt: &PromptId, commit: &CommitId, label: &str) -> Result<()> {
        let not_found = || TagError::NotFound {
            commit: *commit,
            label: label.to_string(),
        };
        let labels = self.commits.get_mut(commit).ok_or_else(not_found)?;
        if !labels.contains(label) {
            return Err(not_found());
        }
        ensure_detachable(prompt, label)?;
        labels.remove(label);
        if labels.is_empty() {
            self.commits.remove(commit);
        }
        Ok(())
    }
}

/// Version labels and `main` are permanent; only commit deletion drops them.
fn ensure_detachable(prompt: &PromptId, label: &str) -> Result<()> {
    match LabelClass::of(label) {
        LabelClass::Version(_) | LabelClass::Main => Err(TagError::InvalidVersionState {
            prompt: *prompt,
            reason: format!("{label} is permanent and cannot be detached"),
        }),
        LabelClass::Prod | LabelClass::Free => Ok(()),
    }
}

impl InMemoryTagLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|e| TagError::LockPoisoned(e.to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>> {
        self.inner
            .write()
            .map_err(|e| TagError::LockPoisoned(e.to_string()))
    }
}

impl TagLedger for InMemoryTagLedger {
    fn transact(&self, prompt: &PromptId, ops: &[TagOp]) -> Result<()> {
        let mut state = self.write_state()?;

        for op in ops {
            if let TagOp::Attach { commit, .. } | TagOp::Detach { commit, .. } = op {
                if let Some(owner) = state.owners.get(commit) {
                    if owner != prompt {
                        return Err(TagError::PromptMismatch {
                            commit: *commit,
                            owner: *owner,
                            prompt: *prompt,
                        });
                    }
                }
            }
        }

        let mut scratch = state.prompts.get(prompt).cloned().unwrap_or_default();
        for op in ops {
            scratch.apply(prompt, op)?;
        }

        let before: BTreeSet<CommitId> = state
            .prompts
            .get(prompt)
            .map(|t| t.commits.keys().copied().collect())
            .unwrap_or_default();
        for gone in before.iter().filter(|c| !scratch.commits.contains_key(*c)) {
            state.owners.remove(gone);
        }
        for commit in scratch.commits.keys() {
            state.owners.insert(*commit, *prompt);
        }
        state.prompts.insert(*prompt, scratch);

        debug!(prompt = %prompt, ops = ops.len(), "tag transaction committed");
        Ok(())
    }

    fn detach_all(&self, commit: &CommitId) -> Result<BTreeSet<String>> {
        let mut state = self.write_state()?;
        let Some(prompt) = state.owners.remove(commit) else {
            return Ok(BTreeSet::new());
        };
        let removed = state
            .prompts
            .get_mut(&prompt)
            .and_then(|tags| tags.commits.remove(commit))
            .unwrap_or_default();
        debug!(commit = %commit, removed = removed.len(), "labels purged");
        Ok(removed)
    }

    fn latest_version(&self, prompt: &PromptId) -> Result<Option<Version>> {
        Ok(self
            .read_state()?
            .prompts
            .get(prompt)
            .and_then(|tags| tags.released))
    }

    fn main_assigned(&self, prompt: &PromptId) -> Result<bool> {
        Ok(self
            .read_state()?
            .prompts
            .get(prompt)
            .is_some_and(|tags| tags.main_assigned))
    }

    fn prompt_of(&self, commit: &CommitId) -> Result<Option<PromptId>> {
        Ok(self.read_state()?.owners.get(commit).copied())
    }

    fn labels_for_commit(&self, commit: &CommitId) -> Result<BTreeSet<String>> {
        let state = self.read_state()?;
        Ok(state
            .owners
            .get(commit)
            .and_then(|prompt| state.prompts.get(prompt))
            .and_then(|tags| tags.commits.get(commit))
            .cloned()
            .unwrap_or_default())
    }

    fn labelled_commits(&self, prompt: &PromptId) -> Result<BTreeMap<CommitId, BTreeSet<String>>> {
        Ok(self
            .read_state()?
            .prompts
            .get(prompt)
            .map(|tags| tags.commits.clone())
            .unwrap_or_default())
    }

    fn distinct_labels(&self) -> Result<BTreeSet<String>> {
        let state = self.read_state()?;
        Ok(state
            .prompts
            .values()
            .flat_map(|tags| tags.commits.values())
            .flatten()
            .cloned()
            .collect())
    }

    fn commits_with_label(&self, label: &str) -> Result<Vec<(PromptId, CommitId)>> {
        let state = self.read_state()?;
        let mut found: Vec<(PromptId, CommitId)> = state
            .prompts
            .iter()
            .flat_map(|(prompt, tags)| tags.holders(label).map(move |c| (*prompt, *c)))
            .collect();
        found.sort();
        Ok(found)
    }
}
