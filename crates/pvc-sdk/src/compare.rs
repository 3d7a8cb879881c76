use serde::{Deserialize, Serialize};

use pvc_diff::{Comparison, DiffEngine};
use pvc_store::Commit;
use pvc_types::CommitId;

/// Word-level comparison of two commits, field by field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitComparison {
    pub old: CommitId,
    pub new: CommitId,
    pub system_prompt: Comparison,
    pub user_query: Comparison,
}

impl CommitComparison {
    pub fn between(engine: &DiffEngine, old: &Commit, new: &Commit) -> Self {
        Self {
            old: old.id,
            new: new.id,
            system_prompt: engine.compare(&old.system_prompt, &new.system_prompt),
            user_query: engine.compare(&old.user_query, &new.user_query),
        }
    }

    pub fn words_added(&self) -> usize {
        self.system_prompt.stats.words_added + self.user_query.stats.words_added
    }

    pub fn words_removed(&self) -> usize {
        self.system_prompt.stats.words_removed + self.user_query.stats.words_removed
    }

    pub fn is_identical(&self) -> bool {
        self.system_prompt.is_identical() && self.user_query.is_identical()
    }
}
