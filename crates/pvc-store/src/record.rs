use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use pvc_types::{CommitId, ProjectId, PromptId, Timestamp, UserId};

/// A named prompt owned by a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub project_id: ProjectId,
    pub name: String,
}

impl Prompt {
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id: PromptId::new(),
            project_id,
            name: name.into(),
        }
    }
}

/// An immutable snapshot of a prompt's text content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub prompt_id: PromptId,
    pub system_prompt: String,
    pub user_query: String,
    pub commit_message: Option<String>,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

/// Input for creating a commit. The store assigns `id` and `created_at`.
#[derive(Clone, Debug)]
pub struct NewCommit {
    pub prompt_id: PromptId,
    pub system_prompt: String,
    pub user_query: String,
    pub message: Option<String>,
    pub author: UserId,
}

impl NewCommit {
    pub fn new(
        prompt_id: PromptId,
        system_prompt: impl Into<String>,
        user_query: impl Into<String>,
        author: UserId,
    ) -> Self {
        Self {
            prompt_id,
            system_prompt: system_prompt.into(),
            user_query: user_query.into(),
            message: None,
            author,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Fields to amend on an existing commit. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitUpdate {
    pub system_prompt: Option<String>,
    pub user_query: Option<String>,
    pub message: Option<String>,
}

impl CommitUpdate {
    pub fn system_prompt(mut self, text: impl Into<String>) -> Self {
        self.system_prompt = Some(text.into());
        self
    }

    pub fn user_query(mut self, text: impl Into<String>) -> Self {
        self.user_query = Some(text.into());
        self
    }

    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.system_prompt.is_none() && self.user_query.is_none() && self.message.is_none()
    }

    /// Apply this update to `commit`. Identity fields are untouched.
    pub fn apply_to(&self, commit: &mut Commit) {
        if let Some(text) = &self.system_prompt {
            commit.system_prompt = text.clone();
        }
        if let Some(text) = &self.user_query {
            commit.user_query = text.clone();
        }
        if let Some(text) = &self.message {
            commit.commit_message = Some(text.clone());
        }
    }
}

/// Restricts a listing to a subset of a prompt's commits.
#[derive(Clone, Debug, Default)]
pub enum CommitFilter {
    #[default]
    All,
    /// Only these commits.
    Only(HashSet<CommitId>),
    /// Every commit except these.
    Excluding(HashSet<CommitId>),
}

impl CommitFilter {
    pub fn matches(&self, id: &CommitId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(id),
            Self::Excluding(ids) => !ids.contains(id),
        }
    }
}

/// A window into a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// A page large enough to return everything.
    pub fn unbounded() -> Self {
        Self {
            limit: usize::MAX,
            offset: 0,
        }
    }

    /// Slice `items` to this window.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}
