//! High-level SDK for prompt version control.
//!
//! [`PromptRepo`] is the entry point: it records commits of a prompt's text,
//! manages their labels, promotes commits to production with an
//! automatically allocated release version, and serves the working and
//! release history views.
//!
//! ```
//! use pvc_sdk::{NewCommit, ProjectId, PromptRepo, UserId};
//!
//! let repo = PromptRepo::in_memory();
//! let prompt = repo.register_prompt(ProjectId::new("acme"), "support-bot").unwrap();
//! let first = repo
//!     .create_commit(NewCommit::new(prompt.id, "You are helpful.", "Hi", UserId::new("alice")))
//!     .unwrap();
//! assert!(first.is_main());
//!
//! let promotion = repo.push_to_prod(&first.commit.id).unwrap();
//! assert_eq!(promotion.version.to_string(), "v1.0.0");
//! ```

pub mod activity;
pub mod compare;
pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod locks;
pub mod promotion;
pub mod repository;

pub use activity::{
    ActivityError, ActivityEvent, ActivitySink, NoOpActivity, RecordingActivity, TracingActivity,
};
pub use compare::CommitComparison;
pub use completion::{
    CommitMessageDrafter, CompletionRequest, CompletionResponse, TextCompletion, TokenUsage,
    NO_CHANGES_MESSAGE,
};
pub use config::{DiffConfig, DraftingConfig, HistoryConfig, ReleaseConfig, RepoConfig};
pub use error::{SdkError, SdkResult};
pub use history::{CommitPage, CommitView, Release, ReleaseView, WorkingView};
pub use promotion::Promotion;
pub use repository::PromptRepo;

// Re-export key types
pub use pvc_diff::{ChunkKind, Comparison, DiffChunk, DiffEngine, DiffStats};
pub use pvc_store::{Commit, CommitStore, CommitUpdate, InMemoryCommitStore, NewCommit, Prompt};
pub use pvc_tags::{InMemoryTagLedger, TagLedger};
pub use pvc_types::{
    next_version, CommitId, ProjectId, PromptId, UserId, Version, VersionAllocator, MAIN_LABEL,
    PROD_LABEL,
};
