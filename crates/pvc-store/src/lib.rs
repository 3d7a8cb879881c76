//! Commit storage for prompt version control.
//!
//! A commit is an immutable snapshot of a prompt's text. Its identity
//! (`id`, `prompt_id`, `created_by`, `created_at`) never changes; only the
//! descriptive text fields may be amended.
//!
//! # Storage Backends
//!
//! All backends implement the [`CommitStore`] trait:
//!
//! - [`InMemoryCommitStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Commit ids are generated by the store, never supplied by callers.
//! 2. Every commit belongs to a registered prompt.
//! 3. Listing is newest-first in creation order.
//! 4. The store never interprets labels; label-based filtering arrives as a
//!    precomputed [`CommitFilter`].

pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryCommitStore;
pub use record::{Commit, CommitFilter, CommitUpdate, NewCommit, Page, Prompt};
pub use traits::CommitStore;
