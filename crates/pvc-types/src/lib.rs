//! Foundation types for prompt version control.
//!
//! Every other `pvc` crate depends on `pvc-types`.
//!
//! # Key Types
//!
//! - [`PromptId`], [`CommitId`] -- store-generated UUID v7 identifiers
//! - [`UserId`], [`ProjectId`] -- identifiers owned by external collaborators
//! - [`LabelClass`] -- policy class of a tag label (`main`, `PROD`, version, free-form)
//! - [`Version`] -- a parsed `vMAJOR.MINOR.PATCH` release label
//! - [`VersionAllocator`] -- derives the next release version from existing labels

pub mod error;
pub mod identity;
pub mod label;
pub mod version;

pub use error::TypeError;
pub use identity::{CommitId, ProjectId, PromptId, Timestamp, UserId};
pub use label::{is_version_label, LabelClass, MAIN_LABEL, PROD_LABEL};
pub use version::{next_version, Version, VersionAllocator};
