//! Tag ledger for prompt version control.
//!
//! Tags are (commit, label) associations. Most labels are free-form, but
//! three classes carry policy:
//!
//! - **`main`** marks the first commit of a prompt. One per prompt, permanent.
//! - **`PROD`** marks the commit serving production. At most one per prompt;
//!   it moves between commits on promotion.
//! - **Version labels** (`vMAJOR.MINOR.PATCH`) form the release history.
//!   They strictly increase per prompt and are never detached.
//!
//! The ledger enforces these the way a database enforces unique constraints:
//! a write that would break one fails and leaves state untouched.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ledger operations
//! - [`types`] -- [`TagOp`], the unit of a ledger transaction
//! - [`traits`] -- The [`TagLedger`] trait defining the storage interface
//! - [`names`] -- Label validation
//! - [`memory`] -- In-memory [`InMemoryTagLedger`]

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{Result, TagError};
pub use memory::InMemoryTagLedger;
pub use names::{validate_label, MAX_LABEL_LEN};
pub use traits::TagLedger;
pub use types::TagOp;
