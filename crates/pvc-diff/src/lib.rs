//! Diff engine for prompt version control.
//!
//! Compares two prompt texts word by word and post-processes the result into
//! chunks that read well in a review UI.
//!
//! # Pipeline
//!
//! 1. [`word_chunks`] -- Myers word diff, consecutive tokens of one kind grouped
//! 2. [`expand_context`] -- short edits borrow trailing words from the
//!    preceding unchanged chunk
//! 3. [`merge_chunks`] -- whitespace-only chunks dropped, same-kind neighbours joined
//!
//! [`DiffEngine::compare`] runs all three. Comparison is pure and never fails.

pub mod chunk;
pub mod word_diff;

pub use chunk::{ChunkKind, Comparison, DiffChunk, DiffStats};
pub use word_diff::{compare, expand_context, merge_chunks, word_chunks, DiffEngine, DEFAULT_CONTEXT_WORDS};
