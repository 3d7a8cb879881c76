//! Word-level comparison of prompt texts.
//!
//! Uses the `similar` crate (Myers diff over word tokens) for the raw diff,
//! then reshapes the chunk list so short edits carry some surrounding words.

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use crate::chunk::{ChunkKind, Comparison, DiffChunk, DiffStats};

/// Edits shorter than this many words borrow preceding context.
pub const DEFAULT_CONTEXT_WORDS: usize = 5;

/// Configured comparison pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEngine {
    context_words: usize,
}

impl DiffEngine {
    pub fn new(context_words: usize) -> Self {
        Self { context_words }
    }

    pub fn context_words(&self) -> usize {
        self.context_words
    }

    /// Compare `old` against `new`.
    pub fn compare(&self, old: &str, new: &str) -> Comparison {
        let raw = word_chunks(old, new);
        let stats = DiffStats::from_chunks(&raw);
        let chunks = merge_chunks(expand_context(raw, self.context_words));
        Comparison { chunks, stats }
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WORDS)
    }
}

/// [`DiffEngine::compare`] with the default context threshold.
///
/// # Examples
///
/// ```
/// use pvc_diff::{compare, DiffChunk};
///
/// let cmp = compare("a b c", "a b c");
/// assert_eq!(cmp.chunks, vec![DiffChunk::unchanged("a b c")]);
/// ```
pub fn compare(old: &str, new: &str) -> Comparison {
    DiffEngine::default().compare(old, new)
}

/// Raw word diff: consecutive tokens of the same kind grouped into one chunk.
pub fn word_chunks(old: &str, new: &str) -> Vec<DiffChunk> {
    let diff = TextDiff::from_words(old, new);
    diff.iter_all_changes()
        .fold(Vec::new(), |mut chunks: Vec<DiffChunk>, change| {
            let kind = ChunkKind::from(change.tag());
            match chunks.last_mut() {
                Some(last) if last.kind == kind => last.value.push_str(change.value()),
                _ => chunks.push(DiffChunk::new(kind, change.value())),
            }
            chunks
        })
}

/// Give short edits some context.
///
/// Scanning left to right, an added or removed chunk with fewer than
/// `threshold` words takes trailing words from the unchanged chunk right
/// before it until it reaches `threshold` words. The unchanged chunk always
/// keeps its first word, so the edit stays anchored to visible context.
pub fn expand_context(chunks: Vec<DiffChunk>, threshold: usize) -> Vec<DiffChunk> {
    let capacity = chunks.len();
    chunks
        .into_iter()
        .fold(Vec::with_capacity(capacity), |mut out: Vec<DiffChunk>, chunk| {
            let words = chunk.word_count();
            let short = chunk.kind.is_change() && words > 0 && words < threshold;
            let borrowed = match out.last_mut() {
                Some(prev) if short && prev.kind == ChunkKind::Unchanged => {
                    let spare = prev.word_count().saturating_sub(1);
                    let take = (threshold - words).min(spare);
                    if take > 0 {
                        let at = trailing_words_start(&prev.value, take);
                        prev.value.split_off(at)
                    } else {
                        String::new()
                    }
                }
                _ => String::new(),
            };
            out.push(DiffChunk::new(chunk.kind, borrowed + &chunk.value));
            out
        })
}

/// Drop whitespace-only chunks and join neighbours of the same kind.
///
/// Whitespace dropped between two chunks that end up joined is kept inside
/// the joined value so words do not run together.
pub fn merge_chunks(chunks: Vec<DiffChunk>) -> Vec<DiffChunk> {
    let mut out: Vec<DiffChunk> = Vec::with_capacity(chunks.len());
    let mut gap = String::new();
    for chunk in chunks {
        if chunk.is_blank() {
            gap.push_str(&chunk.value);
            continue;
        }
        match out.last_mut() {
            Some(prev) if prev.kind == chunk.kind => {
                if gap.is_empty() && needs_separator(&prev.value, &chunk.value) {
                    prev.value.push(' ');
                }
                prev.value.push_str(&gap);
                prev.value.push_str(&chunk.value);
            }
            _ => out.push(chunk),
        }
        gap.clear();
    }
    out
}

/// Byte offset where the last `count` words of `text` begin.
///
/// `count` must not exceed the number of words in `text`.
fn trailing_words_start(text: &str, count: usize) -> usize {
    let mut starts = Vec::new();
    let mut in_word = false;
    for (i, ch) in text.char_indices() {
        let ws = ch.is_whitespace();
        if !ws && !in_word {
            starts.push(i);
        }
        in_word = !ws;
    }
    starts
        .len()
        .checked_sub(count)
        .and_then(|idx| starts.get(idx).copied())
        .unwrap_or(0)
}

fn needs_separator(left: &str, right: &str) -> bool {
    let left_ws = left.chars().last().is_some_and(char::is_whitespace);
    let right_ws = right.chars().next().is_some_and(char::is_whitespace);
    !left_ws && !right_ws
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(chunks: &[DiffChunk]) -> Vec<ChunkKind> {
        chunks.iter().map(|c| c.kind).collect()
    }

    fn rebuild(chunks: &[DiffChunk], keep: ChunkKind) -> String {
        chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Unchanged || c.kind == keep)
            .map(|c| c.value.as_str())
            .collect()
    }

    // ---- Raw word diff ----

    #[test]
    fn identical_texts_single_unchanged_chunk() {
        let cmp = compare("a b c", "a b c");
        assert_eq!(cmp.chunks, vec![DiffChunk::unchanged("a b c")]);
        assert!(cmp.is_identical());
    }

    #[test]
    fn empty_inputs() {
        assert!(compare("", "").chunks.is_empty());
        assert_eq!(compare("", "x y").chunks, vec![DiffChunk::added("x y")]);
        assert_eq!(compare("x y", "").chunks, vec![DiffChunk::removed("x y")]);
    }

    #[test]
    fn raw_chunks_reconstruct_both_sides() {
        let old = "You are a helpful assistant. Answer briefly.";
        let new = "You are a friendly assistant. Answer briefly and politely.";
        let raw = word_chunks(old, new);
        assert_eq!(rebuild(&raw, ChunkKind::Removed), old);
        assert_eq!(rebuild(&raw, ChunkKind::Added), new);
    }

    #[test]
    fn raw_chunks_alternate_kinds() {
        let raw = word_chunks("one two three four", "one 2 three four five");
        for pair in raw.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    // ---- Context expansion ----

    #[test]
    fn short_addition_borrows_context() {
        let cmp = compare("a b c", "a b c d");
        assert_eq!(
            cmp.chunks,
            vec![DiffChunk::unchanged("a "), DiffChunk::added("b c d")]
        );
        assert_eq!(cmp.stats.words_added, 1);
    }

    #[test]
    fn borrowing_stops_at_threshold() {
        let cmp = compare("a b c d e f", "a b c d e f g");
        assert_eq!(
            cmp.chunks,
            vec![DiffChunk::unchanged("a b "), DiffChunk::added("c d e f g")]
        );
    }

    #[test]
    fn long_addition_is_left_alone() {
        let cmp = compare(
            "one two three",
            "one two three four five six seven eight nine",
        );
        assert_eq!(
            cmp.chunks,
            vec![
                DiffChunk::unchanged("one two three"),
                DiffChunk::added(" four five six seven eight nine"),
            ]
        );
    }

    #[test]
    fn expansion_only_borrows_from_unchanged_neighbour() {
        let chunks = vec![
            DiffChunk::unchanged("alpha beta gamma "),
            DiffChunk::removed("old"),
            DiffChunk::added("new"),
        ];
        let out = expand_context(chunks, 5);
        assert_eq!(
            out,
            vec![
                DiffChunk::unchanged("alpha "),
                DiffChunk::removed("beta gamma old"),
                DiffChunk::added("new"),
            ]
        );
    }

    #[test]
    fn expansion_keeps_one_anchor_word() {
        let chunks = vec![DiffChunk::unchanged("solo "), DiffChunk::added("x")];
        let out = expand_context(chunks.clone(), 5);
        assert_eq!(out, chunks);
    }

    #[test]
    fn expansion_without_preceding_chunk() {
        let chunks = vec![DiffChunk::added("x"), DiffChunk::unchanged(" rest of it")];
        assert_eq!(expand_context(chunks.clone(), 5), chunks);
    }

    #[test]
    fn expansion_ignores_blank_changes() {
        let chunks = vec![DiffChunk::unchanged("a b c d"), DiffChunk::added(" ")];
        assert_eq!(expand_context(chunks.clone(), 5), chunks);
    }

    #[test]
    fn expansion_respects_custom_threshold() {
        let chunks = vec![DiffChunk::unchanged("a b c d"), DiffChunk::added(" e")];
        let out = expand_context(chunks, 2);
        assert_eq!(
            out,
            vec![DiffChunk::unchanged("a b c "), DiffChunk::added("d e")]
        );
        assert_eq!(DiffEngine::new(2).context_words(), 2);
    }

    #[test]
    fn expansion_does_not_mutate_input_order() {
        let chunks = vec![
            DiffChunk::unchanged("a b c "),
            DiffChunk::removed("x"),
            DiffChunk::unchanged(" d e f g h "),
            DiffChunk::added("y"),
        ];
        let out = expand_context(chunks, 5);
        assert_eq!(
            kinds(&out),
            vec![
                ChunkKind::Unchanged,
                ChunkKind::Removed,
                ChunkKind::Unchanged,
                ChunkKind::Added
            ]
        );
        assert_eq!(out[1].value, "b c x");
        assert_eq!(out[3].value, "e f g h y");
    }

    // ---- Merge pass ----

    #[test]
    fn merge_drops_blank_and_joins_same_kind() {
        let chunks = vec![
            DiffChunk::removed("a"),
            DiffChunk::unchanged(" "),
            DiffChunk::removed("b"),
            DiffChunk::added("c"),
        ];
        assert_eq!(
            merge_chunks(chunks),
            vec![DiffChunk::removed("a b"), DiffChunk::added("c")]
        );
    }

    #[test]
    fn merge_joins_adjacent_without_gap() {
        let chunks = vec![DiffChunk::added("x "), DiffChunk::added("y")];
        assert_eq!(merge_chunks(chunks), vec![DiffChunk::added("x y")]);

        let glued = vec![DiffChunk::added("x"), DiffChunk::added("y")];
        assert_eq!(merge_chunks(glued), vec![DiffChunk::added("x y")]);
    }

    #[test]
    fn merge_discards_gap_between_different_kinds() {
        let chunks = vec![
            DiffChunk::removed("a"),
            DiffChunk::unchanged("  "),
            DiffChunk::added("b"),
        ];
        assert_eq!(
            merge_chunks(chunks),
            vec![DiffChunk::removed("a"), DiffChunk::added("b")]
        );
    }

    #[test]
    fn merged_output_has_no_blank_or_repeated_kinds() {
        let cmp = compare(
            "Be concise. Use bullet points. Cite sources.",
            "Be thorough. Use numbered lists. Cite sources always.",
        );
        assert!(cmp.chunks.iter().all(|c| !c.is_blank()));
        for pair in cmp.chunks.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn comparison_is_deterministic() {
        let old = "The assistant answers in English with a formal tone.";
        let new = "The assistant answers in French with a casual tone.";
        assert_eq!(compare(old, new), compare(old, new));
    }

    #[test]
    fn stats_count_raw_words() {
        let cmp = compare("keep this word", "keep that word");
        assert_eq!(cmp.stats.words_removed, 1);
        assert_eq!(cmp.stats.words_added, 1);
        assert!(!cmp.is_identical());
    }

    #[test]
    fn trailing_word_offsets() {
        assert_eq!(trailing_words_start("a b c", 1), 4);
        assert_eq!(trailing_words_start("a b c", 2), 2);
        assert_eq!(trailing_words_start("  a b", 2), 2);
        assert_eq!(trailing_words_start("a\n\nb ", 1), 3);
    }
}
