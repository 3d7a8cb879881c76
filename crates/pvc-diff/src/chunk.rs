use serde::{Deserialize, Serialize};
use similar::ChangeTag;

/// Whether a run of words was added, removed, or kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Added,
    Removed,
    Unchanged,
}

impl ChunkKind {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl From<ChangeTag> for ChunkKind {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => Self::Unchanged,
            ChangeTag::Delete => Self::Removed,
            ChangeTag::Insert => Self::Added,
        }
    }
}

/// A contiguous run of text of one kind. Whitespace between words is kept
/// in `value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffChunk {
    pub value: String,
    pub kind: ChunkKind,
}

impl DiffChunk {
    pub fn new(kind: ChunkKind, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self::new(ChunkKind::Added, value)
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self::new(ChunkKind::Removed, value)
    }

    pub fn unchanged(value: impl Into<String>) -> Self {
        Self::new(ChunkKind::Unchanged, value)
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.value.split_whitespace().count()
    }

    /// Returns `true` if the chunk holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Word totals of the raw diff, before context expansion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub words_added: usize,
    pub words_removed: usize,
    pub words_unchanged: usize,
}

impl DiffStats {
    pub fn from_chunks(chunks: &[DiffChunk]) -> Self {
        chunks.iter().fold(Self::default(), |mut stats, chunk| {
            let words = chunk.word_count();
            match chunk.kind {
                ChunkKind::Added => stats.words_added += words,
                ChunkKind::Removed => stats.words_removed += words,
                ChunkKind::Unchanged => stats.words_unchanged += words,
            }
            stats
        })
    }
}

/// The result of comparing two texts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub chunks: Vec<DiffChunk>,
    pub stats: DiffStats,
}

impl Comparison {
    /// Returns `true` if the texts had no word-level differences.
    pub fn is_identical(&self) -> bool {
        self.stats.words_added == 0 && self.stats.words_removed == 0
    }
}
