use std::path::Path;

use serde::{Deserialize, Serialize};

use pvc_diff::{DiffEngine, DEFAULT_CONTEXT_WORDS};
use pvc_store::Page;
use pvc_types::{Version, VersionAllocator};

use crate::error::{SdkError, SdkResult};

/// Configuration for a [`PromptRepo`](crate::PromptRepo).
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub release: ReleaseConfig,
    pub diff: DiffConfig,
    pub history: HistoryConfig,
    pub drafting: DraftingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Version assigned on a prompt's first promotion.
    pub initial_version: Version,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            initial_version: Version::INITIAL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Changed chunks shorter than this borrow preceding context words.
    pub context_words: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_words: DEFAULT_CONTEXT_WORDS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Page size used when the caller gives no limit.
    pub default_page_size: usize,
    /// Upper bound on any requested limit.
    pub max_page_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 9,
            max_page_size: 100,
        }
    }
}

impl HistoryConfig {
    /// Build a listing window, defaulting and clamping `limit`.
    pub fn page(&self, limit: Option<usize>, offset: usize) -> Page {
        let limit = limit
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);
        Page::new(limit, offset)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftingConfig {
    /// Model requested from the text-completion collaborator.
    pub model: String,
    /// Drafted messages are cut to this many characters.
    pub max_message_chars: usize,
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".into(),
            max_message_chars: 72,
        }
    }
}

impl RepoConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn allocator(&self) -> VersionAllocator {
        VersionAllocator::new(self.release.initial_version)
    }

    pub fn diff_engine(&self) -> DiffEngine {
        DiffEngine::new(self.diff.context_words)
    }

    fn validate(&self) -> SdkResult<()> {
        if self.history.max_page_size == 0 {
            return Err(SdkError::Config("history.max_page_size must be positive".into()));
        }
        if self.drafting.max_message_chars == 0 {
            return Err(SdkError::Config(
                "drafting.max_message_chars must be positive".into(),
            ));
        }
        Ok(())
    }
}
