use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pvc_types::PromptId;

use crate::error::{SdkError, SdkResult};

/// One mutex per prompt, created on first use.
///
/// Operations that read the label state of a prompt and then write it back
/// (promotion, first-commit `main` assignment, deletion) run inside
/// [`PromptLocks::with_prompt`] so they observe each other's writes.
#[derive(Debug, Default)]
pub struct PromptLocks {
    locks: Mutex<HashMap<PromptId, Arc<Mutex<()>>>>,
}

impl PromptLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `prompt`'s lock.
    pub fn with_prompt<T>(&self, prompt: &PromptId, f: impl FnOnce() -> SdkResult<T>) -> SdkResult<T> {
        let lock = self.handle(prompt)?;
        let _guard = lock
            .lock()
            .map_err(|e| SdkError::Internal(format!("prompt lock poisoned: {e}")))?;
        f()
    }

    fn handle(&self, prompt: &PromptId) -> SdkResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| SdkError::Internal(format!("lock table poisoned: {e}")))?;
        Ok(Arc::clone(locks.entry(*prompt).or_default()))
    }
}
