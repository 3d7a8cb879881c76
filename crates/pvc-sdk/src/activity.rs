//! Activity notifications.
//!
//! The repository reports commit and promotion events to an
//! [`ActivitySink`]. Delivery is fire-and-forget: a failing sink is logged
//! and never fails the operation that produced the event.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use pvc_types::{CommitId, PromptId, UserId, Version};

/// Something that happened to a prompt's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    CommitCreated {
        prompt: PromptId,
        commit: CommitId,
        author: UserId,
    },
    CommitAmended {
        prompt: PromptId,
        commit: CommitId,
    },
    CommitDeleted {
        prompt: PromptId,
        commit: CommitId,
    },
    PushedToProd {
        prompt: PromptId,
        commit: CommitId,
        version: Version,
    },
}

impl ActivityEvent {
    pub fn prompt(&self) -> &PromptId {
        match self {
            Self::CommitCreated { prompt, .. }
            | Self::CommitAmended { prompt, .. }
            | Self::CommitDeleted { prompt, .. }
            | Self::PushedToProd { prompt, .. } => prompt,
        }
    }

    pub fn commit(&self) -> &CommitId {
        match self {
            Self::CommitCreated { commit, .. }
            | Self::CommitAmended { commit, .. }
            | Self::CommitDeleted { commit, .. }
            | Self::PushedToProd { commit, .. } => commit,
        }
    }

    /// Short machine-readable name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CommitCreated { .. } => "commit_created",
            Self::CommitAmended { .. } => "commit_amended",
            Self::CommitDeleted { .. } => "commit_deleted",
            Self::PushedToProd { .. } => "pushed_to_prod",
        }
    }
}

#[derive(Debug, Error)]
#[error("activity sink failed: {0}")]
pub struct ActivityError(pub String);

/// Receiver of activity events.
pub trait ActivitySink: Send + Sync {
    fn record(&self, event: &ActivityEvent) -> Result<(), ActivityError>;
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NoOpActivity;

impl ActivitySink for NoOpActivity {
    fn record(&self, _event: &ActivityEvent) -> Result<(), ActivityError> {
        Ok(())
    }
}

/// Emits each event as an `info` tracing event.
#[derive(Debug, Default)]
pub struct TracingActivity;

impl ActivitySink for TracingActivity {
    fn record(&self, event: &ActivityEvent) -> Result<(), ActivityError> {
        info!(
            kind = event.kind(),
            prompt = %event.prompt(),
            commit = %event.commit(),
            "activity"
        );
        Ok(())
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct RecordingActivity {
    events: Mutex<Vec<ActivityEvent>>,
}

impl RecordingActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far, oldest first.
    pub fn events(&self) -> Vec<ActivityEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActivitySink for RecordingActivity {
    fn record(&self, event: &ActivityEvent) -> Result<(), ActivityError> {
        self.events
            .lock()
            .map_err(|e| ActivityError(e.to_string()))?
            .push(event.clone());
        Ok(())
    }
}

/// Deliver `event`, logging and swallowing any failure.
pub(crate) fn notify(sink: &dyn ActivitySink, event: ActivityEvent) {
    if let Err(err) = sink.record(&event) {
        warn!(kind = event.kind(), prompt = %event.prompt(), error = %err, "activity notification dropped");
    }
}
