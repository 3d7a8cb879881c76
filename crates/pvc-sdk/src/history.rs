//! Commit history views.
//!
//! A prompt's commits split into two disjoint sets: released commits carry at
//! least one `vMAJOR.MINOR.PATCH` label, working commits carry none.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use pvc_store::{Commit, CommitFilter, CommitStore, Page};
use pvc_tags::TagLedger;
use pvc_types::{CommitId, PromptId, Version, MAIN_LABEL, PROD_LABEL};

use crate::error::SdkResult;

/// A commit together with its labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitView {
    pub commit: Commit,
    pub labels: BTreeSet<String>,
}

impl CommitView {
    pub fn new(commit: Commit, labels: BTreeSet<String>) -> Self {
        Self { commit, labels }
    }

    pub fn id(&self) -> &CommitId {
        &self.commit.id
    }

    pub fn is_prod(&self) -> bool {
        self.labels.contains(PROD_LABEL)
    }

    pub fn is_main(&self) -> bool {
        self.labels.contains(MAIN_LABEL)
    }

    /// Highest version label on the commit.
    pub fn version(&self) -> Option<Version> {
        self.labels.iter().filter_map(|l| Version::parse(l)).max()
    }
}

/// A page of commits without a version label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingView {
    pub commits: Vec<CommitView>,
    pub total: usize,
    pub current_prod: Option<Commit>,
}

/// One released commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub commit: Commit,
    pub version: Version,
    pub is_current_prod: bool,
    pub labels: BTreeSet<String>,
}

/// A page of released commits, highest version first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseView {
    pub releases: Vec<Release>,
    pub total: usize,
}

/// A page of every commit of a prompt, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPage {
    pub commits: Vec<CommitView>,
    pub total: usize,
}

fn released_ids(ledger: &dyn TagLedger, prompt: &PromptId) -> SdkResult<HashSet<CommitId>> {
    Ok(ledger
        .labelled_commits(prompt)?
        .into_iter()
        .filter(|(_, labels)| labels.iter().any(|l| Version::parse(l).is_some()))
        .map(|(id, _)| id)
        .collect())
}

fn with_labels(ledger: &dyn TagLedger, commits: Vec<Commit>) -> SdkResult<Vec<CommitView>> {
    commits
        .into_iter()
        .map(|c| {
            let labels = ledger.labels_for_commit(&c.id)?;
            Ok(CommitView::new(c, labels))
        })
        .collect()
}

/// All commits of `prompt` regardless of release state.
pub fn list_commits(
    store: &dyn CommitStore,
    ledger: &dyn TagLedger,
    prompt: &PromptId,
    page: Page,
) -> SdkResult<CommitPage> {
    let (commits, total) = store.list_by_prompt(prompt, &CommitFilter::All, page)?;
    let commits = with_labels(ledger, commits)?;
    debug!(prompt = %prompt, shown = commits.len(), total, "listed commits");
    Ok(CommitPage { commits, total })
}

/// Working commits of `prompt`, newest first.
pub fn list_working(
    store: &dyn CommitStore,
    ledger: &dyn TagLedger,
    prompt: &PromptId,
    page: Page,
) -> SdkResult<WorkingView> {
    let released = released_ids(ledger, prompt)?;
    let (commits, total) =
        store.list_by_prompt(prompt, &CommitFilter::Excluding(released), page)?;

    let commits = with_labels(ledger, commits)?;

    let current_prod = match ledger.find_by_label(prompt, PROD_LABEL)? {
        Some(id) => store.get(&id)?,
        None => None,
    };

    debug!(prompt = %prompt, shown = commits.len(), total, "listed working commits");
    Ok(WorkingView {
        commits,
        total,
        current_prod,
    })
}

/// Released commits of `prompt`, sorted by version descending.
pub fn list_releases(
    store: &dyn CommitStore,
    ledger: &dyn TagLedger,
    prompt: &PromptId,
    page: Page,
) -> SdkResult<ReleaseView> {
    let released = released_ids(ledger, prompt)?;
    let (commits, _) =
        store.list_by_prompt(prompt, &CommitFilter::Only(released), Page::unbounded())?;

    let mut releases = Vec::with_capacity(commits.len());
    for commit in commits {
        let labels = ledger.labels_for_commit(&commit.id)?;
        let Some(version) = labels.iter().filter_map(|l| Version::parse(l)).max() else {
            continue;
        };
        releases.push(Release {
            is_current_prod: labels.contains(PROD_LABEL),
            commit,
            version,
            labels,
        });
    }
    releases.sort_by(|a, b| b.version.cmp(&a.version));

    let total = releases.len();
    let releases = page.apply(releases);
    debug!(prompt = %prompt, shown = releases.len(), total, "listed releases");
    Ok(ReleaseView { releases, total })
}
