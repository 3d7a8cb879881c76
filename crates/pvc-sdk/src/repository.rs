use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use pvc_diff::DiffEngine;
use pvc_store::{Commit, CommitStore, CommitUpdate, InMemoryCommitStore, NewCommit, Prompt};
use pvc_tags::{InMemoryTagLedger, TagLedger, TagOp};
use pvc_types::{
    CommitId, ProjectId, PromptId, UserId, VersionAllocator, MAIN_LABEL, PROD_LABEL,
};

use crate::activity::{notify, ActivityEvent, ActivitySink, NoOpActivity};
use crate::compare::CommitComparison;
use crate::config::RepoConfig;
use crate::error::{SdkError, SdkResult};
use crate::history::{self, CommitPage, CommitView, ReleaseView, WorkingView};
use crate::locks::PromptLocks;
use crate::promotion::{self, Promotion};

/// High-level prompt versioning API.
///
/// Ties a [`CommitStore`] and a [`TagLedger`] together and owns the
/// operations that span both: first-commit `main` assignment, promotion to
/// production, cascading deletes, and the history views. Read-modify-write
/// sequences on a prompt's labels run under a per-prompt lock.
pub struct PromptRepo {
    store: Arc<dyn CommitStore>,
    ledger: Arc<dyn TagLedger>,
    activity: Arc<dyn ActivitySink>,
    config: RepoConfig,
    allocator: VersionAllocator,
    diff: DiffEngine,
    locks: PromptLocks,
}

impl PromptRepo {
    /// A repository backed by in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCommitStore::new()),
            Arc::new(InMemoryTagLedger::new()),
        )
    }

    pub fn new(store: Arc<dyn CommitStore>, ledger: Arc<dyn TagLedger>) -> Self {
        let config = RepoConfig::default();
        Self {
            store,
            ledger,
            activity: Arc::new(NoOpActivity),
            allocator: config.allocator(),
            diff: config.diff_engine(),
            config,
            locks: PromptLocks::new(),
        }
    }

    pub fn with_activity(mut self, sink: Arc<dyn ActivitySink>) -> Self {
        self.activity = sink;
        self
    }

    pub fn with_config(mut self, config: RepoConfig) -> Self {
        self.allocator = config.allocator();
        self.diff = config.diff_engine();
        self.config = config;
        self
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    // ---- Prompts ----

    pub fn register_prompt(&self, project: ProjectId, name: impl Into<String>) -> SdkResult<Prompt> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SdkError::Validation("prompt name must not be empty".into()));
        }
        let prompt = Prompt::new(project, name);
        self.store.insert_prompt(prompt.clone())?;
        info!(prompt = %prompt.id, name = %prompt.name, "registered prompt");
        Ok(prompt)
    }

    pub fn prompt(&self, id: &PromptId) -> SdkResult<Prompt> {
        self.store
            .prompt(id)?
            .ok_or_else(|| SdkError::NotFound(format!("prompt {id}")))
    }

    // ---- Commits ----

    /// Create a commit. The first commit ever created for a prompt receives
    /// the `main` label; later commits never do, even after it is deleted.
    pub fn create_commit(&self, new: NewCommit) -> SdkResult<CommitView> {
        let prompt = new.prompt_id;
        let view = self.locks.with_prompt(&prompt, || {
            let commit = self.store.create(new)?;
            let mut labels = BTreeSet::new();
            if !self.ledger.main_assigned(&prompt)? {
                if let Err(err) = self.ledger.attach(&prompt, &commit.id, MAIN_LABEL) {
                    self.store.delete(&commit.id)?;
                    return Err(err.into());
                }
                labels.insert(MAIN_LABEL.to_string());
            }
            Ok(CommitView::new(commit, labels))
        })?;

        info!(
            prompt = %prompt,
            commit = %view.commit.id,
            main = view.is_main(),
            "created commit"
        );
        notify(
            self.activity.as_ref(),
            ActivityEvent::CommitCreated {
                prompt,
                commit: view.commit.id,
                author: view.commit.created_by.clone(),
            },
        );
        Ok(view)
    }

    pub fn get_commit(&self, id: &CommitId) -> SdkResult<CommitView> {
        let commit = self.require_commit(id)?;
        let labels = self.ledger.labels_for_commit(id)?;
        debug!(commit = %id, labels = labels.len(), "read commit");
        Ok(CommitView::new(commit, labels))
    }

    /// Amend the text fields of a commit. Identity fields never change.
    pub fn amend_commit(&self, id: &CommitId, update: &CommitUpdate) -> SdkResult<CommitView> {
        if update.is_empty() {
            return Err(SdkError::Validation("amend requires at least one field".into()));
        }
        let commit = self.store.amend(id, update)?;
        let labels = self.ledger.labels_for_commit(id)?;
        debug!(commit = %id, "amended commit");
        notify(
            self.activity.as_ref(),
            ActivityEvent::CommitAmended {
                prompt: commit.prompt_id,
                commit: commit.id,
            },
        );
        Ok(CommitView::new(commit, labels))
    }

    /// Delete a commit together with all of its labels.
    pub fn delete_commit(&self, id: &CommitId) -> SdkResult<Commit> {
        let prompt = self.require_commit(id)?.prompt_id;
        let (removed, labels) = self.locks.with_prompt(&prompt, || {
            let labels = self.ledger.detach_all(id)?;
            let removed = self.store.delete(id)?;
            Ok((removed, labels))
        })?;

        info!(prompt = %prompt, commit = %id, labels = ?labels, "deleted commit");
        notify(
            self.activity.as_ref(),
            ActivityEvent::CommitDeleted {
                prompt,
                commit: *id,
            },
        );
        Ok(removed)
    }

    /// Every commit written by `user`, newest first.
    pub fn commits_by_author(&self, user: &UserId) -> SdkResult<Vec<Commit>> {
        Ok(self.store.list_by_author(user)?)
    }

    // ---- Labels ----

    pub fn attach_label(&self, commit: &CommitId, label: &str) -> SdkResult<CommitView> {
        let prompt = self.require_commit(commit)?.prompt_id;
        self.locks.with_prompt(&prompt, || {
            self.require_commit(commit)?;
            Ok(self.ledger.attach(&prompt, commit, label)?)
        })?;
        debug!(commit = %commit, label, "attached label");
        self.get_commit(commit)
    }

    pub fn detach_label(&self, commit: &CommitId, label: &str) -> SdkResult<CommitView> {
        let prompt = self.require_commit(commit)?.prompt_id;
        self.ledger
            .transact(&prompt, &[TagOp::detach(*commit, label)])?;
        debug!(commit = %commit, label, "detached label");
        self.get_commit(commit)
    }

    pub fn labels_for_commit(&self, commit: &CommitId) -> SdkResult<BTreeSet<String>> {
        self.require_commit(commit)?;
        Ok(self.ledger.labels_for_commit(commit)?)
    }

    pub fn labels_for_prompt(&self, prompt: &PromptId) -> SdkResult<BTreeSet<String>> {
        Ok(self.ledger.labels_for_prompt(prompt)?)
    }

    /// The commit of `prompt` carrying `label`, compared exactly.
    pub fn find_by_label(&self, prompt: &PromptId, label: &str) -> SdkResult<Option<CommitView>> {
        self.ledger
            .find_by_label(prompt, label)?
            .map(|id| self.get_commit(&id))
            .transpose()
    }

    /// Like [`find_by_label`](Self::find_by_label) but ignoring ASCII case,
    /// so `"prod"` finds the production commit.
    pub fn find_by_label_ignore_case(
        &self,
        prompt: &PromptId,
        label: &str,
    ) -> SdkResult<Option<CommitView>> {
        self.ledger
            .find_by_label_ignore_case(prompt, label)?
            .map(|id| self.get_commit(&id))
            .transpose()
    }

    pub fn distinct_labels(&self) -> SdkResult<BTreeSet<String>> {
        Ok(self.ledger.distinct_labels()?)
    }

    pub fn search_labels(&self, query: &str) -> SdkResult<Vec<String>> {
        Ok(self.ledger.search_labels(query)?)
    }

    pub fn commits_with_label(&self, label: &str) -> SdkResult<Vec<(PromptId, CommitId)>> {
        Ok(self.ledger.commits_with_label(label)?)
    }

    // ---- Promotion ----

    /// Mark `commit` as production and record a new release version.
    ///
    /// Promotions of one prompt are serialized. On
    /// [`SdkError::InvalidVersionState`] nothing changed and the call may be
    /// retried.
    pub fn push_to_prod(&self, commit: &CommitId) -> SdkResult<Promotion> {
        let prompt = self.require_commit(commit)?.prompt_id;
        let promotion = self.locks.with_prompt(&prompt, || {
            let current = self.require_commit(commit)?;
            promotion::push_to_prod(self.ledger.as_ref(), &self.allocator, current)
        })?;

        notify(
            self.activity.as_ref(),
            ActivityEvent::PushedToProd {
                prompt,
                commit: *commit,
                version: promotion.version,
            },
        );
        Ok(promotion)
    }

    /// The commit currently serving production for `prompt`.
    pub fn production_commit(&self, prompt: &PromptId) -> SdkResult<CommitView> {
        self.prompt(prompt)?;
        self.find_by_label(prompt, PROD_LABEL)?
            .ok_or_else(|| SdkError::NotFound(format!("prompt {prompt} has no production commit")))
    }

    // ---- History ----

    /// Every commit of `prompt`, newest first. `limit` defaults to and is
    /// clamped by the history configuration.
    pub fn list_commits(
        &self,
        prompt: &PromptId,
        limit: Option<usize>,
        offset: usize,
    ) -> SdkResult<CommitPage> {
        self.prompt(prompt)?;
        let page = self.config.history.page(limit, offset);
        history::list_commits(self.store.as_ref(), self.ledger.as_ref(), prompt, page)
    }

    /// Commits without a version label, newest first. `limit` defaults to
    /// and is clamped by the history configuration.
    pub fn list_working(
        &self,
        prompt: &PromptId,
        limit: Option<usize>,
        offset: usize,
    ) -> SdkResult<WorkingView> {
        self.prompt(prompt)?;
        let page = self.config.history.page(limit, offset);
        history::list_working(self.store.as_ref(), self.ledger.as_ref(), prompt, page)
    }

    /// Released commits, highest version first.
    pub fn list_releases(
        &self,
        prompt: &PromptId,
        limit: Option<usize>,
        offset: usize,
    ) -> SdkResult<ReleaseView> {
        self.prompt(prompt)?;
        let page = self.config.history.page(limit, offset);
        history::list_releases(self.store.as_ref(), self.ledger.as_ref(), prompt, page)
    }

    // ---- Comparison ----

    pub fn compare_commits(&self, old: &CommitId, new: &CommitId) -> SdkResult<CommitComparison> {
        let old = self.require_commit(old)?;
        let new = self.require_commit(new)?;
        Ok(CommitComparison::between(&self.diff, &old, &new))
    }

    fn require_commit(&self, id: &CommitId) -> SdkResult<Commit> {
        self.store
            .get(id)?
            .ok_or_else(|| SdkError::NotFound(format!("commit {id}")))
    }
}

impl fmt::Debug for PromptRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRepo")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::RecordingActivity;
    use pvc_types::Version;

    fn repo_with_prompt() -> (PromptRepo, PromptId) {
        let repo = PromptRepo::in_memory();
        let prompt = repo
            .register_prompt(ProjectId::new("proj-1"), "support-bot")
            .unwrap();
        (repo, prompt.id)
    }

    fn commit(repo: &PromptRepo, prompt: PromptId, text: &str) -> CommitView {
        repo.create_commit(
            NewCommit::new(prompt, text, "How do I reset my password?", UserId::new("alice"))
                .with_message(format!("set {text}")),
        )
        .unwrap()
    }

    // ---- Test 1: First commit gets main, second does not ----

    #[test]
    fn first_commit_gets_main() {
        let (repo, prompt) = repo_with_prompt();
        let first = commit(&repo, prompt, "one");
        let second = commit(&repo, prompt, "two");
        assert!(first.is_main());
        assert!(!second.is_main());
        assert!(repo.get_commit(&second.commit.id).unwrap().labels.is_empty());
        assert_eq!(
            repo.find_by_label(&prompt, MAIN_LABEL).unwrap().map(|v| v.commit.id),
            Some(first.commit.id)
        );
    }

    // ---- Test 2: Unknown prompt ----

    #[test]
    fn create_for_unknown_prompt() {
        let repo = PromptRepo::in_memory();
        let err = repo
            .create_commit(NewCommit::new(PromptId::new(), "s", "q", UserId::new("a")))
            .unwrap_err();
        assert!(matches!(err, SdkError::NotFound(_)));
    }

    // ---- Test 3: Get and amend ----

    #[test]
    fn amend_keeps_identity() {
        let (repo, prompt) = repo_with_prompt();
        let c = commit(&repo, prompt, "before");
        let amended = repo
            .amend_commit(&c.commit.id, &CommitUpdate::default().system_prompt("after"))
            .unwrap();
        assert_eq!(amended.commit.system_prompt, "after");
        assert_eq!(amended.commit.id, c.commit.id);
        assert_eq!(amended.commit.created_at, c.commit.created_at);
        assert_eq!(amended.commit.created_by, c.commit.created_by);
        assert!(amended.is_main());

        let err = repo
            .amend_commit(&c.commit.id, &CommitUpdate::default())
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));

        let err = repo
            .amend_commit(&CommitId::new(), &CommitUpdate::default().message("x"))
            .unwrap_err();
        assert!(matches!(err, SdkError::NotFound(_)));
    }

    // ---- Test 4: Delete cascades labels ----

    #[test]
    fn delete_removes_labels() {
        let (repo, prompt) = repo_with_prompt();
        let c = commit(&repo, prompt, "x");
        repo.attach_label(&c.commit.id, "reviewed").unwrap();
        repo.push_to_prod(&c.commit.id).unwrap();

        repo.delete_commit(&c.commit.id).unwrap();
        assert!(matches!(
            repo.get_commit(&c.commit.id).unwrap_err(),
            SdkError::NotFound(_)
        ));
        assert!(repo.labels_for_prompt(&prompt).unwrap().is_empty());
        assert!(repo.commits_with_label("reviewed").unwrap().is_empty());
        assert!(matches!(
            repo.delete_commit(&c.commit.id).unwrap_err(),
            SdkError::NotFound(_)
        ));
    }

    // ---- Test 5: Label attach and detach ----

    #[test]
    fn attach_and_detach_labels() {
        let (repo, prompt) = repo_with_prompt();
        let c = commit(&repo, prompt, "x");
        let view = repo.attach_label(&c.commit.id, "experiment").unwrap();
        assert!(view.labels.contains("experiment"));

        let err = repo.attach_label(&c.commit.id, "experiment").unwrap_err();
        assert!(matches!(err, SdkError::Conflict(_)));

        let view = repo.detach_label(&c.commit.id, "experiment").unwrap();
        assert!(!view.labels.contains("experiment"));

        let err = repo.detach_label(&c.commit.id, "experiment").unwrap_err();
        assert!(matches!(err, SdkError::NotFound(_)));

        let err = repo.detach_label(&c.commit.id, MAIN_LABEL).unwrap_err();
        assert!(matches!(err, SdkError::InvalidVersionState(_)));
    }

    // ---- Test 6: Malformed labels are validation errors ----

    #[test]
    fn malformed_labels_rejected() {
        let (repo, prompt) = repo_with_prompt();
        let c = commit(&repo, prompt, "x");
        for bad in ["v1.0", "v1.x.0", "", "has space"] {
            let err = repo.attach_label(&c.commit.id, bad).unwrap_err();
            assert!(matches!(err, SdkError::Validation(_)), "{bad:?}");
        }
    }

    // ---- Test 7: Push to prod ----

    #[test]
    fn push_to_prod_allocates_versions() {
        let (repo, prompt) = repo_with_prompt();
        let a = commit(&repo, prompt, "a");
        let b = commit(&repo, prompt, "b");

        let p1 = repo.push_to_prod(&a.commit.id).unwrap();
        assert_eq!(p1.version, Version::new(1, 0, 0));
        let p2 = repo.push_to_prod(&b.commit.id).unwrap();
        assert_eq!(p2.version, Version::new(1, 0, 1));
        assert_eq!(p2.previous_prod, Some(a.commit.id));

        let prod = repo.production_commit(&prompt).unwrap();
        assert_eq!(prod.commit.id, b.commit.id);
        assert!(!repo.get_commit(&a.commit.id).unwrap().is_prod());
    }

    // ---- Test 8: Production commit absent ----

    #[test]
    fn production_commit_missing() {
        let (repo, prompt) = repo_with_prompt();
        commit(&repo, prompt, "a");
        assert!(matches!(
            repo.production_commit(&prompt).unwrap_err(),
            SdkError::NotFound(_)
        ));
        assert!(matches!(
            repo.production_commit(&PromptId::new()).unwrap_err(),
            SdkError::NotFound(_)
        ));
        assert!(matches!(
            repo.push_to_prod(&CommitId::new()).unwrap_err(),
            SdkError::NotFound(_)
        ));
    }

    // ---- Test 9: Case-insensitive lookup ----

    #[test]
    fn lookup_ignoring_case() {
        let (repo, prompt) = repo_with_prompt();
        let a = commit(&repo, prompt, "a");
        repo.push_to_prod(&a.commit.id).unwrap();
        assert!(repo.find_by_label(&prompt, "prod").unwrap().is_none());
        let found = repo.find_by_label_ignore_case(&prompt, "prod").unwrap().unwrap();
        assert_eq!(found.commit.id, a.commit.id);
    }

    // ---- Test 10: Activity events ----

    #[test]
    fn activity_events_emitted() {
        let sink = Arc::new(RecordingActivity::new());
        let repo = PromptRepo::in_memory().with_activity(sink.clone());
        let prompt = repo.register_prompt(ProjectId::new("p"), "n").unwrap().id;
        let c = commit(&repo, prompt, "a");
        repo.amend_commit(&c.commit.id, &CommitUpdate::default().message("m"))
            .unwrap();
        repo.push_to_prod(&c.commit.id).unwrap();
        repo.delete_commit(&c.commit.id).unwrap();

        let kinds: Vec<_> = sink.events().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec!["commit_created", "commit_amended", "pushed_to_prod", "commit_deleted"]
        );
    }

    // ---- Test 11: Label catalogue ----

    #[test]
    fn label_catalogue() {
        let (repo, prompt) = repo_with_prompt();
        let a = commit(&repo, prompt, "a");
        let b = commit(&repo, prompt, "b");
        repo.attach_label(&a.commit.id, "Staging").unwrap();
        repo.attach_label(&b.commit.id, "staging-eu").unwrap();

        let all = repo.distinct_labels().unwrap();
        assert!(all.contains("main"));
        assert!(all.contains("Staging"));
        assert_eq!(repo.search_labels("STAG").unwrap(), vec!["Staging", "staging-eu"]);
        assert_eq!(
            repo.commits_with_label("staging-eu").unwrap(),
            vec![(prompt, b.commit.id)]
        );
    }

    // ---- Test 12: Commits by author ----

    #[test]
    fn commits_by_author() {
        let (repo, prompt) = repo_with_prompt();
        let a = commit(&repo, prompt, "a");
        repo.create_commit(NewCommit::new(prompt, "b", "q", UserId::new("dave")))
            .unwrap();
        let mine = repo.commits_by_author(&UserId::new("alice")).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, a.commit.id);
    }

    // ---- Test 13: Compare commits ----

    #[test]
    fn compare_two_commits() {
        let (repo, prompt) = repo_with_prompt();
        let a = commit(&repo, prompt, "Answer politely.");
        let b = commit(&repo, prompt, "Answer politely and briefly.");
        let cmp = repo.compare_commits(&a.commit.id, &b.commit.id).unwrap();
        assert!(cmp.user_query.is_identical());
        assert!(cmp.words_added() > 0);
        assert!(matches!(
            repo.compare_commits(&a.commit.id, &CommitId::new()).unwrap_err(),
            SdkError::NotFound(_)
        ));
    }

    // ---- Test 14: Config flows into allocation and paging ----

    #[test]
    fn config_is_applied() {
        let mut config = RepoConfig::default();
        config.release.initial_version = Version::new(0, 1, 0);
        config.history.max_page_size = 2;
        let repo = PromptRepo::in_memory().with_config(config);
        let prompt = repo.register_prompt(ProjectId::new("p"), "n").unwrap().id;
        for i in 0..4 {
            commit(&repo, prompt, &format!("c{i}"));
        }
        let working = repo.list_working(&prompt, Some(50), 0).unwrap();
        assert_eq!(working.commits.len(), 2);
        assert_eq!(working.total, 4);

        let first = working.commits[0].commit.id;
        assert_eq!(repo.push_to_prod(&first).unwrap().version, Version::new(0, 1, 0));
    }

    #[test]
    fn register_prompt_validation() {
        let repo = PromptRepo::in_memory();
        let err = repo.register_prompt(ProjectId::new("p"), "  ").unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert!(matches!(
            repo.prompt(&PromptId::new()).unwrap_err(),
            SdkError::NotFound(_)
        ));
        assert!(matches!(
            repo.list_working(&PromptId::new(), None, 0).unwrap_err(),
            SdkError::NotFound(_)
        ));
    }

    // ---- Test 15: main is never reassigned after its commit is deleted ----

    #[test]
    fn main_not_reassigned_after_delete() {
        let (repo, prompt) = repo_with_prompt();
        let first = commit(&repo, prompt, "one");
        repo.delete_commit(&first.commit.id).unwrap();

        let next = commit(&repo, prompt, "two");
        assert!(!next.is_main());
        assert!(repo.find_by_label(&prompt, MAIN_LABEL).unwrap().is_none());
    }

    // ---- Test 16: Deleting the newest release does not free its version ----

    #[test]
    fn deleted_release_version_not_reused() {
        let (repo, prompt) = repo_with_prompt();
        let a = commit(&repo, prompt, "a");
        let b = commit(&repo, prompt, "b");
        let c = commit(&repo, prompt, "c");
        repo.push_to_prod(&a.commit.id).unwrap();
        repo.push_to_prod(&b.commit.id).unwrap();
        repo.delete_commit(&b.commit.id).unwrap();

        let promotion = repo.push_to_prod(&c.commit.id).unwrap();
        assert_eq!(promotion.version, Version::new(1, 0, 2));
        let releases = repo.list_releases(&prompt, None, 0).unwrap();
        let versions: Vec<_> = releases.releases.iter().map(|r| r.version).collect();
        assert_eq!(versions, vec![Version::new(1, 0, 2), Version::new(1, 0, 0)]);
    }

    // ---- Test 17: Plain paginated listing covers every commit ----

    #[test]
    fn list_commits_pages_everything() {
        let (repo, prompt) = repo_with_prompt();
        let ids: Vec<_> = (0..5)
            .map(|i| commit(&repo, prompt, &format!("c{i}")).commit.id)
            .collect();
        repo.push_to_prod(&ids[2]).unwrap();

        let first = repo.list_commits(&prompt, Some(3), 0).unwrap();
        assert_eq!(first.total, 5);
        let shown: Vec<_> = first.commits.iter().map(|v| v.commit.id).collect();
        assert_eq!(shown, vec![ids[4], ids[3], ids[2]]);
        assert!(first.commits[2].is_prod());

        let rest = repo.list_commits(&prompt, Some(3), 3).unwrap();
        assert_eq!(rest.commits.len(), 2);
        assert!(rest.commits[1].is_main());
        assert!(matches!(
            repo.list_commits(&PromptId::new(), None, 0).unwrap_err(),
            SdkError::NotFound(_)
        ));
    }
}
