//! Task store use-case service.
//!
//! # Responsibility
//! - Own the authoritative newest-first task list.
//! - Expose add/toggle/edit/delete mutations with variant-specific policies.
//! - Track delayed commits (completion, removal) explicitly.
//!
//! # Invariants
//! - The in-memory list is replaced only after the repository accepted the
//!   new list, so memory and storage never diverge.
//! - At most one task is in edit mode (`editing` is a single `Option`).
//! - A task has at most one pending operation; further toggle/delete/edit
//!   interactions on it are ignored until the operation commits.
//! - Edit mode and pending operations are never persisted.

use crate::config::BoardVariant;
use crate::model::task::{normalize_text, Task, TaskId, TaskIdGenerator};
use crate::model::task_list::TaskList;
use crate::repo::task_list_repo::{RepoError, TaskListRepository};
use log::{debug, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Delay between a lovely-variant completion and its commit, leaving room
/// for the checkbox animation.
pub const COMPLETE_COMMIT_DELAY_MS: u64 = 300;
/// Duration of the lovely-variant exit animation before a removal commits.
pub const EXIT_ANIMATION_MS: u64 = 400;
/// Prompt shown before a premium-variant delete.
pub const DELETE_CONFIRM_PROMPT: &str = "Delete this task?";

/// Blocking yes/no prompt used to gate destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Kind of a delayed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    /// Task will be marked completed.
    Completion,
    /// Task will be removed from the list.
    Removal,
}

/// Mutation computed at interaction time, applied when `due_at_ms` passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOp {
    pub kind: PendingKind,
    pub due_at_ms: u64,
}

/// Why an interaction left state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    BlankText,
    UnknownTask,
    /// The task already has a delayed operation in flight.
    PendingOperation,
    /// The operation does not exist in the active variant.
    Unsupported,
    /// `save_edit` targeted a task that is not in edit mode.
    NotEditing,
    /// A handler from an earlier render was activated.
    StaleHandler,
}

/// Observable result of one store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// State changed; persisted when the change is domain state.
    Applied,
    /// A delayed operation was recorded for the task.
    Scheduled { kind: PendingKind, due_at_ms: u64 },
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// The user declined the confirmation prompt.
    Declined,
}

impl StoreOutcome {
    pub fn changed_state(self) -> bool {
        matches!(self, Self::Applied | Self::Scheduled { .. })
    }
}

/// Store-layer error. Only persistence can fail.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Authoritative board state plus its persistence adapter.
pub struct TaskStore<R: TaskListRepository> {
    repo: R,
    variant: BoardVariant,
    list: TaskList,
    ids: TaskIdGenerator,
    editing: Option<TaskId>,
    pending: BTreeMap<TaskId, PendingOp>,
}

impl<R: TaskListRepository> TaskStore<R> {
    /// Loads the persisted list and seeds the id generator past every
    /// stored id.
    pub fn open(repo: R, variant: BoardVariant) -> StoreResult<Self> {
        let list = repo.load()?;
        let mut ids = TaskIdGenerator::new();
        if let Some(max_id) = list.max_id() {
            ids.observe(max_id);
        }
        Ok(Self {
            repo,
            variant,
            list,
            ids,
            editing: None,
            pending: BTreeMap::new(),
        })
    }

    pub fn variant(&self) -> BoardVariant {
        self.variant
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Task currently in edit mode.
    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn pending(&self, id: TaskId) -> Option<PendingOp> {
        self.pending.get(&id).copied()
    }

    pub fn pending_ops(&self) -> &BTreeMap<TaskId, PendingOp> {
        &self.pending
    }

    /// Earliest due time among pending operations, for host timers.
    pub fn next_due_at(&self) -> Option<u64> {
        self.pending.values().map(|op| op.due_at_ms).min()
    }

    /// Prepends a new open task built from `text`.
    pub fn add(&mut self, text: &str, now_ms: u64) -> StoreResult<StoreOutcome> {
        let Some(text) = normalize_text(text) else {
            debug!("event=task_add module=store status=ignored reason=blank_text");
            return Ok(StoreOutcome::Ignored(IgnoreReason::BlankText));
        };

        let task = Task {
            id: self.ids.next(now_ms),
            text,
            completed: false,
        };
        let task_id = task.id;
        let next = self.list.prepended(task);
        self.commit(next)?;
        info!(
            "event=task_add module=store status=ok task_id={} tasks={}",
            task_id,
            self.list.len()
        );
        Ok(StoreOutcome::Applied)
    }

    /// Flips completion of one task.
    ///
    /// Lovely variant: an open task is scheduled for completion instead of
    /// being completed right away; reopening stays immediate.
    pub fn toggle_complete(&mut self, id: TaskId, now_ms: u64) -> StoreResult<StoreOutcome> {
        let Some(task) = self.list.get(id) else {
            return Ok(self.ignore("task_toggle", id, IgnoreReason::UnknownTask));
        };
        if self.pending.contains_key(&id) {
            return Ok(self.ignore("task_toggle", id, IgnoreReason::PendingOperation));
        }

        if self.variant.defers_commits() && !task.completed {
            let due_at_ms = now_ms.saturating_add(COMPLETE_COMMIT_DELAY_MS);
            return Ok(self.schedule(id, PendingKind::Completion, due_at_ms));
        }

        if let Some(next) = self.list.toggled(id) {
            self.commit(next)?;
        }
        info!("event=task_toggle module=store status=ok task_id={id}");
        Ok(StoreOutcome::Applied)
    }

    /// Removes one task.
    ///
    /// Premium variant asks `confirm` first; lovely variant schedules the
    /// removal behind the exit animation.
    pub fn delete(
        &mut self,
        id: TaskId,
        now_ms: u64,
        confirm: &mut dyn Confirm,
    ) -> StoreResult<StoreOutcome> {
        if !self.list.contains(id) {
            return Ok(self.ignore("task_delete", id, IgnoreReason::UnknownTask));
        }
        if self.pending.contains_key(&id) {
            return Ok(self.ignore("task_delete", id, IgnoreReason::PendingOperation));
        }

        if self.variant.defers_commits() {
            let due_at_ms = now_ms.saturating_add(EXIT_ANIMATION_MS);
            return Ok(self.schedule(id, PendingKind::Removal, due_at_ms));
        }

        if self.variant.confirms_delete() && !confirm.confirm(DELETE_CONFIRM_PROMPT) {
            debug!("event=task_delete module=store status=declined task_id={id}");
            return Ok(StoreOutcome::Declined);
        }

        self.remove_now(id)?;
        Ok(StoreOutcome::Applied)
    }

    /// Puts one task into edit mode, taking it away from any other task.
    ///
    /// Not persisted.
    pub fn enable_edit(&mut self, id: TaskId) -> StoreOutcome {
        if !self.variant.supports_edit() {
            return self.ignore("task_edit_enable", id, IgnoreReason::Unsupported);
        }
        if !self.list.contains(id) {
            return self.ignore("task_edit_enable", id, IgnoreReason::UnknownTask);
        }
        if self.pending.contains_key(&id) {
            return self.ignore("task_edit_enable", id, IgnoreReason::PendingOperation);
        }

        self.editing = Some(id);
        debug!("event=task_edit_enable module=store status=ok task_id={id}");
        StoreOutcome::Applied
    }

    /// Replaces the text of the task in edit mode and leaves edit mode.
    ///
    /// Blank text keeps the task in edit mode with its old text.
    pub fn save_edit(&mut self, id: TaskId, text: &str) -> StoreResult<StoreOutcome> {
        if !self.variant.supports_edit() {
            return Ok(self.ignore("task_edit_save", id, IgnoreReason::Unsupported));
        }
        if self.editing != Some(id) {
            return Ok(self.ignore("task_edit_save", id, IgnoreReason::NotEditing));
        }
        let Some(text) = normalize_text(text) else {
            return Ok(self.ignore("task_edit_save", id, IgnoreReason::BlankText));
        };
        let Some(next) = self.list.with_text(id, &text) else {
            self.editing = None;
            return Ok(self.ignore("task_edit_save", id, IgnoreReason::UnknownTask));
        };

        self.commit(next)?;
        self.editing = None;
        info!("event=task_edit_save module=store status=ok task_id={id}");
        Ok(StoreOutcome::Applied)
    }

    /// Leaves edit mode without touching the task.
    pub fn cancel_edit(&mut self) -> StoreOutcome {
        match self.editing.take() {
            Some(id) => {
                debug!("event=task_edit_cancel module=store status=ok task_id={id}");
                StoreOutcome::Applied
            }
            None => StoreOutcome::Ignored(IgnoreReason::NotEditing),
        }
    }

    /// Applies every pending operation due at or before `now_ms`, earliest
    /// first. Returns how many operations changed the list.
    pub fn commit_due(&mut self, now_ms: u64) -> StoreResult<usize> {
        let mut due = self
            .pending
            .iter()
            .filter(|(_, op)| op.due_at_ms <= now_ms)
            .map(|(id, op)| (op.due_at_ms, *id))
            .collect::<Vec<_>>();
        due.sort_unstable();

        let mut applied = 0;
        for (_, id) in due {
            if self.apply_pending(id)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Applies every pending operation regardless of due time.
    pub fn flush_pending(&mut self) -> StoreResult<usize> {
        self.commit_due(u64::MAX)
    }

    /// The op stays pending until its commit succeeds, so a failed write is
    /// retried by the next `commit_due`.
    fn apply_pending(&mut self, id: TaskId) -> StoreResult<bool> {
        let Some(op) = self.pending.get(&id).copied() else {
            return Ok(false);
        };

        let applied = match op.kind {
            PendingKind::Completion => match self.list.with_completed(id, true) {
                Some(next) => {
                    self.commit(next)?;
                    info!("event=task_toggle module=store status=ok task_id={id} deferred=true");
                    true
                }
                None => false,
            },
            PendingKind::Removal if self.list.contains(id) => {
                self.remove_now(id)?;
                true
            }
            PendingKind::Removal => false,
        };
        self.pending.remove(&id);
        Ok(applied)
    }

    fn remove_now(&mut self, id: TaskId) -> StoreResult<()> {
        if let Some(next) = self.list.without(id) {
            self.commit(next)?;
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
        info!(
            "event=task_delete module=store status=ok task_id={id} tasks={}",
            self.list.len()
        );
        Ok(())
    }

    fn schedule(&mut self, id: TaskId, kind: PendingKind, due_at_ms: u64) -> StoreOutcome {
        self.pending.insert(id, PendingOp { kind, due_at_ms });
        debug!(
            "event=task_schedule module=store status=ok task_id={id} kind={kind:?} due_at_ms={due_at_ms}"
        );
        StoreOutcome::Scheduled { kind, due_at_ms }
    }

    fn ignore(&self, event: &str, id: TaskId, reason: IgnoreReason) -> StoreOutcome {
        debug!("event={event} module=store status=ignored task_id={id} reason={reason:?}");
        StoreOutcome::Ignored(reason)
    }

    fn commit(&mut self, next: TaskList) -> StoreResult<()> {
        self.repo.save(&next)?;
        self.list = next;
        Ok(())
    }
}
