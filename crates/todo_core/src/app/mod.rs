//! Board controller.
//!
//! # Responsibility
//! - Own all application state: task store, drafts, render engine, effects
//!   and the startup header.
//! - Translate host interactions into store mutations and re-render after
//!   every one of them.
//!
//! # Invariants
//! - The exposed `BoardView` always reflects the store after the last
//!   dispatch or tick.
//! - The add draft is cleared only when an add was applied.
//! - Effects run only after the store accepted a completion; their state
//!   never feeds back into the store.

use crate::config::BoardVariant;
use crate::effects::{EffectLayer, Point};
use crate::greeting::Header;
use crate::model::task::TaskId;
use crate::render::{BoardView, HandlerError, HandlerId, RenderEngine, RenderInput, RowAction};
use crate::repo::task_list_repo::TaskListRepository;
use crate::service::task_store::{
    Confirm, IgnoreReason, PendingKind, StoreOutcome, StoreResult, TaskStore,
};
use log::debug;

mod bootstrap;

pub use bootstrap::{open_configured, OpenError, SqliteBoard};

/// Text field that can hold focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Primary input for new tasks.
    Add,
    /// Inline edit field of one task.
    Edit(TaskId),
}

/// Key pressed inside a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Commit key.
    Enter,
    Escape,
    Other,
}

/// Host-side event delivered to the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Field content changed.
    Input { field: Field, value: String },
    /// Key pressed while `field` had focus.
    Key { field: Field, key: Key },
    /// The add button was clicked.
    AddClicked,
    /// A row affordance was activated. `pointer` feeds the celebration.
    Activate {
        handler: HandlerId,
        pointer: Option<Point>,
    },
}

/// Task board: one controller per open board.
pub struct Board<R: TaskListRepository> {
    store: TaskStore<R>,
    engine: RenderEngine,
    effects: EffectLayer,
    header: Header,
    add_draft: String,
    edit_draft: Option<String>,
    view: BoardView,
}

impl<R: TaskListRepository> Board<R> {
    /// Loads the board and renders it once.
    pub fn open(repo: R, variant: BoardVariant, header: Header) -> StoreResult<Self> {
        Self::with_effects(repo, variant, header, EffectLayer::new())
    }

    pub fn with_effects(
        repo: R,
        variant: BoardVariant,
        header: Header,
        effects: EffectLayer,
    ) -> StoreResult<Self> {
        let store = TaskStore::open(repo, variant)?;
        let mut engine = RenderEngine::new();
        let view = engine.render(&RenderInput {
            variant,
            header: &header,
            list: store.list(),
            editing: store.editing(),
            pending: store.pending_ops(),
            add_draft: "",
            edit_draft: None,
        });
        Ok(Self {
            store,
            engine,
            effects,
            header,
            add_draft: String::new(),
            edit_draft: None,
            view,
        })
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn store(&self) -> &TaskStore<R> {
        &self.store
    }

    pub fn effects(&self) -> &EffectLayer {
        &self.effects
    }

    pub fn add_draft(&self) -> &str {
        &self.add_draft
    }

    /// Earliest time `tick` has work to do.
    pub fn next_wakeup(&self) -> Option<u64> {
        let particles_done = self
            .effects
            .particles()
            .iter()
            .map(|particle| particle.started_at_ms.saturating_add(particle.duration_ms))
            .min();
        match (self.store.next_due_at(), particles_done) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handles one interaction and re-renders.
    ///
    /// `confirm` answers the delete prompt of variants that ask one.
    pub fn dispatch(
        &mut self,
        interaction: Interaction,
        now_ms: u64,
        confirm: &mut dyn Confirm,
    ) -> StoreResult<StoreOutcome> {
        let outcome = match interaction {
            Interaction::Input { field, value } => self.update_draft(field, value),
            Interaction::Key {
                field,
                key: Key::Enter,
            } => self.submit(field, now_ms)?,
            Interaction::Key {
                field: Field::Edit(id),
                key: Key::Escape,
            } if self.store.editing() == Some(id) => {
                self.edit_draft = None;
                self.store.cancel_edit()
            }
            Interaction::Key { .. } => StoreOutcome::Ignored(IgnoreReason::Unsupported),
            Interaction::AddClicked => self.submit(Field::Add, now_ms)?,
            Interaction::Activate { handler, pointer } => {
                self.activate(handler, pointer, now_ms, confirm)?
            }
        };
        self.rerender();
        Ok(outcome)
    }

    /// Commits due delayed operations, drops finished particles and
    /// re-renders. Returns how many operations were committed.
    ///
    /// The view is refreshed even when a commit fails; failed operations stay
    /// pending for the next tick.
    pub fn tick(&mut self, now_ms: u64) -> StoreResult<usize> {
        let committed = self.store.commit_due(now_ms);
        self.effects.prune(now_ms);
        self.sync_edit_draft();
        self.rerender();
        committed
    }

    /// Commits every pending operation. Call before dropping the board.
    pub fn shutdown(&mut self) -> StoreResult<usize> {
        let committed = self.store.flush_pending();
        self.sync_edit_draft();
        self.rerender();
        committed
    }

    fn update_draft(&mut self, field: Field, value: String) -> StoreOutcome {
        match field {
            Field::Add => {
                self.add_draft = value;
                StoreOutcome::Applied
            }
            Field::Edit(id) if self.store.editing() == Some(id) => {
                self.edit_draft = Some(value);
                StoreOutcome::Applied
            }
            Field::Edit(_) => StoreOutcome::Ignored(IgnoreReason::NotEditing),
        }
    }

    fn submit(&mut self, field: Field, now_ms: u64) -> StoreResult<StoreOutcome> {
        match field {
            Field::Add => {
                let outcome = self.store.add(&self.add_draft, now_ms)?;
                if outcome == StoreOutcome::Applied {
                    self.add_draft.clear();
                }
                Ok(outcome)
            }
            Field::Edit(id) => self.save_edit(id),
        }
    }

    fn save_edit(&mut self, id: TaskId) -> StoreResult<StoreOutcome> {
        let draft = match (&self.edit_draft, self.store.list().get(id)) {
            (Some(draft), _) => draft.clone(),
            (None, Some(task)) => task.text.clone(),
            (None, None) => String::new(),
        };
        let outcome = self.store.save_edit(id, &draft)?;
        if outcome == StoreOutcome::Applied {
            self.edit_draft = None;
        }
        Ok(outcome)
    }

    fn activate(
        &mut self,
        handler: HandlerId,
        pointer: Option<Point>,
        now_ms: u64,
        confirm: &mut dyn Confirm,
    ) -> StoreResult<StoreOutcome> {
        let binding = match self.engine.resolve(handler) {
            Ok(binding) => binding,
            Err(err) => {
                debug!("event=handler_resolve module=app status=ignored error={err}");
                let reason = match err {
                    HandlerError::Stale(_) => IgnoreReason::StaleHandler,
                    HandlerError::Unknown(_) | HandlerError::Malformed(_) => {
                        IgnoreReason::UnknownTask
                    }
                };
                return Ok(StoreOutcome::Ignored(reason));
            }
        };

        let id = binding.task_id;
        match binding.action {
            RowAction::Toggle => {
                let outcome = self.store.toggle_complete(id, now_ms)?;
                if let StoreOutcome::Scheduled {
                    kind: PendingKind::Completion,
                    ..
                } = outcome
                {
                    self.effects
                        .celebrate(pointer.unwrap_or_default(), now_ms);
                }
                Ok(outcome)
            }
            RowAction::Edit => {
                let outcome = self.store.enable_edit(id);
                if outcome == StoreOutcome::Applied {
                    self.edit_draft = self.store.list().get(id).map(|task| task.text.clone());
                }
                Ok(outcome)
            }
            RowAction::Save => self.save_edit(id),
            RowAction::Delete => {
                let outcome = self.store.delete(id, now_ms, confirm)?;
                self.sync_edit_draft();
                Ok(outcome)
            }
        }
    }

    fn sync_edit_draft(&mut self) {
        if self.store.editing().is_none() {
            self.edit_draft = None;
        }
    }

    fn rerender(&mut self) {
        self.view = self.engine.render(&RenderInput {
            variant: self.store.variant(),
            header: &self.header,
            list: self.store.list(),
            editing: self.store.editing(),
            pending: self.store.pending_ops(),
            add_draft: &self.add_draft,
            edit_draft: self.edit_draft.as_deref(),
        });
    }
}
