//! Render engine: board state to view model.
//!
//! # Responsibility
//! - Rebuild the complete visible board (header, empty state, progress, rows)
//!   from state on every change. No diffing.
//! - Own the handler table that maps row affordances to task actions.
//!
//! # Invariants
//! - Output depends only on the input state plus the render epoch.
//! - Handler ids are only valid for the render that issued them; older ids
//!   resolve to `HandlerError::Stale`.
//! - Rows with a pending operation expose no affordances, so a second
//!   interaction during an animation window has nothing to bind to.
//! - Each task yields exactly one row, pending or not.

pub mod html;

use crate::config::BoardVariant;
use crate::greeting::Header;
use crate::model::task::TaskId;
use crate::model::task_list::TaskList;
use crate::service::task_store::{PendingKind, PendingOp};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Action a row affordance performs when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Toggle,
    Edit,
    Save,
    Delete,
}

impl RowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }
}

/// Opaque identity of one bound affordance in one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    epoch: u64,
    slot: u32,
}

impl Display for HandlerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "h{}-{}", self.epoch, self.slot)
    }
}

impl FromStr for HandlerId {
    type Err = HandlerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || HandlerError::Malformed(value.to_string());
        let body = value.trim().strip_prefix('h').ok_or_else(malformed)?;
        let (epoch, slot) = body.split_once('-').ok_or_else(malformed)?;
        Ok(Self {
            epoch: epoch.parse().map_err(|_| malformed())?,
            slot: slot.parse().map_err(|_| malformed())?,
        })
    }
}

/// Handler resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Issued by an earlier render.
    Stale(HandlerId),
    /// Current epoch but no such slot.
    Unknown(HandlerId),
    Malformed(String),
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stale(id) => write!(f, "handler `{id}` belongs to an earlier render"),
            Self::Unknown(id) => write!(f, "handler `{id}` is not bound"),
            Self::Malformed(value) => write!(f, "malformed handler id `{value}`"),
        }
    }
}

impl Error for HandlerError {}

/// Task and action bound to one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub task_id: TaskId,
    pub action: RowAction,
}

/// Handler registrations for the latest render.
#[derive(Debug, Default)]
pub struct HandlerTable {
    epoch: u64,
    bindings: Vec<Binding>,
}

impl HandlerTable {
    fn reset(&mut self, epoch: u64) {
        self.epoch = epoch;
        self.bindings.clear();
    }

    fn bind(&mut self, task_id: TaskId, action: RowAction) -> HandlerId {
        let slot = self.bindings.len() as u32;
        self.bindings.push(Binding { task_id, action });
        HandlerId {
            epoch: self.epoch,
            slot,
        }
    }

    pub fn resolve(&self, handler: HandlerId) -> Result<Binding, HandlerError> {
        if handler.epoch != self.epoch {
            return Err(HandlerError::Stale(handler));
        }
        self.bindings
            .get(handler.slot as usize)
            .copied()
            .ok_or(HandlerError::Unknown(handler))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Progress summary in the variant's style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressView {
    /// Percentage label plus bar width, both `percent`.
    Percent { percent: u8 },
    /// Count of tasks not yet completed.
    Remaining { count: usize, label: String },
}

/// Presentation state of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    Normal,
    /// Inline text editing; the edit field takes focus on render.
    Editing { draft: String, autofocus: bool },
    /// Completion scheduled, waiting for the animation to finish.
    CompletionPending,
    /// Removal scheduled; the row plays its exit animation.
    Exiting,
}

/// Bound interactive control on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    pub action: RowAction,
    pub handler: HandlerId,
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub task_id: TaskId,
    /// Raw task text. Escape before embedding in markup.
    pub text: String,
    pub completed: bool,
    pub state: RowState,
    pub affordances: Vec<Affordance>,
}

impl RowView {
    pub fn handler_for(&self, action: RowAction) -> Option<HandlerId> {
        self.affordances
            .iter()
            .find(|affordance| affordance.action == action)
            .map(|affordance| affordance.handler)
    }
}

/// Full visible board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub variant: BoardVariant,
    pub header: Header,
    pub add_draft: String,
    pub empty_state_visible: bool,
    pub progress: ProgressView,
    pub rows: Vec<RowView>,
}

/// Everything a render reads.
pub struct RenderInput<'a> {
    pub variant: BoardVariant,
    pub header: &'a Header,
    pub list: &'a TaskList,
    pub editing: Option<TaskId>,
    pub pending: &'a BTreeMap<TaskId, PendingOp>,
    pub add_draft: &'a str,
    /// Current text of the edit field, when one is open.
    pub edit_draft: Option<&'a str>,
}

/// Rebuilds views and owns the handler table of the latest one.
#[derive(Debug, Default)]
pub struct RenderEngine {
    epoch: u64,
    handlers: HandlerTable,
}

impl RenderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    pub fn resolve(&self, handler: HandlerId) -> Result<Binding, HandlerError> {
        self.handlers.resolve(handler)
    }

    /// Builds a fresh view and re-registers every row handler.
    pub fn render(&mut self, input: &RenderInput<'_>) -> BoardView {
        self.epoch += 1;
        self.handlers.reset(self.epoch);

        let rows = input
            .list
            .iter()
            .map(|task| {
                let state = row_state(input, task.id, &task.text);
                let affordances = row_actions(input.variant, &state)
                    .iter()
                    .map(|&action| Affordance {
                        action,
                        handler: self.handlers.bind(task.id, action),
                    })
                    .collect();
                RowView {
                    task_id: task.id,
                    text: task.text.clone(),
                    completed: task.completed,
                    state,
                    affordances,
                }
            })
            .collect();

        BoardView {
            variant: input.variant,
            header: input.header.clone(),
            add_draft: input.add_draft.to_string(),
            empty_state_visible: input.list.is_empty(),
            progress: progress_view(input.variant, input.list),
            rows,
        }
    }
}

/// `round(100 * completed / total)` with halves rounded up; 0 for an empty
/// list.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u8
}

/// `"1 task left"` / `"3 tasks left"`.
pub fn remaining_label(count: usize) -> String {
    if count == 1 {
        "1 task left".to_string()
    } else {
        format!("{count} tasks left")
    }
}

fn progress_view(variant: BoardVariant, list: &TaskList) -> ProgressView {
    match variant {
        BoardVariant::Premium => ProgressView::Percent {
            percent: progress_percent(list.completed_count(), list.len()),
        },
        BoardVariant::Lovely => {
            let count = list.remaining_count();
            ProgressView::Remaining {
                count,
                label: remaining_label(count),
            }
        }
    }
}

fn row_state(input: &RenderInput<'_>, id: TaskId, text: &str) -> RowState {
    if let Some(op) = input.pending.get(&id) {
        return match op.kind {
            PendingKind::Completion => RowState::CompletionPending,
            PendingKind::Removal => RowState::Exiting,
        };
    }
    if input.variant.supports_edit() && input.editing == Some(id) {
        return RowState::Editing {
            draft: input.edit_draft.unwrap_or(text).to_string(),
            autofocus: true,
        };
    }
    RowState::Normal
}

fn row_actions(variant: BoardVariant, state: &RowState) -> &'static [RowAction] {
    match (variant, state) {
        (_, RowState::CompletionPending | RowState::Exiting) => &[],
        (BoardVariant::Premium, RowState::Editing { .. }) => &[RowAction::Save],
        (BoardVariant::Premium, RowState::Normal) => {
            &[RowAction::Toggle, RowAction::Edit, RowAction::Delete]
        }
        (BoardVariant::Lovely, _) => &[RowAction::Toggle, RowAction::Delete],
    }
}
