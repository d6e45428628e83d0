//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its wire shape.
//! - Normalize user-entered task text.
//! - Generate ids that stay tied to creation time without colliding.
//!
//! # Invariants
//! - `text` is trimmed and non-empty for every valid task.
//! - A `TaskIdGenerator` never hands out the same id twice, even when the
//!   wall clock stalls or moves backwards.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable task identifier.
///
/// Numerically an epoch-millisecond timestamp (bumped on collision), which
/// keeps the wire shape compatible with boards stored before the generator
/// existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user-entered item with completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Trimmed, non-empty. Rendered escaped; may contain any characters.
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Trims user input; returns `None` for blank input.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Monotonic id source seeded from the wall clock.
///
/// `next(now_ms)` returns `max(now_ms, last + 1)`.
#[derive(Debug, Clone, Default)]
pub struct TaskIdGenerator {
    last: u64,
}

impl TaskIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh id for a task created at `now_ms`.
    pub fn next(&mut self, now_ms: u64) -> TaskId {
        let candidate = now_ms.max(self.last.saturating_add(1));
        self.last = candidate;
        TaskId(candidate)
    }

    /// Advances past an id that already exists (e.g. loaded from storage).
    pub fn observe(&mut self, id: TaskId) {
        self.last = self.last.max(id.0);
    }
}
