//! Ordered task list value.
//!
//! # Responsibility
//! - Hold the authoritative newest-first sequence of tasks.
//! - Offer copy-on-write transitions used by the task store.
//!
//! # Invariants
//! - Transitions never mutate `self`; they return a new list.
//! - A transition addressed at a missing id returns `None` so callers can
//!   treat it as a no-op without comparing lists.
//! - Order is insertion order with the newest task first.

use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};

/// Full ordered collection of tasks.
///
/// Serializes as a bare JSON array of task records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.len() - self.completed_count()
    }

    /// Largest id present, used to seed the id generator after a load.
    pub fn max_id(&self) -> Option<TaskId> {
        self.tasks.iter().map(|task| task.id).max()
    }

    /// Returns a new list with `task` at index 0.
    pub fn prepended(&self, task: Task) -> Self {
        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.push(task);
        tasks.extend(self.tasks.iter().cloned());
        Self { tasks }
    }

    /// Returns a new list with the matching task's `completed` flag flipped.
    pub fn toggled(&self, id: TaskId) -> Option<Self> {
        let completed = self.get(id)?.completed;
        self.with_completed(id, !completed)
    }

    /// Returns a new list with the matching task's `completed` flag set.
    pub fn with_completed(&self, id: TaskId, completed: bool) -> Option<Self> {
        self.map_one(id, |task| Task {
            completed,
            ..task.clone()
        })
    }

    /// Returns a new list with the matching task's text replaced.
    ///
    /// `text` must already be normalized by the caller.
    pub fn with_text(&self, id: TaskId, text: &str) -> Option<Self> {
        self.map_one(id, |task| Task {
            text: text.to_string(),
            ..task.clone()
        })
    }

    /// Returns a new list without the matching task.
    pub fn without(&self, id: TaskId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let tasks = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        Some(Self { tasks })
    }

    fn map_one(&self, id: TaskId, f: impl Fn(&Task) -> Task) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let tasks = self
            .tasks
            .iter()
            .map(|task| if task.id == id { f(task) } else { task.clone() })
            .collect();
        Some(Self { tasks })
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
