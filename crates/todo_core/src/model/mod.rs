//! Board domain model.
//!
//! # Responsibility
//! - Define the persisted task record and the ordered task list value.
//! - Generate collision-free task ids.
//!
//! # Invariants
//! - Only `id`, `text` and `completed` belong to a task; presentation state
//!   (edit mode, pending animations) lives in the store, never here.
//! - Task lists are values: mutations build a new list.

pub mod task;
pub mod task_list;
