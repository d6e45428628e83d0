//! Persistence adapter between the in-memory task list and durable storage.
//!
//! # Responsibility
//! - Convert `TaskList` values to and from their stored JSON form.
//! - Read/write that form under one fixed key of a `KeyValueStore`.
//!
//! # Invariants
//! - Only `id`, `text` and `completed` are written.
//! - Absent or unparsable payloads load as an empty list.

pub mod task_list_repo;
