//! Core use-case services.
//!
//! # Responsibility
//! - Own the authoritative task list and its ephemeral companions (edit mode,
//!   pending delayed operations).
//! - Route every committed mutation through the persistence adapter.

pub mod task_store;
