//! Core domain logic for the task board.
//! This crate is the single source of truth for board invariants.

pub mod app;
pub mod config;
pub mod db;
pub mod effects;
pub mod greeting;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;
pub mod storage;

pub use app::{open_configured, Board, Field, Interaction, Key, OpenError, SqliteBoard};
pub use config::{BoardConfig, BoardVariant, ConfigError, StorageLocation};
pub use effects::{EffectLayer, Point};
pub use greeting::Header;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId, TaskIdGenerator};
pub use model::task_list::TaskList;
pub use render::html::{escape_html, to_html};
pub use render::{BoardView, HandlerId, ProgressView, RowAction, RowState, RowView};
pub use repo::task_list_repo::{
    decode_task_list, encode_task_list, KvTaskListRepository, RepoError, RepoResult,
    TaskListRepository,
};
pub use service::task_store::{
    Confirm, IgnoreReason, PendingKind, PendingOp, StoreError, StoreOutcome, StoreResult,
    TaskStore,
};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
