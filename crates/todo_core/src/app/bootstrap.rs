//! Opens a SQLite-backed board from resolved configuration.

use super::Board;
use crate::config::{BoardConfig, StorageLocation};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::greeting::Header;
use crate::repo::task_list_repo::KvTaskListRepository;
use crate::service::task_store::StoreError;
use crate::storage::SqliteKeyValueStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Board persisted through the SQLite key-value store.
pub type SqliteBoard = Board<KvTaskListRepository<SqliteKeyValueStore>>;

/// Failures while opening a configured board.
#[derive(Debug)]
pub enum OpenError {
    Db(DbError),
    Store(StoreError),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "board storage unavailable: {err}"),
            Self::Store(err) => write!(f, "board load failed: {err}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<DbError> for OpenError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for OpenError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Opens the configured storage and loads the board with a header for the
/// current local time.
pub fn open_configured(config: &BoardConfig) -> Result<SqliteBoard, OpenError> {
    let conn = match &config.storage {
        StorageLocation::File(path) => open_db(path)?,
        StorageLocation::InMemory => open_db_in_memory()?,
    };
    let repo = KvTaskListRepository::new(
        SqliteKeyValueStore::new(conn),
        config.variant.storage_key(),
    );
    let board = Board::open(repo, config.variant, Header::now(config.variant))?;
    info!(
        "event=board_open module=app status=ok variant={} tasks={}",
        config.variant.as_str(),
        board.store().list().len()
    );
    Ok(board)
}
