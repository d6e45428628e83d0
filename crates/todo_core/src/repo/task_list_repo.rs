//! Task list repository contracts and key-value implementation.
//!
//! # Responsibility
//! - Provide load/save APIs for the whole task list.
//! - Keep JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - `save` writes the full list; there are no partial writes.
//! - `load` never fails on bad payloads, only on storage transport errors.
//! - Loaded lists have unique ids and trimmed, non-empty text.

use crate::model::task::{normalize_text, Task, TaskId};
use crate::model::task_list::TaskList;
use crate::storage::{KeyValueStore, StorageError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task list persistence.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Encode(serde_json::Error),
    /// Only produced by `decode_task_list`; `load` recovers from it.
    Decode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
            Self::Decode(err) => write!(f, "invalid persisted task list: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode(err) => Some(err),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Repository interface for whole-list persistence.
pub trait TaskListRepository {
    fn load(&self) -> RepoResult<TaskList>;
    fn save(&mut self, list: &TaskList) -> RepoResult<()>;
}

/// Stores the task list as one JSON value under a fixed key.
pub struct KvTaskListRepository<S: KeyValueStore> {
    store: S,
    key: &'static str,
}

impl<S: KeyValueStore> KvTaskListRepository<S> {
    pub fn new(store: S, key: &'static str) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> TaskListRepository for KvTaskListRepository<S> {
    fn load(&self) -> RepoResult<TaskList> {
        let Some(raw) = self.store.get(self.key)? else {
            info!(
                "event=board_load module=repo status=ok key={} source=absent tasks=0",
                self.key
            );
            return Ok(TaskList::default());
        };

        match decode_task_list(&raw) {
            Ok(list) => {
                info!(
                    "event=board_load module=repo status=ok key={} source=stored tasks={}",
                    self.key,
                    list.len()
                );
                Ok(list)
            }
            Err(err) => {
                warn!(
                    "event=board_load module=repo status=fallback key={} error_code=payload_invalid bytes={} error={}",
                    self.key,
                    raw.len(),
                    err
                );
                Ok(TaskList::default())
            }
        }
    }

    fn save(&mut self, list: &TaskList) -> RepoResult<()> {
        let encoded = encode_task_list(list)?;
        self.store.set(self.key, &encoded)?;
        Ok(())
    }
}

/// Serializes a list into its stored JSON array form.
pub fn encode_task_list(list: &TaskList) -> RepoResult<String> {
    serde_json::to_string(list).map_err(RepoError::Encode)
}

/// Parses a stored JSON array and repairs recoverable record problems.
///
/// Unknown fields (such as a legacy `isEditing` flag) are ignored. Records
/// whose text is blank are dropped, surrounding whitespace is trimmed, and a
/// repeated id is reassigned past the largest id in the payload so both
/// records stay addressable.
pub fn decode_task_list(raw: &str) -> RepoResult<TaskList> {
    let decoded: Vec<Task> = serde_json::from_str(raw).map_err(RepoError::Decode)?;
    Ok(repair_records(decoded))
}

fn repair_records(decoded: Vec<Task>) -> TaskList {
    let mut next_free = decoded
        .iter()
        .map(|task| task.id.get())
        .max()
        .unwrap_or(0);
    let mut seen = HashSet::with_capacity(decoded.len());
    let mut tasks = Vec::with_capacity(decoded.len());

    for mut task in decoded {
        let Some(text) = normalize_text(&task.text) else {
            warn!(
                "event=board_load module=repo status=repair action=drop_blank task_id={}",
                task.id
            );
            continue;
        };
        task.text = text;

        if !seen.insert(task.id) {
            next_free = next_free.saturating_add(1);
            warn!(
                "event=board_load module=repo status=repair action=reassign_id task_id={} new_id={}",
                task.id, next_free
            );
            task.id = TaskId::new(next_free);
            seen.insert(task.id);
        }
        tasks.push(task);
    }

    TaskList::new(tasks)
}

#[cfg(test)]
mod tests {
    use super::decode_task_list;

    #[test]
    fn decode_accepts_legacy_editing_flag() {
        let list = decode_task_list(
            r#"[{"id":1700000000000,"text":"Buy milk","completed":true,"isEditing":true}]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 1);
        let task = &list.as_slice()[0];
        assert_eq!(task.id.get(), 1_700_000_000_000);
        assert!(task.completed);
    }

    #[test]
    fn decode_reassigns_duplicate_ids_and_drops_blank_text() {
        let list = decode_task_list(
            r#"[
                {"id":7,"text":" a ","completed":false},
                {"id":7,"text":"b","completed":true},
                {"id":3,"text":"   ","completed":false}
            ]"#,
        )
        .unwrap();
        let ids = list.iter().map(|task| task.id.get()).collect::<Vec<_>>();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(list.as_slice()[0].text, "a");
        assert_eq!(list.as_slice()[1].text, "b");
    }

    #[test]
    fn decode_rejects_non_array_payload() {
        assert!(decode_task_list("{not json").is_err());
        assert!(decode_task_list(r#"{"id":1}"#).is_err());
    }
}
