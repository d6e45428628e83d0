//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the board controller to Dart via FRB as plain envelopes.
//! - Keep one open board per process behind a mutex.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutating call returns the re-rendered snapshot.
//! - Confirmation prompts are answered by the host before the call
//!   (`confirmed` flag), never by calling back into Dart.

use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_configured,
    ping as ping_inner, to_html, BoardConfig, BoardVariant, Field, HandlerId, Interaction, Key,
    Point, ProgressView, RowAction, RowState, SqliteBoard, StorageLocation, StoreOutcome, TaskId,
};

static BOARD: OnceLock<Mutex<Option<SqliteBoard>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One visible task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRowItem {
    /// Stable task id in string form.
    pub task_id: String,
    /// Raw task text; Dart widgets display it as plain text.
    pub text: String,
    pub completed: bool,
    /// `normal|editing|completing|exiting`.
    pub state: String,
    /// Current edit field text when `state == "editing"`.
    pub edit_draft: Option<String>,
    /// Handler ids keyed by action, absent when the action is unavailable.
    pub toggle_handler: Option<String>,
    pub edit_handler: Option<String>,
    pub save_handler: Option<String>,
    pub delete_handler: Option<String>,
}

/// Full board snapshot after the latest render.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub ok: bool,
    /// Human-readable diagnostics or outcome message.
    pub message: String,
    pub greeting: String,
    pub date: Option<String>,
    pub add_draft: String,
    pub empty_state_visible: bool,
    /// Percentage for the premium variant.
    pub progress_percent: Option<u8>,
    /// Remaining-count label for the lovely variant.
    pub remaining_label: Option<String>,
    pub rows: Vec<BoardRowItem>,
    /// Epoch milliseconds at which `board_tick` should be called next.
    pub next_tick_ms: Option<u64>,
    /// Escaped HTML rendering for web hosts.
    pub html: String,
}

impl BoardSnapshot {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            greeting: String::new(),
            date: None,
            add_draft: String::new(),
            empty_state_visible: true,
            progress_percent: None,
            remaining_label: None,
            rows: Vec::new(),
            next_tick_ms: None,
            html: String::new(),
        }
    }
}

/// Opens (or re-opens) the process board.
///
/// `variant` and `db_path` override environment configuration when non-empty;
/// `db_path = ":memory:"` keeps the board in memory.
#[flutter_rust_bridge::frb(sync)]
pub fn board_open(variant: Option<String>, db_path: Option<String>) -> BoardSnapshot {
    let mut config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(err) => return BoardSnapshot::failure(format!("board_open failed: {err}")),
    };
    if let Some(raw) = variant.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        config.variant = match BoardVariant::parse(raw) {
            Ok(variant) => variant,
            Err(err) => return BoardSnapshot::failure(format!("board_open failed: {err}")),
        };
    }
    if let Some(raw) = db_path.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        config.storage = if raw == ":memory:" {
            StorageLocation::InMemory
        } else {
            StorageLocation::File(raw.into())
        };
    }

    // Flush before loading: both boards may share one file.
    let mut slot = lock_board();
    if let Some(mut previous) = slot.take() {
        if let Err(err) = previous.shutdown() {
            log::warn!("event=board_close module=ffi status=error error={err}");
        }
    }
    let board = match open_configured(&config) {
        Ok(board) => board,
        Err(err) => return BoardSnapshot::failure(format!("board_open failed: {err}")),
    };
    let snapshot = snapshot_of(&board, "Board opened.");
    *slot = Some(board);
    snapshot
}

/// Returns the current snapshot without changing state.
#[flutter_rust_bridge::frb(sync)]
pub fn board_view() -> BoardSnapshot {
    with_board("board_view", |board| Ok(snapshot_of(board, "")))
}

/// Updates a field draft. `field` is `add` or `edit:<task_id>`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_input(field: String, value: String) -> BoardSnapshot {
    let field = match parse_field(&field) {
        Ok(field) => field,
        Err(message) => return BoardSnapshot::failure(message),
    };
    dispatch("board_input", Interaction::Input { field, value }, false)
}

/// Reports a key press in a field. `key` is `enter`, `escape` or anything else.
#[flutter_rust_bridge::frb(sync)]
pub fn board_key(field: String, key: String) -> BoardSnapshot {
    let field = match parse_field(&field) {
        Ok(field) => field,
        Err(message) => return BoardSnapshot::failure(message),
    };
    let key = match key.trim().to_ascii_lowercase().as_str() {
        "enter" => Key::Enter,
        "escape" | "esc" => Key::Escape,
        _ => Key::Other,
    };
    dispatch("board_key", Interaction::Key { field, key }, false)
}

/// Submits the add field, as the add button does.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add() -> BoardSnapshot {
    dispatch("board_add", Interaction::AddClicked, false)
}

/// Activates a row handler from the latest snapshot.
///
/// `confirmed` answers the delete prompt for variants that ask one.
#[flutter_rust_bridge::frb(sync)]
pub fn board_activate(handler: String, confirmed: bool, x: f64, y: f64) -> BoardSnapshot {
    let handler = match handler.parse::<HandlerId>() {
        Ok(handler) => handler,
        Err(err) => return BoardSnapshot::failure(format!("board_activate failed: {err}")),
    };
    dispatch(
        "board_activate",
        Interaction::Activate {
            handler,
            pointer: Some(Point::new(x, y)),
        },
        confirmed,
    )
}

/// Commits due delayed operations. Call at `next_tick_ms`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_tick() -> BoardSnapshot {
    with_board("board_tick", |board| {
        let committed = board.tick(now_ms())?;
        Ok(snapshot_of(board, format!("Committed {committed} operation(s).")))
    })
}

/// Flushes pending operations and closes the board.
#[flutter_rust_bridge::frb(sync)]
pub fn board_shutdown() -> String {
    let mut slot = lock_board();
    match slot.take() {
        Some(mut board) => match board.shutdown() {
            Ok(_) => String::new(),
            Err(err) => format!("board_shutdown failed: {err}"),
        },
        None => String::new(),
    }
}

fn dispatch(operation: &str, interaction: Interaction, confirmed: bool) -> BoardSnapshot {
    with_board(operation, |board| {
        let mut confirm = |_prompt: &str| confirmed;
        let outcome = board.dispatch(interaction, now_ms(), &mut confirm)?;
        Ok(snapshot_of(board, outcome_message(outcome)))
    })
}

fn with_board(
    operation: &str,
    f: impl FnOnce(&mut SqliteBoard) -> Result<BoardSnapshot, todo_core::StoreError>,
) -> BoardSnapshot {
    let mut slot = lock_board();
    match slot.as_mut() {
        Some(board) => f(board)
            .unwrap_or_else(|err| BoardSnapshot::failure(format!("{operation} failed: {err}"))),
        None => BoardSnapshot::failure(format!("{operation} failed: board is not open")),
    }
}

fn lock_board() -> MutexGuard<'static, Option<SqliteBoard>> {
    let cell = BOARD.get_or_init(|| Mutex::new(None));
    // A poisoned lock still holds a consistent board: every mutation persists
    // before it replaces in-memory state.
    cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn parse_field(raw: &str) -> Result<Field, String> {
    let trimmed = raw.trim();
    if trimmed == "add" {
        return Ok(Field::Add);
    }
    trimmed
        .strip_prefix("edit:")
        .and_then(|id| id.parse::<u64>().ok())
        .map(|id| Field::Edit(TaskId::new(id)))
        .ok_or_else(|| format!("unsupported field `{trimmed}`; expected add|edit:<task_id>"))
}

fn outcome_message(outcome: StoreOutcome) -> String {
    match outcome {
        StoreOutcome::Applied => "Applied.".to_string(),
        StoreOutcome::Scheduled { due_at_ms, .. } => format!("Scheduled for {due_at_ms}."),
        StoreOutcome::Ignored(reason) => format!("Ignored: {reason:?}."),
        StoreOutcome::Declined => "Declined.".to_string(),
    }
}

fn snapshot_of(board: &SqliteBoard, message: impl Into<String>) -> BoardSnapshot {
    let view = board.view();
    let (progress_percent, remaining_label) = match &view.progress {
        ProgressView::Percent { percent } => (Some(*percent), None),
        ProgressView::Remaining { label, .. } => (None, Some(label.clone())),
    };
    let rows = view
        .rows
        .iter()
        .map(|row| {
            let (state, edit_draft) = match &row.state {
                RowState::Normal => ("normal", None),
                RowState::Editing { draft, .. } => ("editing", Some(draft.clone())),
                RowState::CompletionPending => ("completing", None),
                RowState::Exiting => ("exiting", None),
            };
            let handler = |action| row.handler_for(action).map(|id| id.to_string());
            BoardRowItem {
                task_id: row.task_id.to_string(),
                text: row.text.clone(),
                completed: row.completed,
                state: state.to_string(),
                edit_draft,
                toggle_handler: handler(RowAction::Toggle),
                edit_handler: handler(RowAction::Edit),
                save_handler: handler(RowAction::Save),
                delete_handler: handler(RowAction::Delete),
            }
        })
        .collect();

    BoardSnapshot {
        ok: true,
        message: message.into(),
        greeting: view.header.greeting.clone(),
        date: view.header.date.clone(),
        add_draft: view.add_draft.clone(),
        empty_state_visible: view.empty_state_visible,
        progress_percent,
        remaining_label,
        rows,
        next_tick_ms: board.next_wakeup(),
        html: to_html(view),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{
        board_activate, board_add, board_input, board_key, board_open, board_shutdown,
        board_view, core_version, init_logging, parse_field, ping,
    };
    use std::sync::Mutex;
    use todo_core::{Field, TaskId};

    // The board is process-global; serialize tests touching it.
    static SERIAL: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn parse_field_accepts_add_and_edit_targets() {
        assert_eq!(parse_field("add"), Ok(Field::Add));
        assert_eq!(parse_field(" edit:42 "), Ok(Field::Edit(TaskId::new(42))));
        assert!(parse_field("edit:x").is_err());
        assert!(parse_field("other").is_err());
    }

    #[test]
    fn premium_board_add_and_confirmed_delete() {
        let _guard = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let opened = board_open(Some("premium".to_string()), Some(":memory:".to_string()));
        assert!(opened.ok, "{}", opened.message);
        assert!(opened.empty_state_visible);
        assert_eq!(opened.progress_percent, Some(0));

        board_input("add".to_string(), "Buy milk".to_string());
        let added = board_key("add".to_string(), "Enter".to_string());
        assert!(added.ok, "{}", added.message);
        assert_eq!(added.rows.len(), 1);
        assert_eq!(added.add_draft, "");

        let delete = added.rows[0].delete_handler.clone().expect("delete handler");
        let declined = board_activate(delete, false, 0.0, 0.0);
        assert_eq!(declined.rows.len(), 1);

        let delete = declined.rows[0].delete_handler.clone().expect("delete handler");
        let deleted = board_activate(delete, true, 0.0, 0.0);
        assert!(deleted.rows.is_empty());

        assert_eq!(board_shutdown(), "");
        assert!(!board_view().ok);
    }

    #[test]
    fn lovely_board_reports_remaining_label() {
        let _guard = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let opened = board_open(Some("lovely".to_string()), Some(":memory:".to_string()));
        assert!(opened.ok, "{}", opened.message);

        board_input("add".to_string(), "Water plants".to_string());
        let added = board_add();
        assert_eq!(added.remaining_label.as_deref(), Some("1 task left"));
        assert_eq!(added.progress_percent, None);
        assert!(added.rows[0].edit_handler.is_none());

        assert_eq!(board_shutdown(), "");
    }

    #[test]
    fn reopening_flushes_pending_removal_first() {
        let _guard = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let dir = tempfile::TempDir::new().expect("temp dir");
        let db_path = dir.path().join("board.sqlite3").to_string_lossy().to_string();
        let open = || board_open(Some("lovely".to_string()), Some(db_path.clone()));

        assert!(open().ok);
        board_input("add".to_string(), "doomed".to_string());
        let added = board_add();
        let delete = added.rows[0].delete_handler.clone().expect("delete handler");
        let exiting = board_activate(delete, false, 0.0, 0.0);
        assert_eq!(exiting.rows[0].state, "exiting");

        let reopened = open();
        assert!(reopened.ok, "{}", reopened.message);
        assert!(reopened.rows.is_empty());

        board_input("add".to_string(), "next".to_string());
        board_add();
        assert_eq!(board_shutdown(), "");

        let texts = open().rows.into_iter().map(|row| row.text).collect::<Vec<_>>();
        assert_eq!(texts, vec!["next".to_string()]);
        assert_eq!(board_shutdown(), "");
    }

    #[test]
    fn malformed_handler_is_reported() {
        let response = board_activate("nope".to_string(), true, 0.0, 0.0);
        assert!(!response.ok);
        assert!(response.message.contains("malformed"));
    }
}
