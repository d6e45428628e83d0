//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todo_core` linkage.
//! - Open the configured board once and print what a host would render.
//!
//! Configuration comes from `TODO_BOARD_VARIANT`, `TODO_BOARD_DB_PATH` and
//! `TODO_BOARD_LOG_LEVEL`.

use std::process::ExitCode;
use todo_core::{open_configured, BoardConfig, ProgressView, RowState};

fn main() -> ExitCode {
    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());

    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let log_dir = std::env::temp_dir().join("todo_board_logs");
    if let Err(err) = todo_core::init_logging(config.log_level, &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    let mut board = match open_configured(&config) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("open error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let view = board.view();
    println!("variant={}", view.variant.as_str());
    println!("greeting={}", view.header.greeting);
    if let Some(date) = &view.header.date {
        println!("date={date}");
    }
    match &view.progress {
        ProgressView::Percent { percent } => println!("progress={percent}%"),
        ProgressView::Remaining { label, .. } => println!("progress={label}"),
    }
    if view.empty_state_visible {
        println!("(no tasks)");
    }
    for row in &view.rows {
        let mark = if row.completed { "x" } else { " " };
        let suffix = match row.state {
            RowState::Normal => "",
            RowState::Editing { .. } => " (editing)",
            RowState::CompletionPending => " (completing)",
            RowState::Exiting => " (removing)",
        };
        println!("[{mark}] {} {}{suffix}", row.task_id, row.text);
    }

    if let Err(err) = board.shutdown() {
        eprintln!("shutdown error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
