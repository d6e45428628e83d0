//! Board logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Start the rolling file logger at most once per process.
//! - Keep board events metadata-only: ids, counts, due times. Task text is
//!   never logged.
//!
//! # Invariants
//! - A repeated `init_logging` with the same level and directory succeeds
//!   without side effects; any other repeat is rejected.
//! - Initialization never panics.
//! - Panic payloads are flattened to one line and capped before logging.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Once;

const LOG_FILE_BASENAME: &str = "todo_board";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

/// Accepted spellings and their canonical level.
const LEVEL_ALIASES: &[(&str, &str)] = &[
    ("trace", "trace"),
    ("debug", "debug"),
    ("info", "info"),
    ("warn", "warn"),
    ("warning", "warn"),
    ("error", "error"),
];

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

/// Configuration the running logger was started with.
struct ActiveLogger {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn start(level: &'static str, dir: &Path) -> Result<Self, String> {
        std::fs::create_dir_all(dir)
            .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;

        let handle = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?
            .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
            .rotate(
                Criterion::Size(ROTATE_AT_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEEP_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        PANIC_HOOK.call_once(install_panic_hook);
        info!(
            "event=logging_init module=core status=ok level={level} log_dir={} os={} version={}",
            dir.display(),
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION")
        );

        Ok(Self {
            level,
            dir: dir.to_path_buf(),
            _handle: handle,
        })
    }

    fn accepts(&self, level: &'static str, dir: &Path) -> Result<(), String> {
        if self.dir != dir {
            return Err(format!(
                "logging already writes to `{}`; refusing to switch to `{}`",
                self.dir.display(),
                dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already runs at `{}`; refusing to switch to `{level}`",
                self.level
            ));
        }
        Ok(())
    }
}

/// Initializes board logging.
///
/// `level` is one of `trace|debug|info|warn|error` (case-insensitive);
/// `log_dir` must be an absolute directory path and is created if missing.
///
/// # Errors
/// Returns a human-readable message for an unknown level, a bad directory,
/// a backend failure, or a conflicting repeat call.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = normalize_level(level)?;
    let dir = absolute_dir(log_dir)?;
    ACTIVE
        .get_or_try_init(|| ActiveLogger::start(level, &dir))?
        .accepts(level, &dir)
}

/// `(level, log_dir)` of the running logger, or `None` before init.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE.get().map(|active| (active.level, active.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    let wanted = level.trim().to_ascii_lowercase();
    LEVEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == wanted)
        .map(|(_, canonical)| *canonical)
        .ok_or_else(|| {
            format!("unsupported log level `{wanted}`; expected trace|debug|info|warn|error")
        })
}

fn absolute_dir(raw: &str) -> Result<PathBuf, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = PathBuf::from(trimmed);
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(format!("log_dir must be an absolute path, got `{trimmed}`"))
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        // Payload may echo task text.
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            one_line(payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

/// Replaces control characters with spaces and caps the length in chars.
fn one_line(value: &str, limit: usize) -> String {
    let mut out = String::with_capacity(value.len().min(limit + 3));
    for (index, ch) in value.chars().enumerate() {
        if index == limit {
            out.push_str("...");
            break;
        }
        out.push(if ch.is_control() { ' ' } else { ch });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{absolute_dir, init_logging, logging_status, normalize_level, one_line};
    use tempfile::TempDir;

    #[test]
    fn levels_normalize_case_and_aliases() {
        assert_eq!(normalize_level("INFO"), Ok("info"));
        assert_eq!(normalize_level(" warning "), Ok("warn"));
        assert!(normalize_level("verbose")
            .unwrap_err()
            .contains("trace|debug|info|warn|error"));
    }

    #[test]
    fn log_dir_must_be_absolute_and_non_empty() {
        assert!(absolute_dir("logs/dev").unwrap_err().contains("absolute"));
        assert!(absolute_dir("   ").unwrap_err().contains("empty"));
    }

    #[test]
    fn one_line_flattens_control_chars_and_caps_length() {
        assert_eq!(one_line("a\nb\tc", 10), "a b c");
        assert_eq!(one_line("éééé", 2), "éé...");
        assert_eq!(one_line("exact", 5), "exact");
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let first = TempDir::new().expect("temp dir");
        let second = TempDir::new().expect("temp dir");
        let first_dir = first.path().to_string_lossy().to_string();
        let second_dir = second.path().to_string_lossy().to_string();

        init_logging("info", &first_dir).expect("first init");
        init_logging("INFO", &first_dir).expect("same config is a no-op");

        let level_err = init_logging("debug", &first_dir).unwrap_err();
        assert!(level_err.contains("refusing to switch"));
        let dir_err = init_logging("info", &second_dir).unwrap_err();
        assert!(dir_err.contains("refusing to switch"));

        let (level, dir) = logging_status().expect("logging is active");
        assert_eq!(level, "info");
        assert_eq!(dir, first.path());
    }
}
