//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start the rolling file logger once per process.
//! - Keep core log lines metadata-only (`event=... module=... status=...`).
//!
//! # Invariants
//! - Repeated init with the same level and directory is a no-op.
//! - Init with a different level or directory is rejected, never applied.
//! - Init never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "mapton";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn check_same(&self, level: &'static str, log_dir: &Path) -> Result<(), String> {
        if self.log_dir != log_dir {
            return Err(format!(
                "logger already writes to `{}`; refusing to switch to `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logger already runs at level `{}`; refusing to switch to `{}`",
                self.level, level
            ));
        }
        Ok(())
    }
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - Unknown level names.
/// - Empty or relative `log_dir`, or a directory that cannot be created.
/// - A conflicting earlier initialization.
/// - Backend start-up failures.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = parse_level(level)?;
    let log_dir = parse_log_dir(log_dir)?;

    if let Some(active) = ACTIVE_LOGGER.get() {
        return active.check_same(level, &log_dir);
    }

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(level, &log_dir))?;
    active.check_same(level, &log_dir)
}

/// Returns `(level, log_dir)` of the running logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|err| format!("cannot create log directory `{}`: {err}", log_dir.display()))?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("cannot start logger: {err}"))?;

    install_panic_hook();

    info!(
        "event=app_start module=core status=ok platform={} version={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "event=logging_init module=core status=ok level={} log_dir={}",
        level,
        log_dir.display()
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unknown log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn parse_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be absolute, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.get().is_some() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic module=core status=error location={} payload={}",
            location,
            single_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(panic_info);
    }));

    let _ = PANIC_HOOK.set(());
}

/// Flattens `value` to one line and caps it at `max_chars` characters.
fn single_line(value: &str, max_chars: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    let mut capped = flat.chars().take(max_chars).collect::<String>();
    if flat.chars().count() > max_chars {
        capped.push_str("...");
    }
    capped
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, parse_level, parse_log_dir, single_line};

    #[test]
    fn parse_level_accepts_aliases_and_case() {
        assert_eq!(parse_level("DEBUG").expect("DEBUG should parse"), "debug");
        assert_eq!(parse_level(" warning ").expect("warning should parse"), "warn");
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn parse_log_dir_rejects_blank_and_relative() {
        assert!(parse_log_dir("   ").is_err());
        let err = parse_log_dir("logs/mapton").expect_err("relative dir must fail");
        assert!(err.contains("absolute"));
    }

    #[test]
    fn single_line_flattens_and_caps() {
        let flat = single_line("a\nb\rc-long-tail", 5);
        assert!(!flat.contains('\n'));
        assert!(!flat.contains('\r'));
        assert!(flat.ends_with("..."));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let first = tempfile::tempdir().expect("temp dir");
        let second = tempfile::tempdir().expect("temp dir");
        let first_path = first.path().to_str().expect("utf-8 path").to_string();
        let second_path = second.path().to_str().expect("utf-8 path").to_string();

        init_logging("info", &first_path).expect("first init should succeed");
        init_logging("INFO", &first_path).expect("same config should be a no-op");

        let level_err = init_logging("debug", &first_path).expect_err("level switch must fail");
        assert!(level_err.contains("refusing to switch"));
        let dir_err = init_logging("info", &second_path).expect_err("dir switch must fail");
        assert!(dir_err.contains("refusing to switch"));

        let (level, dir) = logging_status().expect("logger should be active");
        assert_eq!(level, "info");
        assert_eq!(dir, first.path());
    }
}
