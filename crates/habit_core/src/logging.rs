//! Process-wide logging.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once: stderr always, plus size-rotated
//!   files when a directory is configured.
//! - Record panics as single sanitized log lines.
//!
//! # Invariants
//! - Repeating `init_logging` with the same settings is a no-op.
//! - Asking for different settings after start fails instead of silently
//!   keeping the old ones.
//! - Nothing in here panics.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FILE_BASENAME: &str = "habit";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_MESSAGE_LIMIT: usize = 160;

static ACTIVE: OnceCell<Active> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    dir: Option<PathBuf>,
}

impl LogSettings {
    fn parse(level: &str, dir: Option<&Path>) -> Result<Self, LoggingError> {
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "warning" => LevelFilter::Warn,
            "off" => return Err(LoggingError::UnsupportedLevel(level.to_string())),
            other => LevelFilter::from_str(other)
                .map_err(|_| LoggingError::UnsupportedLevel(level.to_string()))?,
        };
        let dir = match dir {
            Some(dir) if !dir.is_absolute() => {
                return Err(LoggingError::RelativeDir(dir.to_path_buf()))
            }
            other => other.map(Path::to_path_buf),
        };
        Ok(Self { level, dir })
    }

    fn describe(&self) -> String {
        let sink = self
            .dir
            .as_ref()
            .map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string());
        format!("level={} sink={sink}", self.level_name())
    }

    fn level_name(&self) -> &'static str {
        match self.level {
            LevelFilter::Trace => "trace",
            LevelFilter::Debug => "debug",
            LevelFilter::Info => "info",
            LevelFilter::Warn => "warn",
            LevelFilter::Error => "error",
            LevelFilter::Off => "off",
        }
    }
}

struct Active {
    settings: LogSettings,
    _handle: LoggerHandle,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    UnsupportedLevel(String),
    #[error("log directory must be absolute, got `{0}`")]
    RelativeDir(PathBuf),
    #[error("cannot create log directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already running with {active}; refusing to switch to {requested}")]
    Conflict { active: String, requested: String },
}

/// Starts logging at `level`, mirroring into rotated files under `log_dir` when given.
///
/// # Errors
/// - Unknown level, relative directory, or a directory that cannot be created.
/// - Logging is already running with other settings.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<(), LoggingError> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    if active.settings != requested {
        return Err(LoggingError::Conflict {
            active: active.settings.describe(),
            requested: requested.describe(),
        });
    }
    Ok(())
}

fn start(settings: LogSettings) -> Result<Active, LoggingError> {
    let logger = Logger::with(settings.level);
    let handle = match settings.dir.as_deref() {
        None => logger.log_to_stderr().start()?,
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_FILES),
                )
                .append()
                .duplicate_to_stderr(Duplicate::All)
                .write_mode(WriteMode::BufferAndFlush)
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
    };

    log_panics();
    info!(
        "event=logging_init module=logging status=ok {} os={} version={}",
        settings.describe(),
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(Active {
        settings,
        _handle: handle,
    })
}

/// Settings of the running logger as `(level, log_dir)`; `None` before start.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level_name(), active.settings.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn log_panics() {
    // Runs inside ACTIVE's initializer, so at most once per process.
    let next = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        error!(
            "event=panic module=logging status=error location={location} message={}",
            one_line(payload_text(panic_info.payload()), PANIC_MESSAGE_LIMIT)
        );
        next(panic_info);
    }));
}

fn payload_text(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string payload>")
}

/// Flattens control characters and caps the text at `limit` chars.
fn one_line(text: &str, limit: usize) -> String {
    let mut flat: String = text
        .chars()
        .take(limit)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if text.chars().nth(limit).is_some() {
        flat.push('…');
    }
    flat
}
