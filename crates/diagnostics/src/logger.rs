use std::fmt::Display;
use tracing_subscriber::filter::LevelFilter;

/// Verbosity of a run. Ordered from quietest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Only errors. Selected by `--silent`.
    Error,
    /// Progress lines and the printed report.
    Info,
    /// Per-step and per-lookup detail. Selected by `--verbose`.
    Debug,
}

impl LogLevel {
    /// `silent` beats `verbose`.
    pub fn from_flags(verbose: bool, silent: bool) -> Self {
        match (verbose, silent) {
            (_, true) => LogLevel::Error,
            (true, false) => LogLevel::Debug,
            (false, false) => LogLevel::Info,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Logging capability handed to every component that reports progress.
///
/// The level is fixed when the logger is created. Messages above it are never formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    pub const fn new(level: LogLevel) -> Self {
        Logger { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(target: "modup", "{message}");
    }

    pub fn info(&self, message: impl Display) {
        if self.is_enabled(LogLevel::Info) {
            tracing::info!(target: "modup", "{message}");
        }
    }

    pub fn debug(&self, message: impl Display) {
        if self.is_enabled(LogLevel::Debug) {
            tracing::debug!(target: "modup", "{message}");
        }
    }
}

/// Tests and library callers that don't care about output get the default level.
impl Default for Logger {
    fn default() -> Self {
        Logger::new(LogLevel::Info)
    }
}
