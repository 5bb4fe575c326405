//! Logging capability injected into the decision core.
//!
//! Message strings passed to a [`Logger`] follow fixed templates and are part of the observable
//! contract shared with other SDKs, so they are never reworded.

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Step-by-step detail of a decision.
    Debug,
    /// Decision outcomes.
    Info,
    /// Unusable input that was skipped.
    Warn,
    /// Lookup misses and invalid values.
    Error,
}

impl From<LogLevel> for log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// A sink for decision-core log messages.
///
/// Implementations must be safe to call concurrently. Every reportable event triggers exactly one
/// call; calls are not deduplicated.
///
/// Closures can be used directly:
///
/// ```
/// # use optimizely::{LogLevel, Logger};
/// let logger = |level: LogLevel, message: &str| println!("[{level:?}] {message}");
/// logger.log(LogLevel::Info, "hello");
/// ```
pub trait Logger: Send + Sync {
    /// Record `message` at the given `level`.
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards messages to the [`log`](https://docs.rs/log) facade under the `optimizely` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, level: LogLevel, message: &str) {
        log::log!(target: "optimizely", level.into(), "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

impl<T: Fn(LogLevel, &str) + Send + Sync> Logger for T {
    fn log(&self, level: LogLevel, message: &str) {
        self(level, message);
    }
}
