//! Logging configuration.
//!
//! Structured events are controlled by two environment variables:
//! - `PREMOCK_LOG` selects the sink: `off` (default), `stderr`, `stdout`, or
//!   any other value, taken as a file path that receives JSONL.
//! - `PREMOCK_LOG_LEVEL` sets the minimum level: `trace`, `debug`, `info`
//!   (default), `warn` or `error`.
//!
//! The resulting threshold is cached process-wide after the first lookup so
//! the check on every guard and verification is a single atomic load.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::structured_log::LogLevel;

pub const LOG_ENV: &str = "PREMOCK_LOG";
pub const LOG_LEVEL_ENV: &str = "PREMOCK_LOG_LEVEL";

/// Destination of structured log lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum LogSink {
    #[default]
    Off,
    Stderr,
    Stdout,
    File(PathBuf),
}

impl LogSink {
    /// Parse from string. Keywords are case-insensitive; anything else is a path.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "off" | "none" | "0" | "false" => Self::Off,
            "stderr" | "2" => Self::Stderr,
            "stdout" | "1" => Self::Stdout,
            _ => Self::File(PathBuf::from(trimmed)),
        }
    }

    #[must_use]
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

/// Sink plus minimum level, as read from the environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub sink: LogSink,
    pub min_level: LogLevel,
}

impl LogConfig {
    /// Read `PREMOCK_LOG` and `PREMOCK_LOG_LEVEL`.
    #[must_use]
    pub fn from_env() -> Self {
        let sink = std::env::var(LOG_ENV).ok();
        let level = std::env::var(LOG_LEVEL_ENV).ok();
        Self::from_values(sink.as_deref(), level.as_deref())
    }

    #[must_use]
    pub fn from_values(sink: Option<&str>, level: Option<&str>) -> Self {
        Self {
            sink: sink.map(LogSink::from_str_loose).unwrap_or_default(),
            min_level: level.map(LogLevel::from_str_loose).unwrap_or_default(),
        }
    }

    /// Lowest level that will be written, or `None` when logging is off.
    #[must_use]
    pub fn threshold(&self) -> Option<LogLevel> {
        if self.sink.is_off() {
            None
        } else {
            Some(self.min_level)
        }
    }
}

// Atomic cache: 0=unresolved, 1..=5 = Trace..Error, 6 = off, 255 = resolving.
// A lookup that races the resolution reports "off" instead of blocking.
static CACHED_THRESHOLD: AtomicU8 = AtomicU8::new(THRESHOLD_UNRESOLVED);

const THRESHOLD_UNRESOLVED: u8 = 0;
const THRESHOLD_OFF: u8 = 6;
const THRESHOLD_RESOLVING: u8 = 255;

fn threshold_to_u8(threshold: Option<LogLevel>) -> u8 {
    match threshold {
        None => THRESHOLD_OFF,
        Some(LogLevel::Trace) => 1,
        Some(LogLevel::Debug) => 2,
        Some(LogLevel::Info) => 3,
        Some(LogLevel::Warn) => 4,
        Some(LogLevel::Error) => 5,
    }
}

fn u8_to_threshold(v: u8) -> Option<LogLevel> {
    match v {
        1 => Some(LogLevel::Trace),
        2 => Some(LogLevel::Debug),
        3 => Some(LogLevel::Info),
        4 => Some(LogLevel::Warn),
        5 => Some(LogLevel::Error),
        _ => None,
    }
}

/// Cached threshold (reads the environment on first call).
#[must_use]
pub fn log_threshold() -> Option<LogLevel> {
    let cached = CACHED_THRESHOLD.load(Ordering::Relaxed);
    if cached != THRESHOLD_UNRESOLVED && cached != THRESHOLD_RESOLVING {
        return u8_to_threshold(cached);
    }
    if cached == THRESHOLD_RESOLVING {
        return None;
    }

    if CACHED_THRESHOLD
        .compare_exchange(
            THRESHOLD_UNRESOLVED,
            THRESHOLD_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_THRESHOLD.load(Ordering::Relaxed);
        return if v != THRESHOLD_UNRESOLVED && v != THRESHOLD_RESOLVING {
            u8_to_threshold(v)
        } else {
            None
        };
    }

    let threshold = LogConfig::from_env().threshold();
    CACHED_THRESHOLD.store(threshold_to_u8(threshold), Ordering::Release);
    threshold
}

/// Override the cached threshold (used when an emitter is installed directly).
pub fn set_log_threshold(threshold: Option<LogLevel>) {
    CACHED_THRESHOLD.store(threshold_to_u8(threshold), Ordering::Release);
}

/// True when an event at `level` would be written.
#[inline]
#[must_use]
pub fn log_enabled(level: LogLevel) -> bool {
    log_threshold().is_some_and(|min| level >= min)
}
