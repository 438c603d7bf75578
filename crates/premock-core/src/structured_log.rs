//! Structured logging for override and verification events.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file, stdout, stderr or a shared buffer.
//! - [`emit`]: process-wide emission through the emitter selected by
//!   [`LogConfig`](crate::config::LogConfig), replaceable with [`install_emitter`].
//! - [`validate_log_line`] / [`validate_log_file`]: schema checks for emitted logs.
//!
//! Events are produced only on guard install/restore, recorder creation and
//! verification, never on the forwarding path itself.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{self, LogConfig, LogSink};

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse from string (case-insensitive). Unknown values map to `Info`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Verification outcome attached to `verify_*` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

/// Event names written by the engine.
pub mod events {
    pub const OVERRIDE_INSTALLED: &str = "override_installed";
    pub const OVERRIDE_RESTORED: &str = "override_restored";
    pub const MOCK_ARMED: &str = "mock_armed";
    pub const VERIFY_PASS: &str = "verify_pass";
    pub const VERIFY_FAIL: &str = "verify_fail";

    pub const ALL: [&str; 5] = [
        OVERRIDE_INSTALLED,
        OVERRIDE_RESTORED,
        MOCK_ARMED,
        VERIFY_PASS,
        VERIFY_FAIL,
    ];
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    /// Intercepted symbol (forwarding entry name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Live override depth on the emitting thread after the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// Expected call count or tuple count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<usize>,
    /// Observed call count or tuple count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Emitting thread name (or id when unnamed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            symbol: None,
            depth: None,
            expected: None,
            actual: None,
            outcome: None,
            thread: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set expected and actual counts together.
    #[must_use]
    pub fn with_counts(mut self, expected: usize, actual: usize) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Tag the entry with the current thread.
    #[must_use]
    pub fn with_current_thread(mut self) -> Self {
        let current = std::thread::current();
        self.thread = Some(match current.name() {
            Some(name) => name.to_owned(),
            None => format!("{:?}", current.id()),
        });
        self
    }

    /// Set free-form details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// In-memory sink that can be read back while an emitter owns a handle to it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Non-empty lines written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writes structured JSONL log entries.
pub struct LogEmitter {
    writer: Box<dyn Write + Send>,
    seq: u64,
    run_id: String,
    min_level: LogLevel,
}

impl LogEmitter {
    /// Create an emitter that writes to a file (truncating it).
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::with_writer(
            Box::new(std::io::LineWriter::new(file)),
            run_id,
        ))
    }

    #[must_use]
    pub fn to_stderr(run_id: &str) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), run_id)
    }

    #[must_use]
    pub fn to_stdout(run_id: &str) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), run_id)
    }

    /// Create an emitter that appends to `buffer` (for tests).
    #[must_use]
    pub fn to_buffer(buffer: &SharedBuffer, run_id: &str) -> Self {
        Self::with_writer(Box::new(buffer.clone()), run_id)
    }

    fn with_writer(writer: Box<dyn Write + Send>, run_id: &str) -> Self {
        Self {
            writer,
            seq: 0,
            run_id: run_id.to_string(),
            min_level: LogLevel::Trace,
        }
    }

    /// Build the emitter described by `config`, or `None` when logging is off.
    pub fn from_config(config: &LogConfig, run_id: &str) -> std::io::Result<Option<Self>> {
        let emitter = match &config.sink {
            LogSink::Off => return Ok(None),
            LogSink::Stderr => Self::to_stderr(run_id),
            LogSink::Stdout => Self::to_stdout(run_id),
            LogSink::File(path) => Self::to_file(path, run_id)?,
        };
        Ok(Some(emitter.with_min_level(config.min_level)))
    }

    /// Drop entries below `level`.
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Generate the next trace ID.
    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("premock::{}::{:03}", self.run_id, self.seq)
    }

    /// Emit a bare log entry with an auto-generated trace_id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let trace_id = self.next_trace_id();
        let entry = LogEntry::new(trace_id, level, event);
        self.write_entry(&entry)?;
        Ok(entry)
    }

    /// Emit a fully-populated log entry, filling in the trace_id when empty.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.level < self.min_level {
            return Ok(());
        }
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        self.write_entry(&entry)
    }

    fn write_entry(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Process-wide emitter
// ---------------------------------------------------------------------------

enum EmitterState {
    Unresolved,
    Disabled,
    Active(LogEmitter),
}

static GLOBAL_EMITTER: Mutex<EmitterState> = parking_lot::const_mutex(EmitterState::Unresolved);

fn default_run_id() -> String {
    format!("pid{}", std::process::id())
}

/// Replace the process-wide emitter, returning the previous one.
///
/// `None` disables logging. The cached level threshold follows the installed
/// emitter so [`config::log_enabled`] stays a cheap pre-check.
pub fn install_emitter(emitter: Option<LogEmitter>) -> Option<LogEmitter> {
    config::set_log_threshold(emitter.as_ref().map(LogEmitter::min_level));
    let next = match emitter {
        Some(emitter) => EmitterState::Active(emitter),
        None => EmitterState::Disabled,
    };
    match std::mem::replace(&mut *GLOBAL_EMITTER.lock(), next) {
        EmitterState::Active(previous) => Some(previous),
        EmitterState::Unresolved | EmitterState::Disabled => None,
    }
}

/// Write `entry` through the process-wide emitter, if logging is enabled.
///
/// Sink failures are dropped: logging must never turn a passing test into a
/// failing one.
pub fn emit(entry: LogEntry) {
    if !config::log_enabled(entry.level) {
        return;
    }
    let mut state = GLOBAL_EMITTER.lock();
    if matches!(*state, EmitterState::Unresolved) {
        *state = match LogEmitter::from_config(&LogConfig::from_env(), &default_run_id()) {
            Ok(Some(emitter)) => EmitterState::Active(emitter),
            Ok(None) | Err(_) => EmitterState::Disabled,
        };
    }
    if let EmitterState::Active(emitter) = &mut *state {
        let _ = emitter.emit_entry(entry);
    }
}

/// Emit an event for `symbol` when `level` is enabled; `build` only runs then.
pub(crate) fn emit_with(
    level: LogLevel,
    event: &str,
    symbol: &str,
    build: impl FnOnce(LogEntry) -> LogEntry,
) {
    if !config::log_enabled(level) {
        return;
    }
    let entry = LogEntry::new(String::new(), level, event)
        .with_symbol(symbol)
        .with_current_thread();
    emit(build(entry));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: String| {
        errors.push(LogValidationError {
            line_number,
            field: field.to_string(),
            message,
        });
    };

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            fail("<json>", format!("invalid JSON: {e}"));
            return Err(errors);
        }
    };

    let Some(obj) = value.as_object() else {
        fail("<root>", "expected JSON object".to_string());
        return Err(errors);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            fail(field, "required field missing".to_string());
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !["trace", "debug", "info", "warn", "error"].contains(&level)
    {
        fail("level", format!("invalid level: '{level}'"));
    }

    if let Some(event) = obj.get("event").and_then(|v| v.as_str())
        && !events::ALL.contains(&event)
    {
        fail("event", format!("unknown event: '{event}'"));
    }

    if let Some(outcome) = obj.get("outcome").and_then(|v| v.as_str())
        && !["pass", "fail"].contains(&outcome)
    {
        fail("outcome", format!("invalid outcome: '{outcome}'"));
    }

    // Verification events carry their outcome.
    if let Some(event) = obj.get("event").and_then(|v| v.as_str())
        && (event == events::VERIFY_PASS || event == events::VERIFY_FAIL)
        && obj.get("outcome").is_none()
    {
        fail("outcome", "verification events must include an outcome".to_string());
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && trace_id.split("::").count() != 3
    {
        fail(
            "trace_id",
            format!("trace_id should follow premock::<run_id>::<seq> format, got: '{trace_id}'"),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<LogEntry>(value).map_err(|e| {
        vec![LogValidationError {
            line_number,
            field: "<deserialization>".to_string(),
            message: format!("failed to deserialize: {e}"),
        }]
    })
}

/// Validate an entire JSONL file.
///
/// Returns the total line count and any validation errors found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let mut all_errors = Vec::new();
    let mut line_count = 0;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        line_count += 1;
        if let Err(errs) = validate_log_line(line, i + 1) {
            all_errors.extend(errs);
        }
    }

    Ok((line_count, all_errors))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        (secs % 86_400) / 3600,
        (secs % 3600) / 60,
        secs % 60,
        duration.subsec_millis(),
    )
}

// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
