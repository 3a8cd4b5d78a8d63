//! Structured JSONL logging for vault operations.
//!
//! Emits one JSON object per line to a daily-rotating log file at
//! `<log_dir>/YYYY-MM-DD.jsonl`. Purely additive observability: a
//! logging fault is reported to stderr and swallowed — a vault
//! operation never fails because its log entry couldn't be written.
//!
//! ## Configuration
//!
//! ```toml
//! [logging]
//! structured = true
//! log_dir = "~/.daybook/logs"
//! retain_days = 14
//! ```

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ── LogLevel ─────────────────────────────────────────────────────

/// Severity level for an operation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

// ── OpKind ───────────────────────────────────────────────────────

/// Which vault operation an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    NoteRead,
    NoteWrite,
    NoteCreate,
    SectionAppend,
    VaultList,
    Error,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OpKind::NoteRead => "note_read",
            OpKind::NoteWrite => "note_write",
            OpKind::NoteCreate => "note_create",
            OpKind::SectionAppend => "section_append",
            OpKind::VaultList => "vault_list",
            OpKind::Error => "error",
        };
        write!(f, "{s}")
    }
}

// ── OpEvent ──────────────────────────────────────────────────────

/// A single operation event written as one JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpEvent {
    /// ISO 8601 timestamp.
    pub timestamp: String,
    /// Identifier for this process run (set by the binary).
    pub run_id: String,
    /// Which operation this is.
    pub op: OpKind,
    /// The note date the operation targeted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// The section involved, for append events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Free-form context string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Severity level.
    pub level: LogLevel,
}

impl OpEvent {
    pub fn new(run_id: &str, op: OpKind, level: LogLevel) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            run_id: run_id.to_string(),
            op,
            date: None,
            section: None,
            detail: None,
            level,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date.format("%Y-%m-%d").to_string());
        self
    }

    pub fn with_section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

// ── LogConfig ────────────────────────────────────────────────────

/// Configuration for the operation log, from `[logging]` in config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Whether structured JSON logging is enabled.
    #[serde(default = "default_structured")]
    pub structured: bool,
    /// Directory for log files. Supports `~` expansion.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Number of days to retain log files.
    #[serde(default = "default_retain_days")]
    pub retain_days: u32,
}

fn default_structured() -> bool {
    true
}

fn default_log_dir() -> String {
    "~/.daybook/logs".to_string()
}

fn default_retain_days() -> u32 {
    14
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            structured: default_structured(),
            log_dir: default_log_dir(),
            retain_days: default_retain_days(),
        }
    }
}

impl LogConfig {
    /// Resolve the log directory path, expanding a leading `~`.
    pub fn resolved_log_dir(&self) -> PathBuf {
        if self.log_dir.starts_with("~/") || self.log_dir == "~" {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(self.log_dir.trim_start_matches("~/"));
            }
        }
        PathBuf::from(&self.log_dir)
    }
}

/// Parse a `LogConfig` from full config.toml contents.
///
/// Returns defaults if the `[logging]` section is absent.
pub fn parse_log_config(toml_str: &str) -> Result<LogConfig, toml::de::Error> {
    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default)]
        logging: Option<LogConfig>,
    }

    let wrapper: Wrapper = toml::from_str(toml_str)?;
    Ok(wrapper.logging.unwrap_or_default())
}

// ── OpLogger ─────────────────────────────────────────────────────

/// Inner state protected by a mutex.
#[derive(Debug)]
struct LoggerInner {
    /// Buffered JSON lines waiting to be flushed.
    buffer: Vec<String>,
    /// The date string of the currently-open log file.
    current_date: String,
    /// Resolved log directory path.
    log_dir: PathBuf,
    /// Whether structured logging is enabled.
    enabled: bool,
}

/// Buffered JSONL operation logger with daily rotation.
///
/// Clone-friendly via `Arc` — the store and the binary can share one.
#[derive(Clone, Debug)]
pub struct OpLogger {
    inner: Arc<Mutex<LoggerInner>>,
    config: LogConfig,
}

/// Flush when the buffer reaches this many events.
const FLUSH_THRESHOLD: usize = 16;

impl OpLogger {
    /// Create a logger from configuration, creating the log directory
    /// if needed. Directory-creation errors go to stderr; writes will
    /// simply fail silently afterward.
    pub fn new(config: LogConfig) -> Self {
        let log_dir = config.resolved_log_dir();
        let enabled = config.structured;

        if enabled {
            if let Err(e) = std::fs::create_dir_all(&log_dir) {
                eprintln!(
                    "[daybook] Warning: could not create log directory {}: {e}",
                    log_dir.display()
                );
            }
        }

        Self {
            inner: Arc::new(Mutex::new(LoggerInner {
                buffer: Vec::new(),
                current_date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
                log_dir,
                enabled,
            })),
            config,
        }
    }

    /// A logger that records nothing (for tests and `structured = false`).
    pub fn disabled() -> Self {
        Self::new(LogConfig {
            structured: false,
            ..Default::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.structured
    }

    /// Buffer an event, flushing on threshold, errors, or day rollover.
    pub fn log(&self, event: &OpEvent) {
        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("[daybook] Warning: failed to serialize log event: {e}");
                return;
            }
        };

        let should_flush;
        {
            let mut inner = match self.inner.lock() {
                Ok(g) => g,
                Err(_) => return, // Poisoned mutex — skip
            };

            if !inner.enabled {
                return;
            }

            let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
            if today != inner.current_date {
                let _ = Self::flush_locked(&mut inner);
                inner.current_date = today;
            }

            inner.buffer.push(json);
            should_flush = inner.buffer.len() >= FLUSH_THRESHOLD || event.level == LogLevel::Error;
        }

        if should_flush {
            self.flush();
        }
    }

    /// Log an event and also emit a human-readable line to stderr.
    pub fn log_and_stderr(&self, event: &OpEvent, stderr_msg: &str) {
        eprintln!("{stderr_msg}");
        self.log(event);
    }

    /// Flush all buffered events to disk. Errors go to stderr only.
    pub fn flush(&self) {
        let mut inner = match self.inner.lock() {
            Ok(g) => g,
            Err(_) => return,
        };
        let _ = Self::flush_locked(&mut inner);
    }

    fn flush_locked(inner: &mut LoggerInner) -> std::io::Result<()> {
        if inner.buffer.is_empty() || !inner.enabled {
            return Ok(());
        }

        let path = inner.log_dir.join(format!("{}.jsonl", inner.current_date));
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(mut file) => {
                let mut write_err = None;
                for line in &inner.buffer {
                    if let Err(e) = writeln!(file, "{line}") {
                        eprintln!(
                            "[daybook] Warning: log write failed ({}): {e}",
                            path.display()
                        );
                        write_err = Some(e);
                        break;
                    }
                }
                inner.buffer.clear();
                match write_err {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }
            Err(e) => {
                eprintln!(
                    "[daybook] Warning: could not open log file {}: {e}",
                    path.display()
                );
                inner.buffer.clear(); // Drop events rather than grow unbounded
                Err(e)
            }
        }
    }

    /// Delete log files older than `retain_days`. Best-effort.
    pub fn cleanup_old_logs(&self) {
        if !self.config.structured {
            return;
        }

        let cutoff =
            Local::now().date_naive() - chrono::Duration::days(self.config.retain_days as i64);
        let entries = match std::fs::read_dir(self.config.resolved_log_dir()) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(file_date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
                if file_date < cutoff {
                    if let Err(e) = std::fs::remove_file(&path) {
                        eprintln!(
                            "[daybook] Warning: failed to delete old log {}: {e}",
                            path.display()
                        );
                    }
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
