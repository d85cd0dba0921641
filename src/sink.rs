//! Metric and error record sinks.
//!
//! The scheduler only needs an append-record capability; the file-backed
//! implementations here write the CSV-style rows the downstream operators
//! consume, while tests substitute in-memory doubles.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Header row written to a new or empty metrics log.
pub const METRICS_HEADER: &str = "timestamp,filename,extension,size_bytes,elapsed_seconds";

/// One successful creation event.
#[derive(Debug, Clone)]
pub struct FileEvent {
    pub timestamp: DateTime<Utc>,
    pub filename: String,
    pub extension: String,
    pub size_bytes: u64,
    /// Time since the start of the current cycle.
    pub elapsed: Duration,
}

impl FileEvent {
    /// Serializes to one metrics row, elapsed formatted to 3 decimal places.
    pub fn to_row(&self) -> String {
        format!(
            "{},{},{},{},{:.3}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.filename,
            self.extension,
            self.size_bytes,
            self.elapsed.as_secs_f64(),
        )
    }
}

/// One failed creation attempt.
#[derive(Debug, Clone)]
pub struct FailureEvent {
    pub timestamp: DateTime<Utc>,
    /// Zero-based index of the event within its cycle.
    pub index: u64,
    pub reason: String,
}

impl FailureEvent {
    pub fn to_row(&self) -> String {
        format!(
            "{},error_creating_file,{},{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.index,
            self.reason,
        )
    }
}

/// Append-only sink for successful creation events.
pub trait MetricsSink {
    fn record(&mut self, event: &FileEvent) -> io::Result<()>;
}

/// Append-only sink for failed creation attempts.
pub trait ErrorSink {
    fn record(&mut self, failure: &FailureEvent) -> io::Result<()>;
}

/// File-backed metrics log (`logs/metrics.log`).
pub struct MetricsLog {
    file: File,
}

impl MetricsLog {
    /// Opens the log in append mode, writing the header row first when the
    /// file is new or empty.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut log = Self { file };
        if log.file.metadata()?.len() == 0 {
            log.append(METRICS_HEADER)?;
        }
        Ok(log)
    }

    fn append(&mut self, row: &str) -> io::Result<()> {
        writeln!(self.file, "{row}")?;
        self.file.flush()
    }
}

impl MetricsSink for MetricsLog {
    fn record(&mut self, event: &FileEvent) -> io::Result<()> {
        self.append(&event.to_row())
    }
}

/// File-backed error log (`logs/errors.log`).
pub struct ErrorLog {
    file: File,
}

impl ErrorLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl ErrorSink for ErrorLog {
    fn record(&mut self, failure: &FailureEvent) -> io::Result<()> {
        writeln!(self.file, "{}", failure.to_row())?;
        self.file.flush()
    }
}
