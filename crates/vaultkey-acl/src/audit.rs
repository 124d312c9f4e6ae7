//! Append-only audit trail.
//!
//! Records are never edited or removed; ordering is append order. Every
//! append is also mirrored to the `log` facade so that a configured
//! subscriber sees the same events.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;
use vaultkey_core::format_timestamp;

/// Message prefixes that are mirrored at `warn` level.
const WARN_PREFIXES: &[&str] = &["SECURITY ALERT", "FAILURE", "ACCESS DENIED", "WARNING"];

/// A single immutable audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    sequence: usize,
    timestamp: DateTime<Local>,
    message: String,
}

impl AuditRecord {
    /// Zero-based position in the log.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// When the record was appended.
    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }

    /// The event description.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn is_warning(&self) -> bool {
        WARN_PREFIXES.iter().any(|p| self.message.starts_with(p))
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", format_timestamp(&self.timestamp), self.message)
    }
}

/// Append-only store of [`AuditRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return it.
    pub fn append(
        &mut self,
        timestamp: DateTime<Local>,
        message: impl Into<String>,
    ) -> &AuditRecord {
        let record = AuditRecord {
            sequence: self.records.len(),
            timestamp,
            message: message.into(),
        };

        if record.is_warning() {
            log::warn!(target: "vaultkey::audit", "{}", record.message);
        } else {
            log::info!(target: "vaultkey::audit", "{}", record.message);
        }

        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&AuditRecord> {
        self.records.last()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A feed positioned at the current end of the log.
    pub fn feed(&self) -> AuditFeed {
        AuditFeed {
            cursor: self.records.len(),
        }
    }
}

/// Read cursor over an [`AuditLog`].
///
/// Each [`poll`](Self::poll) yields the records appended since the previous
/// poll, newest last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditFeed {
    cursor: usize,
}

impl AuditFeed {
    /// A feed that replays the log from its first record.
    pub fn from_start() -> Self {
        Self::default()
    }

    /// Records appended since the last poll.
    pub fn poll<'a>(&mut self, log: &'a AuditLog) -> &'a [AuditRecord] {
        let start = self.cursor.min(log.len());
        self.cursor = log.len();
        &log.records()[start..]
    }

    /// Sequence number of the next record this feed will yield.
    pub fn position(&self) -> usize {
        self.cursor
    }
}
