//! Change records for durability and broadcast
//!
//! After every successful mutation the service emits one structured
//! `ChangeRecord` to its sink. Delivery is best-effort: a sink failure is
//! logged and swallowed, never failing the mutation that already committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};

/// Entity kind a change record refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Admin,
    Student,
    Assignment,
    Ownership,
}

/// Structured record of one successful mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Record timestamp
    pub at: DateTime<Utc>,
    pub entity: EntityKind,
    /// Boundary operation name (e.g. "add_student")
    pub operation: String,
    /// Key of the affected entity (principal or email)
    pub key: String,
    /// Operation-specific detail fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl ChangeRecord {
    pub fn new(entity: EntityKind, operation: &str, key: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            entity,
            operation: operation.to_string(),
            key: key.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Convert to a JSONL line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Destination for change records.
///
/// Implementations must not block mutations on delivery; the registry
/// never retries.
pub trait ChangeSink: Send {
    fn record(&self, record: &ChangeRecord);
}

impl<T: ChangeSink + Sync + ?Sized> ChangeSink for std::sync::Arc<T> {
    fn record(&self, record: &ChangeRecord) {
        (**self).record(record)
    }
}

/// Sink that appends change records to a JSONL file
pub struct JsonlChangeSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlChangeSink {
    /// Open (or create) the JSONL file for appending
    pub fn open(path: PathBuf) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("Change log initialized to {}", path.display());
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ChangeSink for JsonlChangeSink {
    fn record(&self, record: &ChangeRecord) {
        let line = match record.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize change record: {}", e);
                return;
            }
        };
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write change record: {}", e);
        }
        // Flush per record for durability
        if let Err(e) = writer.flush() {
            warn!("Failed to flush change log: {}", e);
        }
    }
}

/// In-memory sink, for embedders and tests
#[derive(Default)]
pub struct MemoryChangeSink {
    records: Mutex<Vec<ChangeRecord>>,
}

impl MemoryChangeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all captured records
    pub fn take(&self) -> Vec<ChangeRecord> {
        match self.records.lock() {
            Ok(mut records) => std::mem::take(&mut *records),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChangeSink for MemoryChangeSink {
    fn record(&self, record: &ChangeRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let record = ChangeRecord::new(EntityKind::Student, "add_student", "ada@example.com")
            .with_detail(serde_json::json!({ "grade": "legendary" }));
        let jsonl = record.to_jsonl().unwrap();
        assert!(jsonl.contains("add_student"));
        assert!(jsonl.contains("ada@example.com"));
        assert!(jsonl.contains("legendary"));

        let parsed: ChangeRecord = serde_json::from_str(&jsonl).unwrap();
        assert_eq!(parsed.entity, EntityKind::Student);
    }

    #[test]
    fn test_memory_sink_captures_in_order() {
        let sink = MemoryChangeSink::new();
        sink.record(&ChangeRecord::new(EntityKind::Admin, "add_admin", "a"));
        sink.record(&ChangeRecord::new(EntityKind::Admin, "remove_admin", "a"));
        let records = sink.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].operation, "add_admin");
        assert_eq!(records[1].operation, "remove_admin");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.jsonl");
        let sink = JsonlChangeSink::open(path.clone()).unwrap();
        sink.record(&ChangeRecord::new(EntityKind::Admin, "add_admin", "p1"));
        sink.record(&ChangeRecord::new(EntityKind::Student, "add_student", "s1"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ChangeRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.key, "p1");
    }
}
