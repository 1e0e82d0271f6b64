//! Record sinks
//!
//! Records are handed downstream one at a time, in arrival order per
//! entity; no ordering is guaranteed across entities extracting
//! concurrently. The engine checkpoints a page's token only after every
//! record of that page has been accepted by the sink.

use crate::error::{Error, Result};
use crate::types::JsonObject;
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Destination for extracted records
#[async_trait]
pub trait Sink: Send + Sync {
    /// Accept one record for an entity
    async fn write(&self, entity: &str, record: &JsonObject) -> Result<()>;
}

// ============================================================================
// NDJSON Sink
// ============================================================================

/// Writes records as NDJSON message lines, one `RECORD` message per record
pub struct NdjsonSink {
    writer: Mutex<Box<dyn tokio::io::AsyncWrite + Unpin + Send>>,
}

impl NdjsonSink {
    /// Write records to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(tokio::io::stdout())),
        }
    }

    /// Write records to a file (created or truncated)
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = tokio::fs::File::create(path.as_ref())
            .await
            .map_err(Error::Io)?;
        Ok(Self {
            writer: Mutex::new(Box::new(file)),
        })
    }
}

#[async_trait]
impl Sink for NdjsonSink {
    async fn write(&self, entity: &str, record: &JsonObject) -> Result<()> {
        let message = json!({
            "type": "RECORD",
            "entity": entity,
            "record": record,
        });
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await.map_err(Error::Io)?;
        writer.flush().await.map_err(Error::Io)?;
        Ok(())
    }
}

impl std::fmt::Debug for NdjsonSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdjsonSink").finish()
    }
}

// ============================================================================
// Memory Sink
// ============================================================================

/// Collects records in memory; used by tests
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(String, JsonObject)>>,
}

impl MemorySink {
    /// Create an empty memory sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all accepted records, in acceptance order
    pub async fn records(&self) -> Vec<(String, JsonObject)> {
        self.records.lock().await.clone()
    }

    /// Records accepted for one entity, in acceptance order
    pub async fn records_for(&self, entity: &str) -> Vec<JsonObject> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|(e, _)| e == entity)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write(&self, entity: &str, record: &JsonObject) -> Result<()> {
        self.records
            .lock()
            .await
            .push((entity.to_string(), record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: u64) -> JsonObject {
        match json!({"id": id}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_memory_sink_preserves_order() {
        let sink = MemorySink::new();
        sink.write("runs", &record(1)).await.unwrap();
        sink.write("jobs", &record(2)).await.unwrap();
        sink.write("runs", &record(3)).await.unwrap();

        let runs = sink.records_for("runs").await;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0]["id"], json!(1));
        assert_eq!(runs[1]["id"], json!(3));
    }

    #[tokio::test]
    async fn test_ndjson_sink_writes_record_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ndjson");

        let sink = NdjsonSink::create(&path).await.unwrap();
        sink.write("runs", &record(1)).await.unwrap();
        sink.write("runs", &record(2)).await.unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "RECORD");
        assert_eq!(first["entity"], "runs");
        assert_eq!(first["record"]["id"], 1);
    }
}
