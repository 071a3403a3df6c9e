//! Checkpoint persistence and resume
//!
//! A checkpoint is the whole accumulated record sequence as a JSON array,
//! overwritten on every save. Loading re-derives the resume cursor from the
//! last element; there is no separately stored cursor field. Writes go to a
//! temp path and are renamed into place so a kill mid-save cannot leave a
//! truncated checkpoint behind.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::query::TxEdge;

/// File-backed snapshot store for crawl progress
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Create a store at the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a prior run's records. A missing file means a fresh run; a
    /// present-but-unparsable file is an error the caller decides about.
    pub async fn load(&self) -> Result<Option<Vec<TxEdge>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::checkpoint(format!("failed to read {}: {e}", self.path.display())))?;
        let records: Vec<TxEdge> = serde_json::from_str(&contents)
            .map_err(|e| Error::checkpoint(format!("failed to parse {}: {e}", self.path.display())))?;

        info!(
            "loaded {} checkpointed records from {}",
            records.len(),
            self.path.display()
        );
        Ok(Some(records))
    }

    /// Save the entire accumulated sequence, replacing any prior snapshot.
    pub async fn save(&self, records: &[TxEdge]) -> Result<()> {
        let contents = serde_json::to_string(records)
            .map_err(|e| Error::checkpoint(format!("failed to serialize records: {e}")))?;

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::checkpoint(format!("failed to write {}: {e}", temp_path.display())))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::checkpoint(format!("failed to rename into {}: {e}", self.path.display())))?;

        debug!("checkpoint saved to {}", self.path.display());
        Ok(())
    }
}

/// Resume cursor for a loaded checkpoint: the cursor of its last record
pub fn resume_cursor(records: &[TxEdge]) -> Option<&str> {
    records.last().map(|edge| edge.cursor.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TxNode;

    fn edge(id: &str, cursor: &str) -> TxEdge {
        TxEdge {
            cursor: cursor.to_string(),
            node: TxNode {
                id: id.to_string(),
                original_id: None,
                recipient: None,
                ingested_at: None,
                block: None,
                tags: vec![],
                data: None,
                owner: None,
            },
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_fresh_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("ckpt.json"));
        let records = vec![edge("a", "c1"), edge("b", "c2")];

        store.save(&records).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, records);
        assert_eq!(resume_cursor(&loaded), Some("c2"));
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("ckpt.json"));

        store.save(&[edge("a", "c1")]).await.unwrap();
        store
            .save(&[edge("a", "c1"), edge("b", "c2"), edge("c", "c3")])
            .await
            .unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(resume_cursor(&loaded), Some("c3"));

        // temp file does not linger
        assert!(!dir.path().join("ckpt.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ckpt.json");
        std::fs::write(&path, "[{\"cursor\": trunca").unwrap();

        let store = CheckpointStore::new(&path);
        assert!(store.load().await.is_err());
    }

    #[test]
    fn test_resume_cursor_empty() {
        assert_eq!(resume_cursor(&[]), None);
    }

    #[test]
    fn test_checkpoint_format_is_plain_edge_array() {
        // the on-disk format round-trips through the wire types directly
        let json = r#"[{"cursor":"c1","node":{"id":"a","tags":[]}}]"#;
        let records: Vec<TxEdge> = serde_json::from_str(json).unwrap();
        assert_eq!(resume_cursor(&records), Some("c1"));
    }
}
