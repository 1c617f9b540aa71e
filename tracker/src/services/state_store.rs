//! JSON file state store
//!
//! Durable per-source state under one base directory:
//! `<state_dir>/<source_id>/checkpoint.json` and `snapshot.json`. Files are
//! plain JSON so operational tooling can inspect them. Every write lands in
//! a temp file first and renames over the target, so a reader never sees a
//! partial file and a crash never corrupts prior state.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use crate::error::{TrackerError, TrackerResult};
use crate::traits::StateStore;
use shared::{CheckpointFile, ProcessedEntry, SnapshotFile, SourceId};

/// File-backed state store rooted at one base directory
pub struct JsonStateStore {
    state_dir: PathBuf,
}

impl JsonStateStore {
    /// Open a store rooted at `state_dir`, creating it if needed
    ///
    /// This is the one place storage fails hard: a base directory that
    /// cannot be created means no run against this store can preserve
    /// anything.
    pub fn open(state_dir: impl Into<PathBuf>) -> TrackerResult<Self> {
        let state_dir = state_dir.into();
        std::fs::create_dir_all(&state_dir)
            .map_err(|e| TrackerError::storage("create", state_dir.display().to_string(), e))?;
        Ok(Self { state_dir })
    }

    fn source_dir(&self, source_id: &SourceId) -> PathBuf {
        self.state_dir.join(source_id.as_str())
    }

    fn checkpoint_path(&self, source_id: &SourceId) -> PathBuf {
        self.source_dir(source_id).join("checkpoint.json")
    }

    fn snapshot_path(&self, source_id: &SourceId) -> PathBuf {
        self.source_dir(source_id).join("snapshot.json")
    }

    /// Read and parse a state file; `None` when it does not exist
    async fn read_json<T: DeserializeOwned>(path: &Path) -> TrackerResult<Option<T>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TrackerError::storage("read", path.display().to_string(), e)),
        };
        let value = serde_json::from_str(&content).map_err(|e| TrackerError::CorruptState {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(value))
    }

    /// Write a state file through a temp file and an atomic rename
    async fn write_json_atomic<T: Serialize>(&self, path: &Path, value: &T) -> TrackerResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TrackerError::storage("create", parent.display().to_string(), e))?;
        }

        let content = serde_json::to_string_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &content)
            .await
            .map_err(|e| TrackerError::storage("write", tmp_path.display().to_string(), e))?;
        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| TrackerError::storage("rename", path.display().to_string(), e))?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load_checkpoint(&self, source_id: &SourceId) -> TrackerResult<CheckpointFile> {
        let path = self.checkpoint_path(source_id);
        Ok(Self::read_json(&path)
            .await?
            .unwrap_or_else(|| CheckpointFile::empty(source_id.clone())))
    }

    async fn append_checkpoint(
        &self,
        source_id: &SourceId,
        manuscript_id: &str,
        processed_at: DateTime<Utc>,
    ) -> TrackerResult<()> {
        let path = self.checkpoint_path(source_id);
        let mut checkpoint = Self::read_json(&path)
            .await?
            .unwrap_or_else(|| CheckpointFile::empty(source_id.clone()));
        checkpoint.processed.push(ProcessedEntry {
            manuscript_id: manuscript_id.to_string(),
            processed_at,
        });
        checkpoint.updated_at = processed_at;
        self.write_json_atomic(&path, &checkpoint).await
    }

    async fn clear_checkpoint(&self, source_id: &SourceId) -> TrackerResult<()> {
        let path = self.checkpoint_path(source_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrackerError::storage(
                "remove",
                path.display().to_string(),
                e,
            )),
        }
    }

    async fn load_snapshot(&self, source_id: &SourceId) -> TrackerResult<SnapshotFile> {
        let path = self.snapshot_path(source_id);
        Ok(Self::read_json(&path)
            .await?
            .unwrap_or_else(|| SnapshotFile::empty(source_id.clone())))
    }

    async fn replace_snapshot(&self, snapshot: &SnapshotFile) -> TrackerResult<()> {
        let path = self.snapshot_path(&snapshot.source_id);
        self.write_json_atomic(&path, snapshot).await
    }
}
