//! Durable per-source state: snapshot and checkpoint file schemas
//!
//! Both files are plain JSON so operational tooling can inspect them. Each
//! carries a schema version for forward migration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::manuscript::Manuscript;
use super::SourceId;

/// Version stamped into every persisted state file
pub const STATE_SCHEMA_VERSION: u32 = 1;

/// A manuscript as last merged into the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptSnapshot {
    #[serde(flatten)]
    pub manuscript: Manuscript,
    pub last_seen_at: DateTime<Utc>,
}

/// Last fully-merged view of every manuscript ever seen on one source
///
/// Manuscripts absent from the newest pull are retained: disappearance from
/// a listing is never treated as evidence of deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub schema_version: u32,
    pub source_id: SourceId,
    pub updated_at: DateTime<Utc>,
    pub manuscripts: BTreeMap<String, ManuscriptSnapshot>,
}

impl SnapshotFile {
    pub fn empty(source_id: SourceId) -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            source_id,
            updated_at: Utc::now(),
            manuscripts: BTreeMap::new(),
        }
    }
}

/// One manuscript id recorded as processed during the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedEntry {
    pub manuscript_id: String,
    pub processed_at: DateTime<Utc>,
}

/// Intra-run log of already-processed manuscript ids
///
/// Appended durably after each successful fetch and discarded once the run
/// reaches a terminal verdict; its only purpose is making a crashed run
/// safe to re-launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointFile {
    pub schema_version: u32,
    pub source_id: SourceId,
    pub updated_at: DateTime<Utc>,
    pub processed: Vec<ProcessedEntry>,
}

impl CheckpointFile {
    pub fn empty(source_id: SourceId) -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            source_id,
            updated_at: Utc::now(),
            processed: Vec::new(),
        }
    }

    /// Reconstruct the processed-id set used for skip decisions
    pub fn processed_ids(&self) -> HashSet<String> {
        self.processed
            .iter()
            .map(|entry| entry.manuscript_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceId {
        SourceId::new("test-source").unwrap()
    }

    #[test]
    fn test_empty_checkpoint_has_no_processed_ids() {
        let checkpoint = CheckpointFile::empty(source());
        assert!(checkpoint.processed_ids().is_empty());
        assert_eq!(checkpoint.schema_version, STATE_SCHEMA_VERSION);
    }

    #[test]
    fn test_snapshot_file_round_trips_through_json() {
        let mut snapshot = SnapshotFile::empty(source());
        snapshot.manuscripts.insert(
            "MS-1".to_string(),
            ManuscriptSnapshot {
                manuscript: Manuscript {
                    id: "MS-1".to_string(),
                    title: "On Things".to_string(),
                    status: "Under Review".to_string(),
                    submitted_at: None,
                    referees: Default::default(),
                    documents: Default::default(),
                },
                last_seen_at: Utc::now(),
            },
        );

        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let restored: SnapshotFile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.manuscripts, snapshot.manuscripts);
        assert_eq!(restored.source_id, snapshot.source_id);
    }

    #[test]
    fn test_processed_ids_deduplicate() {
        let mut checkpoint = CheckpointFile::empty(source());
        for id in ["MS-1", "MS-2", "MS-1"] {
            checkpoint.processed.push(ProcessedEntry {
                manuscript_id: id.to_string(),
                processed_at: Utc::now(),
            });
        }
        let ids = checkpoint.processed_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("MS-1"));
        assert!(ids.contains("MS-2"));
    }
}
