//! Core types used throughout the manuscript tracking system

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};

pub mod changes;
pub mod config;
pub mod manuscript;
pub mod pull;
pub mod quality;
pub mod snapshot;

pub use changes::{ChangeSet, DeadlineAlert, NewReferee, RefereeTransition, StatusTransition};
pub use config::{ScoreWeights, SourceConfig};
pub use manuscript::{
    normalize_name, Manuscript, RawManuscript, RawReferee, Referee, RefereeStatus, RefereeTimeline,
};
pub use pull::{AuthOk, PullError, PullErrorKind, PullReport, PullResult};
pub use quality::{ErrorCounts, Issue, PullMetrics, PullStatus, QualityVerdict, Severity};
pub use snapshot::{
    CheckpointFile, ManuscriptSnapshot, ProcessedEntry, SnapshotFile, STATE_SCHEMA_VERSION,
};

/// Identifier of one configured remote source
///
/// Doubles as the directory name for that source's state files, so the
/// character set is restricted to safe path components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Create a validated source id
    pub fn new(id: impl Into<String>) -> SharedResult<Self> {
        let id = id.into();
        let valid = id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if valid {
            Ok(SourceId(id))
        } else {
            Err(SharedError::InvalidSourceId { input: id })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SourceId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_accepts_safe_names() {
        assert!(SourceId::new("editorial-north").is_ok());
        assert!(SourceId::new("portal_2.prod").is_ok());
    }

    #[test]
    fn test_source_id_rejects_path_hazards() {
        assert!(SourceId::new("").is_err());
        assert!(SourceId::new("a/b").is_err());
        assert!(SourceId::new("..").is_err());
        assert!(SourceId::new("spaced name").is_err());
    }
}
