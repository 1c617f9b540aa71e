//! Pull execution results and classified errors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::changes::ChangeSet;
use super::manuscript::Manuscript;
use super::quality::QualityVerdict;
use super::SourceId;

/// Classification of a pull failure, bucketed verbatim by quality metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PullErrorKind {
    /// Login or session failure; fatal to the run, never retried within it
    Auth,
    /// Page navigation or timeout failure; retried only on a future run
    Navigation,
    /// Remote shape mismatch; signals the adapter needs updating
    Parsing,
    /// Artifact fetch failure; does not block manuscript success
    Download,
    Unknown,
}

impl fmt::Display for PullErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PullErrorKind::Auth => "auth",
            PullErrorKind::Navigation => "navigation",
            PullErrorKind::Parsing => "parsing",
            PullErrorKind::Download => "download",
            PullErrorKind::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// One classified failure recorded during a pull
///
/// These are data accumulated on the result, not control flow; only an
/// `Auth` error changes how the run proceeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullError {
    pub kind: PullErrorKind,
    pub message: String,
    pub manuscript_id: Option<String>,
    pub at: DateTime<Utc>,
}

impl PullError {
    pub fn new(kind: PullErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            manuscript_id: None,
            at: Utc::now(),
        }
    }

    pub fn with_manuscript(mut self, manuscript_id: impl Into<String>) -> Self {
        self.manuscript_id = Some(manuscript_id.into());
        self
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(PullErrorKind::Auth, message)
    }

    pub fn navigation(message: impl Into<String>) -> Self {
        Self::new(PullErrorKind::Navigation, message)
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        Self::new(PullErrorKind::Parsing, message)
    }
}

impl fmt::Display for PullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.manuscript_id {
            Some(id) => write!(f, "[{}] {} ({})", self.kind, self.message, id),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Confirmation of a successfully opened portal session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthOk {
    /// Account label reported by the portal, when available
    pub account: Option<String>,
}

/// Outcome of one pull against one source
///
/// Immutable once returned by the orchestrator; quality evaluation and
/// change detection consume it independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullResult {
    pub run_id: Uuid,
    pub source_id: SourceId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Manuscript ids the source listed this run; zero when listing never
    /// happened (an aborted run)
    pub manuscripts_found: usize,
    /// Manuscripts in the order the source listed them
    pub manuscripts: Vec<Manuscript>,
    pub errors: Vec<PullError>,
    pub warnings: Vec<String>,
}

impl PullResult {
    /// Total referees across all pulled manuscripts
    pub fn referee_count(&self) -> usize {
        self.manuscripts.iter().map(|m| m.referees.len()).sum()
    }

    pub fn has_auth_error(&self) -> bool {
        self.errors.iter().any(|e| e.kind == PullErrorKind::Auth)
    }
}

/// The single object handed upward after a pull: result, verdict, changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullReport {
    pub result: PullResult,
    pub verdict: QualityVerdict,
    pub changes: ChangeSet,
}
