//! Quality metrics, verdicts, and validation issues

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pull::PullErrorKind;

/// Error totals bucketed by classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCounts {
    pub auth: u32,
    pub navigation: u32,
    pub parsing: u32,
    pub download: u32,
    pub unknown: u32,
}

impl ErrorCounts {
    pub fn record(&mut self, kind: PullErrorKind) {
        match kind {
            PullErrorKind::Auth => self.auth += 1,
            PullErrorKind::Navigation => self.navigation += 1,
            PullErrorKind::Parsing => self.parsing += 1,
            PullErrorKind::Download => self.download += 1,
            PullErrorKind::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.auth + self.navigation + self.parsing + self.download + self.unknown
    }
}

/// Measurements derived from one pull result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullMetrics {
    /// Manuscript ids the source listed
    pub manuscripts_found: usize,
    /// Manuscripts actually fetched this run
    pub manuscripts_processed: usize,
    /// Fraction of manuscripts with an id and a title or at least one referee
    pub manuscript_completeness: f64,
    /// Fraction of referees with an email-backed identity key
    pub referee_completeness: f64,
    /// Document references seen across fetched manuscripts
    pub documents_attempted: usize,
    pub error_counts: ErrorCounts,
    /// 1 − errors / (processed + documents attempted), clamped to [0, 1]
    pub data_integrity: f64,
    /// External SLA signal; 1.0 when none is wired in
    pub timeliness: f64,
}

/// Terminal verdict of one pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullStatus {
    Success,
    PartialSuccess,
    Failed,
    AuthFailed,
}

impl fmt::Display for PullStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PullStatus::Success => "success",
            PullStatus::PartialSuccess => "partial_success",
            PullStatus::Failed => "failed",
            PullStatus::AuthFailed => "auth_failed",
        };
        write!(f, "{label}")
    }
}

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One diagnostic finding from the validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Scored, classified outcome of a pull
///
/// A pure derivation of the pull result: always recomputable, never
/// persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityVerdict {
    pub metrics: PullMetrics,
    /// Weighted quality score in [0, 1]
    pub score: f64,
    pub status: PullStatus,
    pub issues: Vec<Issue>,
}

impl QualityVerdict {
    /// A verdict is valid when no error-severity issue was raised
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}
