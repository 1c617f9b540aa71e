//! Manuscript and referee domain model
//!
//! A manuscript is one tracked submission on a remote portal; referees are
//! the reviewers attached to it. Raw variants carry the field values exactly
//! as a source adapter scraped them; conversion into the tracked model
//! derives identity keys and normalizes status labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Review status of a referee, normalized across portals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefereeStatus {
    Contacted,
    Accepted,
    Declined,
    Completed,
    Overdue,
    Unknown,
}

impl RefereeStatus {
    /// Map a portal's status label onto the normalized status
    ///
    /// Labels vary per portal; anything unrecognized becomes `Unknown`
    /// rather than failing the manuscript.
    pub fn from_portal_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "contacted" | "invited" | "pending" => RefereeStatus::Contacted,
            "accepted" | "agreed" | "reviewing" => RefereeStatus::Accepted,
            "declined" | "refused" | "unavailable" => RefereeStatus::Declined,
            "completed" | "complete" | "submitted" | "report received" => RefereeStatus::Completed,
            "overdue" | "late" => RefereeStatus::Overdue,
            _ => RefereeStatus::Unknown,
        }
    }

    /// Position along the review lifecycle, used to detect regressions
    fn rank(self) -> u8 {
        match self {
            RefereeStatus::Unknown => 0,
            RefereeStatus::Contacted => 1,
            RefereeStatus::Accepted | RefereeStatus::Declined => 2,
            RefereeStatus::Overdue => 3,
            RefereeStatus::Completed => 4,
        }
    }

    /// Whether moving from `from` to `to` runs backward along the lifecycle
    ///
    /// The lifecycle is monotonic: `Contacted → {Accepted, Declined}`,
    /// `Accepted → {Completed, Overdue}`. A backward move is reported as an
    /// anomaly by the change detector, never rejected. `Unknown` on either
    /// side is a parsing gap, not a portal regression.
    pub fn is_regression(from: RefereeStatus, to: RefereeStatus) -> bool {
        from != RefereeStatus::Unknown && to != RefereeStatus::Unknown && to.rank() < from.rank()
    }
}

impl fmt::Display for RefereeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RefereeStatus::Contacted => "contacted",
            RefereeStatus::Accepted => "accepted",
            RefereeStatus::Declined => "declined",
            RefereeStatus::Completed => "completed",
            RefereeStatus::Overdue => "overdue",
            RefereeStatus::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Review milestones for one referee, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefereeTimeline {
    pub invited: Option<DateTime<Utc>>,
    pub accepted: Option<DateTime<Utc>>,
    pub due: Option<DateTime<Utc>>,
    pub completed: Option<DateTime<Utc>>,
    pub declined: Option<DateTime<Utc>>,
}

/// One referee attached to a manuscript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referee {
    /// Email when known, else the normalized display name
    pub identity_key: String,
    pub display_name: String,
    pub email: Option<String>,
    pub status: RefereeStatus,
    pub timeline: RefereeTimeline,
    /// Opaque reference to a submitted report, if any
    pub report_ref: Option<String>,
}

impl Referee {
    /// Whether the identity key is backed by a real email address
    pub fn has_email_identity(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// One tracked manuscript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: String,
    pub title: String,
    /// Portal-defined status label, kept opaque
    pub status: String,
    pub submitted_at: Option<DateTime<Utc>>,
    /// Referees keyed by identity key
    pub referees: BTreeMap<String, Referee>,
    /// Opaque document references attached to the manuscript
    pub documents: BTreeSet<String>,
}

impl Manuscript {
    /// Convert scraped field values into the tracked model
    ///
    /// Derives referee identity keys (email first, normalized name as the
    /// fallback) and normalizes status labels. Returns the manuscript
    /// together with warnings for anything lossy: unrecognized status
    /// labels and colliding referee identities.
    pub fn from_raw(raw: RawManuscript) -> (Manuscript, Vec<String>) {
        let mut warnings = Vec::new();
        let mut referees = BTreeMap::new();

        for raw_referee in raw.referees {
            let status = RefereeStatus::from_portal_label(&raw_referee.status);
            if status == RefereeStatus::Unknown && !raw_referee.status.trim().is_empty() {
                warnings.push(format!(
                    "manuscript {}: unrecognized referee status label '{}'",
                    raw.id, raw_referee.status
                ));
            }

            let email = raw_referee
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_lowercase);
            let identity_key = email
                .clone()
                .unwrap_or_else(|| normalize_name(&raw_referee.display_name));

            let referee = Referee {
                identity_key: identity_key.clone(),
                display_name: raw_referee.display_name,
                email,
                status,
                timeline: RefereeTimeline {
                    invited: raw_referee.invited,
                    accepted: raw_referee.accepted,
                    due: raw_referee.due,
                    completed: raw_referee.completed,
                    declined: raw_referee.declined,
                },
                report_ref: raw_referee.report_ref,
            };

            if referees.contains_key(&identity_key) {
                warnings.push(format!(
                    "manuscript {}: duplicate referee identity '{}', keeping the first occurrence",
                    raw.id, identity_key
                ));
            } else {
                referees.insert(identity_key, referee);
            }
        }

        let manuscript = Manuscript {
            id: raw.id,
            title: raw.title,
            status: raw.status,
            submitted_at: raw.submitted_at,
            referees,
            documents: raw.documents.into_iter().collect(),
        };
        (manuscript, warnings)
    }
}

/// Raw manuscript detail as returned by a source adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawManuscript {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub referees: Vec<RawReferee>,
    #[serde(default)]
    pub documents: Vec<String>,
}

/// Raw referee fields as returned by a source adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReferee {
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub invited: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accepted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub declined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub report_ref: Option<String>,
}

/// Canonical form of a person name for identity matching
///
/// Case-folded, punctuation-stripped, whitespace-collapsed; a single
/// `"Last, First"` form is reordered to `"First Last"` so both spellings of
/// the same name canonicalize identically. Canonicalizing each side
/// independently keeps comparison symmetric.
pub fn normalize_name(name: &str) -> String {
    let reordered = match name.split_once(',') {
        Some((last, first)) => format!("{first} {last}"),
        None => name.to_string(),
    };
    let folded: String = reordered
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
