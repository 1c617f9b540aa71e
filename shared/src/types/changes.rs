//! Change sets produced by diffing a pull against the prior snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::manuscript::RefereeStatus;

/// A manuscript whose portal status changed between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub manuscript_id: String,
    pub from: String,
    pub to: String,
}

/// A referee not present on the manuscript in the prior snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReferee {
    pub manuscript_id: String,
    pub identity_key: String,
    pub display_name: String,
}

/// A known referee whose review status changed between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefereeTransition {
    pub manuscript_id: String,
    pub identity_key: String,
    pub from: RefereeStatus,
    pub to: RefereeStatus,
}

/// A referee whose report is overdue or coming due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineAlert {
    pub manuscript_id: String,
    pub identity_key: String,
    pub display_name: String,
    pub due: DateTime<Utc>,
}

/// Everything that changed between a pull and the prior snapshot
///
/// There is deliberately no notion of deletion: a manuscript missing from
/// the newest pull stays in the snapshot untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Ids of manuscripts seen for the first time
    pub new_manuscripts: Vec<String>,
    pub status_transitions: Vec<StatusTransition>,
    pub new_referees: Vec<NewReferee>,
    pub referee_transitions: Vec<RefereeTransition>,
    /// Accepted referees whose due date has passed
    pub overdue_alerts: Vec<DeadlineAlert>,
    /// Accepted referees due within the lookahead window
    pub approaching_deadlines: Vec<DeadlineAlert>,
    /// Anomalies observed while diffing: ambiguous identities, regressions
    pub warnings: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.new_manuscripts.is_empty()
            && self.status_transitions.is_empty()
            && self.new_referees.is_empty()
            && self.referee_transitions.is_empty()
            && self.overdue_alerts.is_empty()
            && self.approaching_deadlines.is_empty()
    }
}
