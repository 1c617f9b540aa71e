//! Change detection between a pull and the prior snapshot
//!
//! Pure functions: the caller supplies the clock and persists the returned
//! snapshot. Nothing here deletes; a manuscript missing from the newest
//! pull keeps its snapshot entry untouched.

use chrono::{DateTime, Duration, Utc};

use shared::{
    normalize_name, ChangeSet, DeadlineAlert, Manuscript, ManuscriptSnapshot, NewReferee, PullResult,
    Referee, RefereeStatus, RefereeTransition, SnapshotFile, StatusTransition,
};

/// Diff a pull result against the prior snapshot
///
/// Returns the change set and the successor snapshot. The successor is the
/// prior snapshot with the current manuscripts upserted; entries absent from
/// the pull are retained with their existing `last_seen_at`.
pub fn detect(
    result: &PullResult,
    prior: &SnapshotFile,
    now: DateTime<Utc>,
    window_days: i64,
) -> (ChangeSet, SnapshotFile) {
    let mut changes = ChangeSet::default();

    for manuscript in &result.manuscripts {
        match prior.manuscripts.get(&manuscript.id) {
            None => changes.new_manuscripts.push(manuscript.id.clone()),
            Some(known) => {
                if known.manuscript.status != manuscript.status {
                    changes.status_transitions.push(StatusTransition {
                        manuscript_id: manuscript.id.clone(),
                        from: known.manuscript.status.clone(),
                        to: manuscript.status.clone(),
                    });
                }
                diff_referees(manuscript, &known.manuscript, &mut changes);
            }
        }

        collect_deadlines(manuscript, now, window_days, &mut changes);
    }

    let mut next = prior.clone();
    next.updated_at = now;
    for manuscript in &result.manuscripts {
        next.manuscripts.insert(
            manuscript.id.clone(),
            ManuscriptSnapshot {
                manuscript: manuscript.clone(),
                last_seen_at: now,
            },
        );
    }

    (changes, next)
}

/// Resolve referee identities against the previously known manuscript
fn diff_referees(current: &Manuscript, known: &Manuscript, changes: &mut ChangeSet) {
    for referee in current.referees.values() {
        match resolve_identity(referee, known) {
            Resolution::Matched(prior) => {
                if prior.status != referee.status {
                    if RefereeStatus::is_regression(prior.status, referee.status) {
                        changes.warnings.push(format!(
                            "manuscript {}: referee '{}' moved backward from {} to {}",
                            current.id, referee.display_name, prior.status, referee.status
                        ));
                    }
                    changes.referee_transitions.push(RefereeTransition {
                        manuscript_id: current.id.clone(),
                        identity_key: referee.identity_key.clone(),
                        from: prior.status,
                        to: referee.status,
                    });
                }
            }
            Resolution::Ambiguous(count) => {
                changes.warnings.push(format!(
                    "manuscript {}: name '{}' matches {} prior referees, treating as new",
                    current.id, referee.display_name, count
                ));
                changes.new_referees.push(NewReferee {
                    manuscript_id: current.id.clone(),
                    identity_key: referee.identity_key.clone(),
                    display_name: referee.display_name.clone(),
                });
            }
            Resolution::Unmatched => {
                changes.new_referees.push(NewReferee {
                    manuscript_id: current.id.clone(),
                    identity_key: referee.identity_key.clone(),
                    display_name: referee.display_name.clone(),
                });
            }
        }
    }
}

enum Resolution<'a> {
    Matched(&'a Referee),
    Ambiguous(usize),
    Unmatched,
}

/// Exact email match first; normalized-name match as the fallback
///
/// A name matching more than one prior referee is never auto-merged:
/// silently merging two people is worse than a harmless duplicate.
fn resolve_identity<'a>(referee: &Referee, known: &'a Manuscript) -> Resolution<'a> {
    if let Some(email) = &referee.email {
        if let Some(prior) = known
            .referees
            .values()
            .find(|p| p.email.as_deref() == Some(email.as_str()))
        {
            return Resolution::Matched(prior);
        }
    }

    let wanted = normalize_name(&referee.display_name);
    if wanted.is_empty() {
        return Resolution::Unmatched;
    }
    let candidates: Vec<&Referee> = known
        .referees
        .values()
        .filter(|p| normalize_name(&p.display_name) == wanted)
        .collect();
    match candidates.len() {
        0 => Resolution::Unmatched,
        1 => Resolution::Matched(candidates[0]),
        n => Resolution::Ambiguous(n),
    }
}

/// Flag accepted referees whose report is overdue or coming due
fn collect_deadlines(
    manuscript: &Manuscript,
    now: DateTime<Utc>,
    window_days: i64,
    changes: &mut ChangeSet,
) {
    for referee in manuscript.referees.values() {
        if referee.status != RefereeStatus::Accepted {
            continue;
        }
        let Some(due) = referee.timeline.due else {
            continue;
        };
        let alert = DeadlineAlert {
            manuscript_id: manuscript.id.clone(),
            identity_key: referee.identity_key.clone(),
            display_name: referee.display_name.clone(),
            due,
        };
        if due < now {
            changes.overdue_alerts.push(alert);
        } else if due <= now + Duration::days(window_days) {
            changes.approaching_deadlines.push(alert);
        }
    }
}
