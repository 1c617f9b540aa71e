//! Quality contract: scoring and validation of a pull result
//!
//! Everything here is a pure function of the pull result and the source
//! configuration. The verdict is always recomputable and never persisted.

use shared::{
    ErrorCounts, Issue, PullMetrics, PullResult, PullStatus, QualityVerdict, ScoreWeights,
    Severity, SourceConfig,
};

/// Evaluate one pull result into metrics, a score, a status, and issues
pub fn evaluate(result: &PullResult, config: &SourceConfig) -> QualityVerdict {
    let metrics = compute_metrics(result);
    let score = weighted_score(&metrics, &config.score_weights);
    let status = classify(result, &metrics, score, config);
    // The diagnostic pass reads the same data but never alters the status.
    let issues = validate(result, &metrics);

    QualityVerdict {
        metrics,
        score,
        status,
        issues,
    }
}

fn compute_metrics(result: &PullResult) -> PullMetrics {
    let processed = result.manuscripts.len();

    let complete_manuscripts = result
        .manuscripts
        .iter()
        .filter(|m| !m.id.is_empty() && (!m.title.trim().is_empty() || !m.referees.is_empty()))
        .count();

    let referee_total = result.referee_count();
    let referees_with_email: usize = result
        .manuscripts
        .iter()
        .flat_map(|m| m.referees.values())
        .filter(|r| r.has_email_identity())
        .count();

    let documents_attempted: usize = result.manuscripts.iter().map(|m| m.documents.len()).sum();

    let mut error_counts = ErrorCounts::default();
    for error in &result.errors {
        error_counts.record(error.kind);
    }

    PullMetrics {
        manuscripts_found: result.manuscripts_found,
        manuscripts_processed: processed,
        // An empty pull has nothing incomplete; the zero-yield status rule
        // decides those runs.
        manuscript_completeness: fraction(complete_manuscripts, processed),
        referee_completeness: fraction(referees_with_email, referee_total),
        documents_attempted,
        data_integrity: data_integrity(error_counts.total(), processed + documents_attempted),
        timeliness: 1.0,
        error_counts,
    }
}

fn fraction(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn data_integrity(total_errors: u32, attempted: usize) -> f64 {
    if attempted == 0 {
        return 1.0;
    }
    (1.0 - f64::from(total_errors) / attempted as f64).clamp(0.0, 1.0)
}

fn weighted_score(metrics: &PullMetrics, weights: &ScoreWeights) -> f64 {
    let score = weights.timeliness * metrics.timeliness
        + weights.manuscript_completeness * metrics.manuscript_completeness
        + weights.data_integrity * metrics.data_integrity
        + weights.referee_completeness * metrics.referee_completeness;
    score.clamp(0.0, 1.0)
}

/// Terminal status of the run; first matching rule wins
fn classify(
    result: &PullResult,
    metrics: &PullMetrics,
    score: f64,
    config: &SourceConfig,
) -> PullStatus {
    if metrics.error_counts.auth > 0 {
        return PullStatus::AuthFailed;
    }
    if result.manuscripts.is_empty() && result.referee_count() == 0 {
        return PullStatus::Failed;
    }
    if score >= config.min_quality_threshold {
        return PullStatus::Success;
    }
    if score >= config.partial_success_floor {
        return PullStatus::PartialSuccess;
    }
    PullStatus::Failed
}

/// Independent diagnostic walk over the result and its metrics
pub fn validate(result: &PullResult, metrics: &PullMetrics) -> Vec<Issue> {
    let mut issues = Vec::new();

    if metrics.error_counts.auth > 0 {
        issues.push(
            Issue::new(
                Severity::Error,
                "auth",
                "the portal rejected the session before any manuscript was pulled",
            )
            .with_suggestion("verify the stored credentials and re-run"),
        );
    }

    if metrics.manuscript_completeness < 0.7 {
        issues.push(
            Issue::new(
                Severity::Error,
                "completeness",
                format!(
                    "only {:.0}% of manuscripts carried a title or any referee",
                    metrics.manuscript_completeness * 100.0
                ),
            )
            .with_suggestion("the portal layout may have changed; review the adapter's selectors"),
        );
    }

    if metrics.referee_completeness < 0.5 {
        issues.push(
            Issue::new(
                Severity::Warning,
                "referees",
                format!(
                    "only {:.0}% of referees have an email-backed identity",
                    metrics.referee_completeness * 100.0
                ),
            )
            .with_suggestion("name-only identities make cross-run matching less reliable"),
        );
    }

    if metrics.error_counts.parsing > 0 {
        issues.push(
            Issue::new(
                Severity::Warning,
                "parsing",
                format!(
                    "{} manuscript(s) no longer match the expected remote shape",
                    metrics.error_counts.parsing
                ),
            )
            .with_suggestion("the source adapter likely needs updating"),
        );
    }

    if metrics.data_integrity < 0.8 {
        issues.push(Issue::new(
            Severity::Warning,
            "integrity",
            format!(
                "error volume is high relative to work attempted (integrity {:.2})",
                metrics.data_integrity
            ),
        ));
    }

    if !result.warnings.is_empty() {
        issues.push(Issue::new(
            Severity::Info,
            "warnings",
            format!("{} warning(s) accumulated during the run", result.warnings.len()),
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{Manuscript, PullError, Referee, RefereeStatus, RefereeTimeline, SourceId};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn manuscript(id: &str, title: &str) -> Manuscript {
        Manuscript {
            id: id.to_string(),
            title: title.to_string(),
            status: "Under Review".to_string(),
            submitted_at: None,
            referees: BTreeMap::new(),
            documents: Default::default(),
        }
    }

    fn referee(name: &str, email: Option<&str>) -> Referee {
        Referee {
            identity_key: email.map(str::to_string).unwrap_or_else(|| name.to_lowercase()),
            display_name: name.to_string(),
            email: email.map(str::to_string),
            status: RefereeStatus::Accepted,
            timeline: RefereeTimeline::default(),
            report_ref: None,
        }
    }

    fn result_with(manuscripts: Vec<Manuscript>, errors: Vec<PullError>) -> PullResult {
        PullResult {
            run_id: Uuid::new_v4(),
            source_id: SourceId::new("test-source").unwrap(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
            manuscripts_found: manuscripts.len(),
            manuscripts,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Weights that make the score equal manuscript completeness, so the
    /// status bands can be exercised directly.
    fn completeness_only_config() -> SourceConfig {
        let mut config = SourceConfig::new(SourceId::new("test-source").unwrap());
        config.score_weights = shared::ScoreWeights {
            timeliness: 0.0,
            manuscript_completeness: 1.0,
            data_integrity: 0.0,
            referee_completeness: 0.0,
        };
        config
    }

    fn mixed_result(complete: usize, incomplete: usize) -> PullResult {
        let mut manuscripts = Vec::new();
        for i in 0..complete {
            manuscripts.push(manuscript(&format!("C-{i}"), "A Title"));
        }
        for i in 0..incomplete {
            manuscripts.push(manuscript(&format!("I-{i}"), ""));
        }
        result_with(manuscripts, Vec::new())
    }

    #[test]
    fn test_high_score_is_success() {
        let verdict = evaluate(&mixed_result(3, 1), &completeness_only_config());
        assert!(verdict.score >= 0.7);
        assert_eq!(verdict.status, PullStatus::Success);
    }

    #[test]
    fn test_middling_score_is_partial_success() {
        let verdict = evaluate(&mixed_result(2, 2), &completeness_only_config());
        assert!(verdict.score >= 0.3 && verdict.score < 0.7);
        assert_eq!(verdict.status, PullStatus::PartialSuccess);
    }

    #[test]
    fn test_low_score_is_failed() {
        let verdict = evaluate(&mixed_result(1, 3), &completeness_only_config());
        assert!(verdict.score < 0.3);
        assert_eq!(verdict.status, PullStatus::Failed);
    }

    #[test]
    fn test_auth_error_wins_regardless_of_score() {
        let mut result = mixed_result(4, 0);
        result.errors.push(PullError::auth("session rejected"));
        let verdict = evaluate(&result, &completeness_only_config());
        assert_eq!(verdict.status, PullStatus::AuthFailed);
        assert!(!verdict.is_valid());
    }

    #[test]
    fn test_zero_yield_is_failed_even_with_perfect_score() {
        let result = result_with(Vec::new(), Vec::new());
        let verdict = evaluate(&result, &SourceConfig::new(SourceId::new("s").unwrap()));
        // Empty metrics are all vacuously 1.0, so only the yield rule can
        // catch this case.
        assert!((verdict.score - 1.0).abs() < 1e-9);
        assert_eq!(verdict.status, PullStatus::Failed);
    }

    #[test]
    fn test_default_weights_score_perfect_pull_at_one() {
        let mut m = manuscript("MS-1", "A Title");
        m.referees.insert(
            "a@example.org".to_string(),
            referee("Ann Author", Some("a@example.org")),
        );
        let verdict = evaluate(
            &result_with(vec![m], Vec::new()),
            &SourceConfig::new(SourceId::new("s").unwrap()),
        );
        assert!((verdict.score - 1.0).abs() < 1e-9);
        assert_eq!(verdict.status, PullStatus::Success);
        assert!(verdict.is_valid());
    }

    #[test]
    fn test_data_integrity_counts_errors_against_work() {
        let mut result = mixed_result(2, 0);
        result
            .errors
            .push(PullError::navigation("page timed out").with_manuscript("MS-9"));
        let verdict = evaluate(&result, &SourceConfig::new(SourceId::new("s").unwrap()));
        assert!((verdict.metrics.data_integrity - 0.5).abs() < 1e-9);
        assert_eq!(verdict.metrics.error_counts.navigation, 1);
    }

    #[test]
    fn test_integrity_is_one_when_nothing_was_attempted() {
        let mut result = result_with(Vec::new(), Vec::new());
        result.errors.push(PullError::auth("rejected"));
        let verdict = evaluate(&result, &SourceConfig::new(SourceId::new("s").unwrap()));
        assert_eq!(verdict.metrics.data_integrity, 1.0);
    }

    #[test]
    fn test_validation_flags_low_completeness_without_changing_status() {
        let verdict = evaluate(&mixed_result(2, 2), &completeness_only_config());
        assert_eq!(verdict.status, PullStatus::PartialSuccess);
        assert!(verdict
            .issues
            .iter()
            .any(|i| i.category == "completeness" && i.severity == Severity::Error));
        assert!(!verdict.is_valid());
    }

    #[test]
    fn test_validation_warns_on_name_only_referees() {
        let mut m = manuscript("MS-1", "A Title");
        m.referees
            .insert("ann author".to_string(), referee("Ann Author", None));
        let verdict = evaluate(
            &result_with(vec![m], Vec::new()),
            &SourceConfig::new(SourceId::new("s").unwrap()),
        );
        assert!(verdict
            .issues
            .iter()
            .any(|i| i.category == "referees" && i.severity == Severity::Warning));
        // Warnings alone leave the verdict valid.
        assert!(verdict.is_valid());
    }
}
