//! Per-source configuration surface

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{SharedError, SharedResult};

use super::SourceId;

/// Weights of the quality score components
///
/// The defaults are a tunable policy, not a law; any nonnegative weighting
/// is accepted and the resulting score is clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub timeliness: f64,
    pub manuscript_completeness: f64,
    pub data_integrity: f64,
    pub referee_completeness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            timeliness: 0.25,
            manuscript_completeness: 0.35,
            data_integrity: 0.25,
            referee_completeness: 0.15,
        }
    }
}

/// Configuration for pulling one source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub source_id: SourceId,

    /// Score at or above which a pull is a full success
    #[serde(default = "default_min_quality")]
    pub min_quality_threshold: f64,

    /// Score at or above which a pull still counts as partial success
    #[serde(default = "default_partial_floor")]
    pub partial_success_floor: f64,

    /// Consecutive fetch failures that end the processing loop early
    #[serde(default = "default_failure_limit")]
    pub consecutive_failure_limit: u32,

    /// Days ahead within which a due date counts as approaching
    #[serde(default = "default_deadline_window")]
    pub approaching_deadline_window_days: i64,

    /// Budget for fetching one manuscript's detail
    #[serde(default = "default_timeout_secs")]
    pub per_manuscript_timeout_secs: u64,

    #[serde(default)]
    pub score_weights: ScoreWeights,
}

fn default_min_quality() -> f64 {
    0.7
}

fn default_partial_floor() -> f64 {
    0.3
}

fn default_failure_limit() -> u32 {
    5
}

fn default_deadline_window() -> i64 {
    7
}

fn default_timeout_secs() -> u64 {
    30
}

impl SourceConfig {
    /// Configuration with documented defaults for the given source
    pub fn new(source_id: SourceId) -> Self {
        Self {
            source_id,
            min_quality_threshold: default_min_quality(),
            partial_success_floor: default_partial_floor(),
            consecutive_failure_limit: default_failure_limit(),
            approaching_deadline_window_days: default_deadline_window(),
            per_manuscript_timeout_secs: default_timeout_secs(),
            score_weights: ScoreWeights::default(),
        }
    }

    pub fn with_min_quality(mut self, threshold: f64) -> Self {
        self.min_quality_threshold = threshold;
        self
    }

    pub fn with_failure_limit(mut self, limit: u32) -> Self {
        self.consecutive_failure_limit = limit;
        self
    }

    pub fn with_deadline_window_days(mut self, days: i64) -> Self {
        self.approaching_deadline_window_days = days;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_manuscript_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn per_manuscript_timeout(&self) -> Duration {
        Duration::from_secs(self.per_manuscript_timeout_secs)
    }

    /// Reject configurations that cannot produce meaningful verdicts
    pub fn validate(&self) -> SharedResult<()> {
        if !(0.0..=1.0).contains(&self.min_quality_threshold) {
            return Err(SharedError::InvalidConfig {
                field: "min_quality_threshold".to_string(),
                value: self.min_quality_threshold.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.partial_success_floor)
            || self.partial_success_floor > self.min_quality_threshold
        {
            return Err(SharedError::InvalidConfig {
                field: "partial_success_floor".to_string(),
                value: self.partial_success_floor.to_string(),
            });
        }
        if self.consecutive_failure_limit == 0 {
            return Err(SharedError::InvalidConfig {
                field: "consecutive_failure_limit".to_string(),
                value: "0".to_string(),
            });
        }
        if self.approaching_deadline_window_days < 0 {
            return Err(SharedError::InvalidConfig {
                field: "approaching_deadline_window_days".to_string(),
                value: self.approaching_deadline_window_days.to_string(),
            });
        }
        if self.per_manuscript_timeout_secs == 0 {
            return Err(SharedError::InvalidConfig {
                field: "per_manuscript_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        let weights = [
            self.score_weights.timeliness,
            self.score_weights.manuscript_completeness,
            self.score_weights.data_integrity,
            self.score_weights.referee_completeness,
        ];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(SharedError::InvalidConfig {
                field: "score_weights".to_string(),
                value: format!("{weights:?}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SourceConfig {
        SourceConfig::new(SourceId::new("test-source").unwrap())
    }

    #[test]
    fn test_defaults_validate() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_quality_threshold, 0.7);
        assert_eq!(config.partial_success_floor, 0.3);
        assert_eq!(config.consecutive_failure_limit, 5);
        assert_eq!(config.approaching_deadline_window_days, 7);
    }

    #[test]
    fn test_floor_above_threshold_rejected() {
        let config = config().with_min_quality(0.4);
        // partial floor 0.3 is fine under 0.4
        assert!(config.validate().is_ok());
        let mut config = config;
        config.partial_success_floor = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_failure_limit_rejected() {
        let mut config = config();
        config.consecutive_failure_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = config();
        config.score_weights.timeliness = -0.1;
        assert!(config.validate().is_err());
    }
}
