//! Test fixtures and data for tracker tests
//!
//! Consistent manuscript and referee data used across the test suites.

use std::path::Path;

use shared::{RawManuscript, RawReferee, SourceConfig, SourceId};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Standard test source ids
    pub const SOURCE: &'static str = "portal-test";
    pub const SOURCE_B: &'static str = "portal-other";

    pub fn source_id() -> SourceId {
        SourceId::new(Self::SOURCE).unwrap()
    }

    pub fn config() -> SourceConfig {
        SourceConfig::new(Self::source_id())
    }

    /// A complete raw manuscript with one email-backed accepted referee
    pub fn raw_manuscript(id: &str) -> RawManuscript {
        RawManuscript {
            id: id.to_string(),
            title: format!("Title of {id}"),
            status: "Under Review".to_string(),
            submitted_at: None,
            referees: vec![Self::raw_referee(
                &format!("Referee of {id}"),
                Some(&format!("referee.{}@example.org", id.to_lowercase())),
                "Accepted",
            )],
            documents: vec![format!("{id}-main.pdf")],
        }
    }

    pub fn raw_referee(name: &str, email: Option<&str>, status: &str) -> RawReferee {
        RawReferee {
            display_name: name.to_string(),
            email: email.map(str::to_string),
            status: status.to_string(),
            invited: None,
            accepted: None,
            due: None,
            completed: None,
            declined: None,
            report_ref: None,
        }
    }

    /// Write a raw manuscript as a replay capture file
    pub fn write_capture(dir: &Path, raw: &RawManuscript) {
        let path = dir.join(format!("{}.json", raw.id));
        std::fs::write(path, serde_json::to_string_pretty(raw).unwrap()).unwrap();
    }
}
