//! Offline source adapter replaying captured portal data
//!
//! Replays a directory of raw manuscript JSON files (one file per
//! manuscript, file stem = manuscript id) through the `SourceAdapter`
//! contract, so the whole pipeline can be exercised without a live portal
//! session.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::traits::SourceAdapter;
use shared::{AuthOk, PullError, PullErrorKind, RawManuscript};

/// Adapter backed by captured fixture files instead of a live portal
pub struct ReplayAdapter {
    fixtures_dir: PathBuf,
    deny_auth: bool,
}

impl ReplayAdapter {
    pub fn new(fixtures_dir: impl Into<PathBuf>) -> Self {
        Self {
            fixtures_dir: fixtures_dir.into(),
            deny_auth: false,
        }
    }

    /// Simulate a portal rejecting the session
    pub fn with_auth_denied(mut self) -> Self {
        self.deny_auth = true;
        self
    }

    fn manuscript_path(&self, manuscript_id: &str) -> PathBuf {
        self.fixtures_dir.join(format!("{manuscript_id}.json"))
    }
}

#[async_trait]
impl SourceAdapter for ReplayAdapter {
    async fn authenticate(&mut self) -> Result<AuthOk, PullError> {
        if self.deny_auth {
            return Err(PullError::auth("replay session denied"));
        }
        if !self.fixtures_dir.is_dir() {
            return Err(PullError::navigation(format!(
                "fixture directory {} does not exist",
                self.fixtures_dir.display()
            )));
        }
        Ok(AuthOk {
            account: Some("replay".to_string()),
        })
    }

    async fn list_manuscript_ids(&mut self) -> Result<Vec<String>, PullError> {
        let mut entries = fs::read_dir(&self.fixtures_dir).await.map_err(|e| {
            PullError::navigation(format!(
                "cannot list {}: {e}",
                self.fixtures_dir.display()
            ))
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PullError::navigation(format!("directory walk failed: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        // Directory order is arbitrary; keep listings stable across runs.
        ids.sort();
        Ok(ids)
    }

    async fn fetch_manuscript(&mut self, manuscript_id: &str) -> Result<RawManuscript, PullError> {
        let path = self.manuscript_path(manuscript_id);
        let content = fs::read_to_string(&path).await.map_err(|e| {
            PullError::navigation(format!("cannot read {}: {e}", path.display()))
                .with_manuscript(manuscript_id.to_string())
        })?;
        serde_json::from_str(&content).map_err(|e| {
            PullError::new(
                PullErrorKind::Parsing,
                format!("{} is not a valid manuscript capture: {e}", path.display()),
            )
            .with_manuscript(manuscript_id.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn capture(dir: &TempDir, id: &str, title: &str) {
        let json = serde_json::json!({
            "id": id,
            "title": title,
            "status": "Under Review",
            "referees": [],
            "documents": [],
        });
        std::fs::write(
            dir.path().join(format!("{id}.json")),
            serde_json::to_string_pretty(&json).unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_lists_and_fetches_captures() {
        let dir = TempDir::new().unwrap();
        capture(&dir, "MS-2", "Second");
        capture(&dir, "MS-1", "First");

        let mut adapter = ReplayAdapter::new(dir.path());
        adapter.authenticate().await.unwrap();

        let ids = adapter.list_manuscript_ids().await.unwrap();
        assert_eq!(ids, vec!["MS-1".to_string(), "MS-2".to_string()]);

        let raw = adapter.fetch_manuscript("MS-1").await.unwrap();
        assert_eq!(raw.title, "First");
    }

    #[tokio::test]
    async fn test_denied_auth_is_an_auth_error() {
        let dir = TempDir::new().unwrap();
        let mut adapter = ReplayAdapter::new(dir.path()).with_auth_denied();
        let err = adapter.authenticate().await.unwrap_err();
        assert_eq!(err.kind, PullErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_unparseable_capture_is_a_parsing_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("MS-1.json"), "{ broken").unwrap();

        let mut adapter = ReplayAdapter::new(dir.path());
        let err = adapter.fetch_manuscript("MS-1").await.unwrap_err();
        assert_eq!(err.kind, PullErrorKind::Parsing);
        assert_eq!(err.manuscript_id.as_deref(), Some("MS-1"));
    }

    #[tokio::test]
    async fn test_missing_capture_is_a_navigation_error() {
        let dir = TempDir::new().unwrap();
        let mut adapter = ReplayAdapter::new(dir.path());
        let err = adapter.fetch_manuscript("MS-404").await.unwrap_err();
        assert_eq!(err.kind, PullErrorKind::Navigation);
    }
}
