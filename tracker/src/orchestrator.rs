//! Pull orchestrator: drives one source end to end
//!
//! Coordinates the source adapter and the state store for a single run,
//! using dependency injection. Processing is strictly sequential because
//! the adapter owns one stateful portal session, and every per-manuscript
//! failure is accumulated, never thrown. Quality evaluation and change
//! detection consume the finished result independently.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use uuid::Uuid;

use shared::{
    source_debug, source_info, source_warn, CheckpointFile, Manuscript, PullError, PullErrorKind,
    PullReport, PullResult, SnapshotFile, SourceConfig, SourceId,
};

use crate::core::{diff, quality};
use crate::error::TrackerResult;
use crate::traits::{SourceAdapter, StateStore};

/// One run in progress against one source
///
/// Holds the processed-id set reconstructed from the checkpoint plus the
/// manuscripts fetched so far, so re-invoking `run` on the same handle
/// skips satisfied ids and still returns the full entity set.
pub struct RunHandle {
    run_id: Uuid,
    source_id: SourceId,
    processed: HashSet<String>,
    manuscripts: Vec<Manuscript>,
    load_warnings: Vec<String>,
}

impl RunHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// Ids already satisfied, whether by this handle or a prior crashed run
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

/// Orchestrates pulls for one configured source
pub struct PullOrchestrator<A, S>
where
    A: SourceAdapter,
    S: StateStore,
{
    config: SourceConfig,
    adapter: A,
    store: S,
}

impl<A, S> PullOrchestrator<A, S>
where
    A: SourceAdapter,
    S: StateStore,
{
    /// Create an orchestrator with injected adapter and store
    pub fn new(config: SourceConfig, adapter: A, store: S) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            adapter,
            store,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Open or resume the checkpoint for this source
    ///
    /// An unreadable checkpoint degrades to an empty one; the degradation
    /// surfaces as a warning on the next result, never as a failure.
    pub async fn begin(&self) -> TrackerResult<RunHandle> {
        let source_id = self.config.source_id.clone();
        let mut load_warnings = Vec::new();

        let checkpoint = match self.store.load_checkpoint(&source_id).await {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                source_warn!(source_id, "⚠️ Checkpoint unreadable, starting empty: {}", e);
                load_warnings.push(format!("checkpoint unreadable, starting empty: {e}"));
                CheckpointFile::empty(source_id.clone())
            }
        };

        let processed = checkpoint.processed_ids();
        if !processed.is_empty() {
            source_info!(
                source_id,
                "🔁 Resuming run with {} manuscripts already processed",
                processed.len()
            );
        }

        Ok(RunHandle {
            run_id: Uuid::new_v4(),
            source_id,
            processed,
            manuscripts: Vec::new(),
            load_warnings,
        })
    }

    /// Execute one pull against the source
    ///
    /// Always returns a result; classified failures accumulate on it. Only
    /// an authentication failure aborts early, since retrying the session
    /// within the run would fail identically and risks a portal lockout.
    pub async fn run(&mut self, handle: &mut RunHandle) -> TrackerResult<PullResult> {
        let source_id = handle.source_id.clone();
        let started_at = Utc::now();
        let mut errors: Vec<PullError> = Vec::new();
        let mut warnings = std::mem::take(&mut handle.load_warnings);

        source_info!(source_id, "🚀 Starting pull (run {})", handle.run_id);

        match self.adapter.authenticate().await {
            Ok(auth) => {
                source_info!(
                    source_id,
                    "🔐 Session opened{}",
                    auth.account
                        .as_deref()
                        .map(|a| format!(" as {a}"))
                        .unwrap_or_default()
                );
            }
            Err(e) => {
                source_warn!(source_id, "🔐 Session failed, aborting run: {}", e);
                errors.push(e);
                return Ok(finish(handle, started_at, 0, errors, warnings));
            }
        }

        let listed = match self.adapter.list_manuscript_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                source_warn!(source_id, "📋 Listing failed: {}", e);
                errors.push(e);
                return Ok(finish(handle, started_at, 0, errors, warnings));
            }
        };
        source_info!(source_id, "📋 Source listed {} manuscripts", listed.len());

        let mut consecutive_failures: u32 = 0;
        let mut checkpoint_warned = false;

        for manuscript_id in &listed {
            if handle.processed.contains(manuscript_id) {
                source_debug!(source_id, "⏭️ Skipping already-processed {}", manuscript_id);
                continue;
            }

            let fetch = timeout(
                self.config.per_manuscript_timeout(),
                self.adapter.fetch_manuscript(manuscript_id),
            )
            .await;

            match fetch {
                Ok(Ok(raw)) => {
                    let (manuscript, mut parse_warnings) = Manuscript::from_raw(raw);
                    warnings.append(&mut parse_warnings);

                    // Durable before the loop advances: a crash loses at
                    // most the in-flight manuscript.
                    if let Err(e) = self
                        .store
                        .append_checkpoint(&source_id, manuscript_id, Utc::now())
                        .await
                    {
                        source_warn!(source_id, "⚠️ Checkpoint append failed: {}", e);
                        if !checkpoint_warned {
                            warnings
                                .push(format!("checkpoint appends failing, resume degraded: {e}"));
                            checkpoint_warned = true;
                        }
                    }

                    handle.processed.insert(manuscript_id.clone());
                    handle.manuscripts.push(manuscript);
                    consecutive_failures = 0;
                }
                Ok(Err(e)) => {
                    let e = attach_manuscript(e, manuscript_id);
                    source_warn!(source_id, "📄 Fetch failed: {}", e);
                    errors.push(e);
                    consecutive_failures += 1;
                }
                Err(_elapsed) => {
                    let e = PullError::new(
                        PullErrorKind::Navigation,
                        format!(
                            "fetch timed out after {}s",
                            self.config.per_manuscript_timeout_secs
                        ),
                    )
                    .with_manuscript(manuscript_id.clone());
                    source_warn!(source_id, "⏱️ {}", e);
                    errors.push(e);
                    consecutive_failures += 1;
                }
            }

            if consecutive_failures >= self.config.consecutive_failure_limit {
                // The remote shape has likely changed; burning through the
                // rest of the list would only add noise.
                source_warn!(
                    source_id,
                    "🛑 Stopping after {} consecutive failures",
                    consecutive_failures
                );
                warnings.push(format!(
                    "stopped early after {consecutive_failures} consecutive fetch failures"
                ));
                break;
            }
        }

        let result = finish(handle, started_at, listed.len(), errors, warnings);
        source_info!(
            source_id,
            "🏁 Pull finished: {} manuscripts, {} errors",
            result.manuscripts.len(),
            result.errors.len()
        );
        Ok(result)
    }

    /// Evaluate a finished pull and fold it into durable state
    ///
    /// Quality evaluation and change detection consume the result
    /// independently. The snapshot swap is atomic: on any persistence
    /// failure the prior snapshot stays untouched and the report carries a
    /// warning instead.
    pub async fn report(&self, result: PullResult) -> TrackerResult<PullReport> {
        let source_id = result.source_id.clone();

        let verdict = quality::evaluate(&result, &self.config);
        source_info!(
            source_id,
            "🧪 Verdict: {} (score {:.2})",
            verdict.status,
            verdict.score
        );

        let mut state_warnings = Vec::new();
        let prior = match self.store.load_snapshot(&source_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                source_warn!(source_id, "⚠️ Snapshot unreadable, diffing against empty: {}", e);
                state_warnings.push(format!("snapshot unreadable, diffing against empty: {e}"));
                SnapshotFile::empty(source_id.clone())
            }
        };

        let (mut changes, next_snapshot) = diff::detect(
            &result,
            &prior,
            Utc::now(),
            self.config.approaching_deadline_window_days,
        );
        changes.warnings.extend(state_warnings);

        if let Err(e) = self.store.replace_snapshot(&next_snapshot).await {
            source_warn!(source_id, "⚠️ Snapshot replace failed, prior kept: {}", e);
            changes
                .warnings
                .push(format!("snapshot replace failed, prior snapshot kept: {e}"));
        }

        // The run has its terminal verdict; the checkpoint's job is done.
        if let Err(e) = self.store.clear_checkpoint(&source_id).await {
            source_warn!(source_id, "⚠️ Checkpoint discard failed: {}", e);
            changes
                .warnings
                .push(format!("checkpoint discard failed: {e}"));
        }

        source_info!(
            source_id,
            "📦 Changes: {} new, {} status moves, {} new referees, {} overdue",
            changes.new_manuscripts.len(),
            changes.status_transitions.len(),
            changes.new_referees.len(),
            changes.overdue_alerts.len()
        );

        Ok(PullReport {
            result,
            verdict,
            changes,
        })
    }

    /// The full pipeline: begin, run, evaluate, diff, persist, report
    pub async fn execute(&mut self) -> TrackerResult<PullReport> {
        let mut handle = self.begin().await?;
        let result = self.run(&mut handle).await?;
        self.report(result).await
    }
}

fn attach_manuscript(error: PullError, manuscript_id: &str) -> PullError {
    if error.manuscript_id.is_none() {
        error.with_manuscript(manuscript_id.to_string())
    } else {
        error
    }
}

fn finish(
    handle: &RunHandle,
    started_at: DateTime<Utc>,
    manuscripts_found: usize,
    errors: Vec<PullError>,
    warnings: Vec<String>,
) -> PullResult {
    PullResult {
        run_id: handle.run_id,
        source_id: handle.source_id.clone(),
        started_at,
        completed_at: Utc::now(),
        manuscripts_found,
        manuscripts: handle.manuscripts.clone(),
        errors,
        warnings,
    }
}
