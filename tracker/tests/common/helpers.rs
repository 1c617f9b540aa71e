//! Test helpers and builder patterns for tracker tests
//!
//! The builder wires an orchestrator over mock services with permissive
//! defaults, so individual tests only configure the behavior they assert.

use shared::{AuthOk, CheckpointFile, SnapshotFile, SourceConfig};
use tracker::traits::{MockSourceAdapter, MockStateStore};
use tracker::PullOrchestrator;

use super::fixtures::TestFixtures;

/// Builder for test orchestrators over mock services
pub struct OrchestratorBuilder {
    config: SourceConfig,
    adapter: MockSourceAdapter,
    store: MockStateStore,
}

impl OrchestratorBuilder {
    /// Permissive store defaults: empty state, writes succeed. The adapter
    /// starts bare; tests declare exactly the calls they expect.
    pub fn new() -> Self {
        Self {
            config: TestFixtures::config(),
            adapter: MockSourceAdapter::new(),
            store: permissive_store(),
        }
    }

    pub fn with_config(mut self, config: SourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the adapter mock with a setup function
    pub fn with_adapter<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockSourceAdapter),
    {
        setup(&mut self.adapter);
        self
    }

    /// Replace the permissive store with one the test configures in full
    ///
    /// The setup starts from a bare mock, so every store method the
    /// exercised flow touches needs an expectation.
    pub fn with_store<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockStateStore),
    {
        let mut store = MockStateStore::new();
        setup(&mut store);
        self.store = store;
        self
    }

    pub fn build(self) -> PullOrchestrator<MockSourceAdapter, MockStateStore> {
        PullOrchestrator::new(self.config, self.adapter, self.store)
            .expect("test configuration must validate")
    }
}

/// Adapter expectation for a session that always opens
pub fn allow_auth(adapter: &mut MockSourceAdapter) {
    adapter
        .expect_authenticate()
        .returning(|| Ok(AuthOk { account: None }))
        .times(0..);
}

/// A state store mock where every operation succeeds against empty state
pub fn permissive_store() -> MockStateStore {
    let mut store = MockStateStore::new();
    store
        .expect_load_checkpoint()
        .returning(|source_id| Ok(CheckpointFile::empty(source_id.clone())))
        .times(0..);
    store
        .expect_append_checkpoint()
        .returning(|_, _, _| Ok(()))
        .times(0..);
    store
        .expect_clear_checkpoint()
        .returning(|_| Ok(()))
        .times(0..);
    store
        .expect_load_snapshot()
        .returning(|source_id| Ok(SnapshotFile::empty(source_id.clone())))
        .times(0..);
    store
        .expect_replace_snapshot()
        .returning(|_| Ok(()))
        .times(0..);
    store
}
