//! Progress engine - the public API over the store, resolver and aggregator.
//!
//! ```text
//! caller action -> ProgressStore (validate + apply)
//!               -> DependencyResolver (unlock dependents)
//!               -> AnalyticsAggregator (recompute)
//!               -> new Snapshot
//! ```
//!
//! The engine performs no I/O. Loading catalogs and persisting
//! [`PersistedState`] is the caller's job.

use std::sync::Arc;

use roadmap_core::{
    Catalog, DerivedAnalytics, EngineConfig, EngineError, LearningNode, NodeId, NodeStatus,
    PersistedState, PhaseId, StudySession, Time,
};

use crate::analytics::phase_percentage;
use crate::clock::{Clock, SystemClock};
use crate::store::{Action, ProgressStore};
use crate::snapshot::Snapshot;

/// Learning progress engine.
///
/// Calls must be serialized per learner; the engine itself holds no mutable
/// state besides the clock.
pub struct ProgressEngine {
    store: ProgressStore,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl ProgressEngine {
    /// Create an engine with the wall clock.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: ProgressStore::new(config.clone()),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Use a different time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current time according to the engine clock.
    pub fn now(&self) -> Time {
        self.clock.now()
    }

    /// Fresh state for a catalog.
    pub fn initialize_snapshot(&self, catalog: impl Into<Arc<Catalog>>) -> Snapshot {
        self.store.initialize(catalog.into(), self.now())
    }

    /// State rebuilt from persisted records and sessions.
    pub fn restore_snapshot(
        &self,
        catalog: impl Into<Arc<Catalog>>,
        persisted: PersistedState,
    ) -> Snapshot {
        self.store.restore(catalog.into(), persisted, self.now())
    }

    /// Same records, derived values recomputed at the current time.
    pub fn refresh(&self, snapshot: &Snapshot) -> Snapshot {
        self.store.refresh(snapshot, self.now())
    }

    /// Dispatch any action.
    pub fn dispatch(&self, snapshot: &Snapshot, action: Action) -> Result<Snapshot, EngineError> {
        self.store.apply(snapshot, action, self.now())
    }

    /// Begin working on an available node.
    pub fn start_node(&self, snapshot: &Snapshot, node_id: &NodeId) -> Result<Snapshot, EngineError> {
        self.store.start(snapshot, node_id, self.now())
    }

    /// Complete (or re-review) a node with a mastery level of 1-5.
    pub fn complete_node(
        &self,
        snapshot: &Snapshot,
        node_id: &NodeId,
        mastery_level: u8,
        insights: Option<String>,
    ) -> Result<Snapshot, EngineError> {
        self.store
            .complete(snapshot, node_id, mastery_level, insights, self.now())
    }

    /// Append a study session.
    pub fn record_study_session(&self, snapshot: &Snapshot, session: StudySession) -> Snapshot {
        self.store.record_session(snapshot, session, self.now())
    }

    /// Move the next review of a completed node.
    pub fn schedule_review(
        &self,
        snapshot: &Snapshot,
        node_id: &NodeId,
        review_at: Time,
    ) -> Result<Snapshot, EngineError> {
        self.store
            .schedule_review(snapshot, node_id, review_at, self.now())
    }

    /// Replace a node's notes.
    pub fn update_notes(
        &self,
        snapshot: &Snapshot,
        node_id: &NodeId,
        notes: impl Into<String>,
    ) -> Result<Snapshot, EngineError> {
        self.store
            .update_notes(snapshot, node_id, notes.into(), self.now())
    }

    /// Analytics of a snapshot. Pure; call as often as needed.
    pub fn get_analytics(&self, snapshot: &Snapshot) -> DerivedAnalytics {
        snapshot.analytics().clone()
    }

    /// Completed nodes whose review date is at or before `as_of`, in catalog order.
    pub fn get_due_for_review<'a>(&self, snapshot: &'a Snapshot, as_of: Time) -> Vec<&'a LearningNode> {
        snapshot
            .catalog()
            .nodes()
            .iter()
            .filter(|node| {
                snapshot
                    .record(&node.id)
                    .map(|r| r.is_due(as_of))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Nodes ready to start.
    pub fn get_available_nodes<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a LearningNode> {
        snapshot.nodes_with_status(NodeStatus::Available, snapshot.as_of())
    }

    /// Look up a node definition.
    pub fn get_node<'a>(&self, snapshot: &'a Snapshot, node_id: &NodeId) -> Option<&'a LearningNode> {
        snapshot.catalog().get(node_id)
    }

    /// Completion percentage of one phase.
    pub fn get_phase_progress(&self, snapshot: &Snapshot, phase_id: &PhaseId) -> f64 {
        phase_percentage(snapshot.catalog(), snapshot.record_map(), phase_id)
    }

    /// Persisted layout of a snapshot.
    pub fn to_persisted(&self, snapshot: &Snapshot) -> PersistedState {
        snapshot.to_persisted()
    }
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
