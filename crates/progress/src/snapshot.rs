//! Immutable learner state handed to callers.

use std::collections::HashMap;
use std::sync::Arc;

use roadmap_core::{
    Catalog, DerivedAnalytics, LearningNode, NodeId, NodeStatus, PersistedState, ProgressRecord,
    StudySession, Time,
};

/// Progress records keyed by node id.
pub type Records = HashMap<NodeId, ProgressRecord>;

/// The full state at a point in time: records, session log and the analytics
/// derived from them.
///
/// Snapshots are never mutated after they are returned. Every engine call
/// produces a new one, so before/after comparisons are safe.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) records: Records,
    pub(crate) sessions: Vec<StudySession>,
    pub(crate) analytics: DerivedAnalytics,
    pub(crate) as_of: Time,
}

impl Snapshot {
    /// The catalog this state belongs to.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared handle to the catalog.
    pub fn catalog_handle(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// When this snapshot was produced. Derived status and time-relative
    /// analytics are computed against this instant.
    pub fn as_of(&self) -> Time {
        self.as_of
    }

    /// Record for a node.
    pub fn record(&self, id: &NodeId) -> Option<&ProgressRecord> {
        self.records.get(id)
    }

    /// Records in catalog order.
    pub fn records(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.catalog
            .nodes()
            .iter()
            .filter_map(move |node| self.records.get(&node.id))
    }

    /// Raw record map.
    pub fn record_map(&self) -> &Records {
        &self.records
    }

    /// Session log, oldest first.
    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    /// Analytics derived when the snapshot was produced.
    pub fn analytics(&self) -> &DerivedAnalytics {
        &self.analytics
    }

    /// Status of a node as of this snapshot.
    pub fn status(&self, id: &NodeId) -> Option<NodeStatus> {
        self.status_at(id, self.as_of)
    }

    /// Status of a node at an arbitrary instant.
    pub fn status_at(&self, id: &NodeId, as_of: Time) -> Option<NodeStatus> {
        self.records.get(id).map(|r| r.status_at(as_of))
    }

    /// Nodes whose status at `as_of` matches `status`, in catalog order.
    pub fn nodes_with_status(&self, status: NodeStatus, as_of: Time) -> Vec<&LearningNode> {
        self.catalog
            .nodes()
            .iter()
            .filter(|node| self.status_at(&node.id, as_of) == Some(status))
            .collect()
    }

    /// Persisted layout: records as a list in catalog order, plus sessions.
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            records: self.records().cloned().collect(),
            sessions: self.sessions.clone(),
        }
    }
}
