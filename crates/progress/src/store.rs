//! Progress store - the single authority for node status transitions.
//!
//! Every action takes a snapshot and returns a new one. Validation happens
//! before anything is copied, so a rejected action leaves no trace.

use std::sync::Arc;

use roadmap_core::{
    Catalog, EngineConfig, EngineError, InvalidTransitionError, NodeAction, NodeId, NodeStatus,
    PersistedState, ProgressRecord, StudySession, Time, ValidationError,
};
use tracing::{debug, info, warn};

use crate::analytics::AnalyticsAggregator;
use crate::resolver::DependencyResolver;
use crate::schedule::ReviewSchedule;
use crate::snapshot::{Records, Snapshot};

/// Lowest accepted mastery level.
pub const MIN_MASTERY: u8 = 1;
/// Highest accepted mastery level.
pub const MAX_MASTERY: u8 = 5;

/// Actions a caller can dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// available -> inProgress
    Start {
        /// Target node
        node_id: NodeId,
    },
    /// inProgress/needsReview -> completed
    Complete {
        /// Target node
        node_id: NodeId,
        /// Mastery 1-5
        mastery_level: u8,
        /// Optional insight text
        insights: Option<String>,
    },
    /// Append a study session
    RecordSession(StudySession),
    /// Override the next review date of a completed node
    ScheduleReview {
        /// Target node
        node_id: NodeId,
        /// New review date
        review_at: Time,
    },
    /// Replace a node's notes
    UpdateNotes {
        /// Target node
        node_id: NodeId,
        /// New notes
        notes: String,
    },
}

/// Applies actions to snapshots.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    schedule: ReviewSchedule,
    resolver: DependencyResolver,
    aggregator: AnalyticsAggregator,
}

impl ProgressStore {
    /// Create a store from configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            schedule: ReviewSchedule::from_config(&config),
            resolver: DependencyResolver::new(),
            aggregator: AnalyticsAggregator::new(config),
        }
    }

    /// The review schedule in use.
    pub fn schedule(&self) -> &ReviewSchedule {
        &self.schedule
    }

    /// The analytics aggregator in use.
    pub fn aggregator(&self) -> &AnalyticsAggregator {
        &self.aggregator
    }

    /// Fresh state for a catalog: nodes without prerequisites start
    /// available, everything else locked.
    pub fn initialize(&self, catalog: Arc<Catalog>, now: Time) -> Snapshot {
        let records: Records = catalog
            .nodes()
            .iter()
            .map(|node| (node.id.clone(), fresh_record(node.id.clone(), node.has_prerequisites())))
            .collect();

        debug!(nodes = records.len(), "initialized progress");
        self.publish(catalog, records, Vec::new(), now)
    }

    /// Rebuild state from persisted records and sessions.
    ///
    /// Records for nodes the catalog no longer has are dropped; nodes without
    /// a record get a fresh one. Available nodes with unfinished
    /// prerequisites are locked again, then a full unlock pass runs so
    /// prerequisites completed in older data take effect.
    pub fn restore(&self, catalog: Arc<Catalog>, persisted: PersistedState, now: Time) -> Snapshot {
        let mut records = Records::with_capacity(catalog.len());
        for record in persisted.records {
            if catalog.contains(&record.node_id) {
                records.insert(record.node_id.clone(), record);
            } else {
                warn!(node = %record.node_id, "dropping progress for node missing from catalog");
            }
        }
        for node in catalog.nodes() {
            records
                .entry(node.id.clone())
                .or_insert_with(|| fresh_record(node.id.clone(), node.has_prerequisites()));
        }

        let unknown = persisted
            .sessions
            .iter()
            .filter(|s| !catalog.contains(&s.node_id))
            .count();
        if unknown > 0 {
            warn!(count = unknown, "sessions reference unknown nodes; excluded from analytics");
        }

        let relocked = self.resolver.relock_blocked(&catalog, &mut records);
        if !relocked.is_empty() {
            warn!(?relocked, "nodes relocked on restore");
        }
        let unlocked = self.resolver.unlock_all(&catalog, &mut records);
        if !unlocked.is_empty() {
            info!(?unlocked, "nodes unlocked on restore");
        }

        self.publish(catalog, records, persisted.sessions, now)
    }

    /// Recompute derived values at a new instant without changing records.
    pub fn refresh(&self, snapshot: &Snapshot, now: Time) -> Snapshot {
        self.publish(
            snapshot.catalog_handle(),
            snapshot.records.clone(),
            snapshot.sessions.clone(),
            now,
        )
    }

    /// Apply one action.
    pub fn apply(&self, snapshot: &Snapshot, action: Action, now: Time) -> Result<Snapshot, EngineError> {
        match action {
            Action::Start { node_id } => self.start(snapshot, &node_id, now),
            Action::Complete {
                node_id,
                mastery_level,
                insights,
            } => self.complete(snapshot, &node_id, mastery_level, insights, now),
            Action::RecordSession(session) => Ok(self.record_session(snapshot, session, now)),
            Action::ScheduleReview { node_id, review_at } => {
                self.schedule_review(snapshot, &node_id, review_at, now)
            }
            Action::UpdateNotes { node_id, notes } => self.update_notes(snapshot, &node_id, notes, now),
        }
    }

    /// available -> inProgress.
    pub fn start(&self, snapshot: &Snapshot, node_id: &NodeId, now: Time) -> Result<Snapshot, EngineError> {
        let current = current_status(snapshot, node_id, now)?;
        if current != NodeStatus::Available {
            return Err(transition_error(node_id, current, NodeAction::Start));
        }

        let mut records = snapshot.records.clone();
        if let Some(record) = records.get_mut(node_id) {
            record.status = NodeStatus::InProgress;
        }
        debug!(node = %node_id, "node started");

        Ok(self.publish(snapshot.catalog_handle(), records, snapshot.sessions.clone(), now))
    }

    /// inProgress/needsReview -> completed, then unlock direct dependents.
    pub fn complete(
        &self,
        snapshot: &Snapshot,
        node_id: &NodeId,
        mastery_level: u8,
        insights: Option<String>,
        now: Time,
    ) -> Result<Snapshot, EngineError> {
        if !snapshot.catalog.contains(node_id) {
            return Err(ValidationError::UnknownNode(node_id.clone()).into());
        }
        if !(MIN_MASTERY..=MAX_MASTERY).contains(&mastery_level) {
            return Err(ValidationError::MasteryOutOfRange { value: mastery_level }.into());
        }
        let current = current_status(snapshot, node_id, now)?;
        if !matches!(current, NodeStatus::InProgress | NodeStatus::NeedsReview) {
            return Err(transition_error(node_id, current, NodeAction::Complete));
        }

        let review_count = snapshot
            .records
            .get(node_id)
            .map_or(1, |r| r.review_count.saturating_add(1));
        let next_review = self.schedule.next_review(now, review_count).ok_or(
            ValidationError::ReviewDateOutOfRange {
                days: self.schedule.interval_days(review_count),
            },
        )?;

        let mut records = snapshot.records.clone();
        if let Some(record) = records.get_mut(node_id) {
            record.status = NodeStatus::Completed;
            record.completed_at = Some(now);
            record.mastery_level = mastery_level;
            record.review_count = review_count;
            record.next_review_date = Some(next_review);
            if insights.is_some() {
                record.insights = insights;
            }
            debug!(
                node = %node_id,
                mastery = mastery_level,
                reviews = record.review_count,
                "node completed"
            );
        }

        let unlocked = self
            .resolver
            .unlock_dependents(&snapshot.catalog, &mut records, node_id);
        if !unlocked.is_empty() {
            info!(node = %node_id, ?unlocked, "completion unlocked nodes");
        }

        Ok(self.publish(snapshot.catalog_handle(), records, snapshot.sessions.clone(), now))
    }

    /// Append a session. Time is credited to the node when it exists; sessions
    /// for unknown nodes are kept in the log but ignored by analytics.
    pub fn record_session(&self, snapshot: &Snapshot, session: StudySession, now: Time) -> Snapshot {
        let mut records = snapshot.records.clone();
        match records.get_mut(&session.node_id) {
            Some(record) => record.time_spent_minutes += session.duration_minutes as u64,
            None => warn!(node = %session.node_id, "study session for unknown node"),
        }

        let mut sessions = snapshot.sessions.clone();
        sessions.push(session);

        self.publish(snapshot.catalog_handle(), records, sessions, now)
    }

    /// Override the next review date. Only nodes completed at least once have
    /// a review to move.
    pub fn schedule_review(
        &self,
        snapshot: &Snapshot,
        node_id: &NodeId,
        review_at: Time,
        now: Time,
    ) -> Result<Snapshot, EngineError> {
        let record = snapshot
            .records
            .get(node_id)
            .ok_or_else(|| ValidationError::UnknownNode(node_id.clone()))?;
        if record.review_count == 0 {
            return Err(transition_error(node_id, record.status_at(now), NodeAction::ScheduleReview));
        }

        let mut records = snapshot.records.clone();
        if let Some(record) = records.get_mut(node_id) {
            record.next_review_date = Some(review_at);
        }
        debug!(node = %node_id, %review_at, "review rescheduled");

        Ok(self.publish(snapshot.catalog_handle(), records, snapshot.sessions.clone(), now))
    }

    /// Replace a node's notes.
    pub fn update_notes(
        &self,
        snapshot: &Snapshot,
        node_id: &NodeId,
        notes: String,
        now: Time,
    ) -> Result<Snapshot, EngineError> {
        if !snapshot.records.contains_key(node_id) {
            return Err(ValidationError::UnknownNode(node_id.clone()).into());
        }

        let mut records = snapshot.records.clone();
        if let Some(record) = records.get_mut(node_id) {
            record.notes = notes;
        }

        Ok(self.publish(snapshot.catalog_handle(), records, snapshot.sessions.clone(), now))
    }

    fn publish(
        &self,
        catalog: Arc<Catalog>,
        records: Records,
        sessions: Vec<StudySession>,
        now: Time,
    ) -> Snapshot {
        let analytics = self.aggregator.compute(&catalog, &records, &sessions, now);
        Snapshot {
            catalog,
            records,
            sessions,
            analytics,
            as_of: now,
        }
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn fresh_record(node_id: NodeId, has_prerequisites: bool) -> ProgressRecord {
    let status = if has_prerequisites {
        NodeStatus::Locked
    } else {
        NodeStatus::Available
    };
    ProgressRecord::new(node_id, status)
}

fn current_status(snapshot: &Snapshot, node_id: &NodeId, now: Time) -> Result<NodeStatus, EngineError> {
    snapshot
        .status_at(node_id, now)
        .ok_or_else(|| ValidationError::UnknownNode(node_id.clone()).into())
}

fn transition_error(node_id: &NodeId, from: NodeStatus, action: NodeAction) -> EngineError {
    InvalidTransitionError {
        node_id: node_id.clone(),
        from,
        action,
    }
    .into()
}
