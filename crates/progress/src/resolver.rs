//! Dependency resolution for learning nodes.

use roadmap_core::{Catalog, LearningNode, NodeId, NodeStatus};
use tracing::{debug, warn};

use crate::snapshot::Records;

/// Result of checking a node's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every prerequisite has been completed
    Ready,
    /// Blocked by these prerequisites
    Blocked(Vec<NodeId>),
}

/// Decides when locked nodes become available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyResolver;

impl DependencyResolver {
    /// Create a new resolver.
    pub fn new() -> Self {
        Self
    }

    /// Check whether a node's prerequisites are all completed.
    ///
    /// A prerequisite without a record (e.g. a dangling id) never counts as
    /// completed.
    pub fn check(&self, records: &Records, node: &LearningNode) -> Resolution {
        let blocked: Vec<NodeId> = node
            .prerequisite_ids
            .iter()
            .filter(|id| {
                !records
                    .get(*id)
                    .map(|r| r.status.is_completed())
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if blocked.is_empty() {
            Resolution::Ready
        } else {
            Resolution::Blocked(blocked)
        }
    }

    /// Re-check every locked node in the catalog. Returns the nodes unlocked,
    /// in catalog order.
    ///
    /// Unlocking depends only on completed prerequisites, so one pass settles
    /// the whole graph.
    pub fn unlock_all(&self, catalog: &Catalog, records: &mut Records) -> Vec<NodeId> {
        let ready: Vec<NodeId> = catalog
            .nodes()
            .iter()
            .filter(|node| {
                records.get(&node.id).map(|r| r.status) == Some(NodeStatus::Locked)
                    && self.check(records, node) == Resolution::Ready
            })
            .map(|node| node.id.clone())
            .collect();

        self.mark_available(records, &ready);
        ready
    }

    /// Re-check only the direct dependents of a node that was just completed.
    pub fn unlock_dependents(
        &self,
        catalog: &Catalog,
        records: &mut Records,
        completed: &NodeId,
    ) -> Vec<NodeId> {
        let ready: Vec<NodeId> = catalog
            .dependents_of(completed)
            .iter()
            .filter_map(|id| catalog.get(id))
            .filter(|node| {
                records.get(&node.id).map(|r| r.status) == Some(NodeStatus::Locked)
                    && self.check(records, node) == Resolution::Ready
            })
            .map(|node| node.id.clone())
            .collect();

        self.mark_available(records, &ready);
        ready
    }

    /// Lock again any available node whose prerequisites are not all
    /// completed. Returns the relocked nodes, in catalog order.
    ///
    /// Started or completed nodes keep their status; a blocked prerequisite
    /// there is only logged.
    pub fn relock_blocked(&self, catalog: &Catalog, records: &mut Records) -> Vec<NodeId> {
        let mut relocked = Vec::new();
        for node in catalog.nodes() {
            let Some(status) = records.get(&node.id).map(|r| r.status) else {
                continue;
            };
            if status == NodeStatus::Locked {
                continue;
            }
            let Resolution::Blocked(blocking) = self.check(records, node) else {
                continue;
            };
            if status == NodeStatus::Available {
                relocked.push(node.id.clone());
            } else {
                warn!(node = %node.id, %status, ?blocking, "node past locked with prerequisites not completed");
            }
        }

        for id in &relocked {
            if let Some(record) = records.get_mut(id) {
                record.status = NodeStatus::Locked;
            }
        }
        relocked
    }

    fn mark_available(&self, records: &mut Records, ids: &[NodeId]) {
        for id in ids {
            if let Some(record) = records.get_mut(id) {
                debug!(node = %id, "prerequisites satisfied");
                record.status = NodeStatus::Available;
            }
        }
    }
}
