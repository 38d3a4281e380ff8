//! Error taxonomy for the progress engine and catalog loading.

use crate::id::NodeId;
use crate::progress::NodeStatus;

/// Caller supplied an out-of-contract value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Mastery must be within 1-5
    #[error("mastery level {value} is outside 1-5")]
    MasteryOutOfRange {
        /// Rejected value
        value: u8,
    },

    /// Node id not present in the catalog
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Review offset lands outside the representable date range
    #[error("review interval of {days} days overflows the date range")]
    ReviewDateOutOfRange {
        /// Configured offset
        days: u32,
    },
}

/// Action a caller can request on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    /// available -> inProgress
    Start,
    /// inProgress/needsReview -> completed
    Complete,
    /// reschedule the next review
    ScheduleReview,
}

impl std::fmt::Display for NodeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NodeAction::Start => "start",
            NodeAction::Complete => "complete",
            NodeAction::ScheduleReview => "schedule a review for",
        })
    }
}

/// Requested transition is not permitted from the node's current status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} node {node_id} while it is {from}")]
pub struct InvalidTransitionError {
    /// Target node
    pub node_id: NodeId,
    /// Status at the time of the request
    pub from: NodeStatus,
    /// Rejected action
    pub action: NodeAction,
}

/// Any error an engine operation can return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Out-of-contract input
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Disallowed state transition
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] InvalidTransitionError),
}

/// Structural problems in catalog content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two nodes share an id
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// A prerequisite names no node
    #[error("node {node_id} requires unknown node {prerequisite}")]
    UnknownPrerequisite {
        /// Node declaring the prerequisite
        node_id: NodeId,
        /// Missing prerequisite
        prerequisite: NodeId,
    },

    /// Prerequisites form a cycle
    #[error("prerequisite cycle: {}", format_cycle(.0))]
    Cycle(Vec<NodeId>),
}

fn format_cycle(ids: &[NodeId]) -> String {
    ids.iter().map(NodeId::as_str).collect::<Vec<_>>().join(" -> ")
}
