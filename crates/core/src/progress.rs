//! Per-node progress records and the node status state machine.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::Time;

/// Status of a node for one learner.
///
/// `NeedsReview` is normally derived at read time from `Completed` plus a
/// due `next_review_date`; it is only stored when imported from older data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStatus {
    /// Prerequisites not yet completed
    Locked,
    /// Ready to start
    #[serde(alias = "todo")]
    Available,
    /// Being worked on
    #[serde(alias = "in_progress")]
    InProgress,
    /// Completed at least once
    Completed,
    /// Completed, and the scheduled review date has passed
    NeedsReview,
}

impl NodeStatus {
    /// Whether the node has been completed at least once.
    pub fn is_completed(self) -> bool {
        matches!(self, NodeStatus::Completed | NodeStatus::NeedsReview)
    }

    /// Get string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Locked => "locked",
            NodeStatus::Available => "available",
            NodeStatus::InProgress => "inProgress",
            NodeStatus::Completed => "completed",
            NodeStatus::NeedsReview => "needsReview",
        }
    }
}

impl std::str::FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(NodeStatus::Locked),
            "available" | "todo" => Ok(NodeStatus::Available),
            "inProgress" | "in_progress" | "in-progress" => Ok(NodeStatus::InProgress),
            "completed" => Ok(NodeStatus::Completed),
            "needsReview" | "needs-review" => Ok(NodeStatus::NeedsReview),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learner's progress on one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Node this record belongs to
    pub node_id: NodeId,

    /// Stored status
    pub status: NodeStatus,

    /// Accumulated study time
    #[serde(default, alias = "timeSpent")]
    pub time_spent_minutes: u64,

    /// 1-5 after a completion, 0 before
    #[serde(default)]
    pub mastery_level: u8,

    /// Number of completions, including re-reviews
    #[serde(default)]
    pub review_count: u32,

    /// Most recent completion
    #[serde(default)]
    pub completed_at: Option<Time>,

    /// When the node should next be reviewed
    #[serde(default)]
    pub next_review_date: Option<Time>,

    /// Learner notes
    #[serde(default)]
    pub notes: String,

    /// Insights captured on completion
    #[serde(default, alias = "veteranInsights")]
    pub insights: Option<String>,
}

impl ProgressRecord {
    /// Create a fresh record.
    pub fn new(node_id: NodeId, status: NodeStatus) -> Self {
        Self {
            node_id,
            status,
            time_spent_minutes: 0,
            mastery_level: 0,
            review_count: 0,
            completed_at: None,
            next_review_date: None,
            notes: String::new(),
            insights: None,
        }
    }

    /// Status as seen at `as_of`: a completed node whose review date has
    /// passed reads as `NeedsReview`.
    pub fn status_at(&self, as_of: Time) -> NodeStatus {
        match self.status {
            NodeStatus::Completed if self.is_due(as_of) => NodeStatus::NeedsReview,
            status => status,
        }
    }

    /// Whether a review is due at `as_of`.
    ///
    /// A stored `NeedsReview` is always due, whatever its review date.
    pub fn is_due(&self, as_of: Time) -> bool {
        match self.status {
            NodeStatus::NeedsReview => true,
            NodeStatus::Completed => self.next_review_date.is_some_and(|due| as_of >= due),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_status_at_derives_needs_review() {
        let done = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut record = ProgressRecord::new(NodeId::new("a"), NodeStatus::Completed);
        record.completed_at = Some(done);
        record.next_review_date = Some(done + Duration::days(1));

        assert_eq!(record.status_at(done), NodeStatus::Completed);
        assert_eq!(record.status_at(done + Duration::hours(23)), NodeStatus::Completed);
        assert_eq!(record.status_at(done + Duration::days(1)), NodeStatus::NeedsReview);
        // the stored status is untouched
        assert_eq!(record.status, NodeStatus::Completed);
    }

    #[test]
    fn test_stored_needs_review_is_due_before_its_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut record = ProgressRecord::new(NodeId::new("a"), NodeStatus::NeedsReview);
        record.next_review_date = Some(now + Duration::days(30));

        assert_eq!(record.status_at(now), NodeStatus::NeedsReview);
        assert!(record.is_due(now));
    }

    #[test]
    fn test_legacy_status_names() {
        let todo: NodeStatus = serde_json::from_str("\"todo\"").unwrap();
        let started: NodeStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(todo, NodeStatus::Available);
        assert_eq!(started, NodeStatus::InProgress);
        assert_eq!(serde_json::to_string(&NodeStatus::NeedsReview).unwrap(), "\"needsReview\"");
    }

    #[test]
    fn test_record_defaults_when_fields_missing() {
        let record: ProgressRecord =
            serde_json::from_str(r#"{"nodeId": "a", "status": "available", "timeSpent": 12}"#).unwrap();
        assert_eq!(record.time_spent_minutes, 12);
        assert_eq!(record.review_count, 0);
        assert!(record.completed_at.is_none());
    }
}
