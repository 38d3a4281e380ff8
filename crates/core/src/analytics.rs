//! Derived analytics - never stored, always recomputed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{CheckpointId, NodeId, PhaseId};

/// Summary statistics derived from progress records and the session log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAnalytics {
    /// Nodes in the catalog
    pub total_nodes: usize,

    /// Nodes completed at least once
    pub completed_nodes: usize,

    /// Nodes in progress
    pub in_progress_nodes: usize,

    /// Completed nodes whose review is due
    pub review_due_nodes: usize,

    /// Sum of estimated hours over all nodes
    pub total_hours: f64,

    /// Sum of estimated hours over completed nodes
    pub completed_hours: f64,

    /// Mean mastery of completed nodes, 0 if none
    pub average_mastery: f64,

    /// Completion percentage per phase
    pub phase_progress: BTreeMap<PhaseId, f64>,

    /// Skills of completed nodes, deduplicated and sorted
    pub skills_acquired: Vec<String>,

    /// Minutes over every session that names a known node
    pub total_study_minutes: u64,

    /// Progress against the weekly goal
    pub weekly_goal: WeeklyGoalProgress,

    /// Per-day totals, oldest first
    pub daily_progress: Vec<DailyProgress>,

    /// Consecutive study days ending today or yesterday
    pub current_streak: u32,

    /// Longest run of consecutive study days
    pub longest_streak: u32,

    /// Completed nodes with low mastery
    pub weak_areas: Vec<NodeId>,

    /// Completed nodes with high mastery
    pub strong_areas: Vec<NodeId>,

    /// Checkpoints whose required nodes are all completed
    pub checkpoints_reached: Vec<CheckpointId>,
}

/// Study time in the current calendar week against the configured targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoalProgress {
    /// First day of the week
    pub week_start: NaiveDate,

    /// Target minutes
    pub target_minutes: u32,

    /// Minutes studied this week
    pub actual_minutes: u64,

    /// Target distinct nodes
    pub target_nodes: usize,

    /// Distinct nodes studied this week
    pub actual_nodes: usize,
}

impl WeeklyGoalProgress {
    /// Minutes studied as a percentage of the target (0 for a zero target).
    pub fn minutes_percentage(&self) -> f64 {
        if self.target_minutes == 0 {
            0.0
        } else {
            self.actual_minutes as f64 / self.target_minutes as f64 * 100.0
        }
    }

    /// Whether the minute target has been reached.
    pub fn is_met(&self) -> bool {
        self.actual_minutes >= self.target_minutes as u64
    }
}

impl Default for WeeklyGoalProgress {
    fn default() -> Self {
        Self {
            week_start: NaiveDate::default(),
            target_minutes: 0,
            actual_minutes: 0,
            target_nodes: 0,
            actual_nodes: 0,
        }
    }
}

/// Totals for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    /// The day
    pub date: NaiveDate,

    /// Minutes studied
    pub minutes_studied: u64,

    /// Nodes whose latest completion fell on this day
    pub nodes_completed: usize,
}
