//! Engine configuration.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Tunables for scheduling and analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Review offsets in days, indexed by completion count; the last entry repeats
    pub review_intervals_days: Vec<u32>,

    /// Weekly study target in minutes
    pub weekly_target_minutes: u32,

    /// Weekly target of distinct nodes studied
    pub weekly_target_nodes: usize,

    /// First day of the calendar week
    pub week_start: Weekday,

    /// Completed nodes at or below this mastery count as weak areas
    pub weak_mastery_threshold: u8,

    /// Completed nodes at or above this mastery count as strong areas
    pub strong_mastery_threshold: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            review_intervals_days: vec![1, 3, 7, 14, 30, 90],
            weekly_target_minutes: 600,
            weekly_target_nodes: 3,
            week_start: Weekday::Sun,
            weak_mastery_threshold: 2,
            strong_mastery_threshold: 4,
        }
    }
}
