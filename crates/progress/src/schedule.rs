//! Spaced-repetition review scheduling.

use chrono::Duration;
use roadmap_core::{EngineConfig, Time};

/// Fixed-interval review schedule.
///
/// The k-th completion of a node schedules the next review
/// `intervals[min(k - 1, len - 1)]` days later, so the schedule plateaus at
/// its last interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSchedule {
    intervals_days: Vec<u32>,
}

impl ReviewSchedule {
    /// Default offsets: 1, 3, 7, 14, 30, 90 days.
    pub const DEFAULT_INTERVALS: [u32; 6] = [1, 3, 7, 14, 30, 90];

    /// Create a schedule. An empty list falls back to the defaults.
    pub fn new(intervals_days: Vec<u32>) -> Self {
        if intervals_days.is_empty() {
            return Self::default();
        }
        Self { intervals_days }
    }

    /// Build from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.review_intervals_days.clone())
    }

    /// Offset in days after the completion that brought the count to `review_count`.
    pub fn interval_days(&self, review_count: u32) -> u32 {
        let last = self.intervals_days.len() - 1;
        let idx = (review_count.saturating_sub(1) as usize).min(last);
        self.intervals_days[idx]
    }

    /// Next review date for a completion at `completed_at`, or `None` when
    /// the offset runs past the representable date range.
    pub fn next_review(&self, completed_at: Time, review_count: u32) -> Option<Time> {
        let days = Duration::try_days(self.interval_days(review_count) as i64)?;
        completed_at.checked_add_signed(days)
    }
}

impl Default for ReviewSchedule {
    fn default() -> Self {
        Self {
            intervals_days: Self::DEFAULT_INTERVALS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_default_offsets_plateau() {
        let schedule = ReviewSchedule::default();
        let offsets: Vec<u32> = (1..=8).map(|k| schedule.interval_days(k)).collect();
        assert_eq!(offsets, vec![1, 3, 7, 14, 30, 90, 90, 90]);
    }

    #[test]
    fn test_next_review_adds_whole_days() {
        let schedule = ReviewSchedule::default();
        let done = Utc.with_ymd_and_hms(2024, 1, 31, 18, 30, 0).unwrap();
        assert_eq!(schedule.next_review(done, 3), Some(done + Duration::days(7)));
        assert_eq!(
            schedule.next_review(done, 1),
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 18, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_next_review_past_date_range_is_none() {
        let schedule = ReviewSchedule::new(vec![200_000_000]);
        let done = Utc.with_ymd_and_hms(2024, 1, 31, 18, 30, 0).unwrap();
        assert_eq!(schedule.next_review(done, 1), None);
        assert_eq!(ReviewSchedule::new(vec![u32::MAX]).next_review(done, 1), None);
    }

    #[test]
    fn test_custom_and_empty_intervals() {
        let custom = ReviewSchedule::new(vec![2, 5]);
        assert_eq!(custom.interval_days(1), 2);
        assert_eq!(custom.interval_days(9), 5);
        assert_eq!(ReviewSchedule::new(Vec::new()), ReviewSchedule::default());
        // a count of zero is treated as the first completion
        assert_eq!(custom.interval_days(0), 2);
    }
}
