//! Analytics aggregation over progress records and the session log.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use roadmap_core::{
    Catalog, DailyProgress, DerivedAnalytics, EngineConfig, NodeStatus, PhaseId, StudySession,
    Time, WeeklyGoalProgress,
};

use crate::snapshot::Records;

/// Derives summary statistics.
///
/// `compute` is a pure function of its inputs: no accumulators are kept
/// between calls, so analytics can always be rebuilt from records and
/// sessions.
#[derive(Debug, Clone)]
pub struct AnalyticsAggregator {
    config: EngineConfig,
}

impl AnalyticsAggregator {
    /// Create an aggregator.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Compute all analytics as of `as_of`.
    pub fn compute(
        &self,
        catalog: &Catalog,
        records: &Records,
        sessions: &[StudySession],
        as_of: Time,
    ) -> DerivedAnalytics {
        // Sessions naming unknown nodes are tolerated and skipped.
        let sessions: Vec<&StudySession> = sessions
            .iter()
            .filter(|s| catalog.contains(&s.node_id))
            .collect();

        let mut analytics = DerivedAnalytics {
            total_nodes: catalog.len(),
            ..Default::default()
        };

        let mut mastery_sum = 0u64;
        let mut skills = BTreeSet::new();

        for node in catalog.nodes() {
            analytics.total_hours += node.estimated_hours;

            let Some(record) = records.get(&node.id) else {
                continue;
            };

            if record.status == NodeStatus::InProgress {
                analytics.in_progress_nodes += 1;
            }
            if !record.status.is_completed() {
                continue;
            }

            analytics.completed_nodes += 1;
            analytics.completed_hours += node.estimated_hours;
            mastery_sum += record.mastery_level as u64;
            skills.extend(node.skills.iter().cloned());

            if record.is_due(as_of) {
                analytics.review_due_nodes += 1;
            }
            if record.mastery_level <= self.config.weak_mastery_threshold {
                analytics.weak_areas.push(node.id.clone());
            }
            if record.mastery_level >= self.config.strong_mastery_threshold {
                analytics.strong_areas.push(node.id.clone());
            }
        }

        analytics.average_mastery = if analytics.completed_nodes > 0 {
            mastery_sum as f64 / analytics.completed_nodes as f64
        } else {
            0.0
        };
        analytics.skills_acquired = skills.into_iter().collect();

        analytics.phase_progress = catalog
            .phase_ids()
            .into_iter()
            .map(|phase_id| {
                let pct = phase_percentage(catalog, records, &phase_id);
                (phase_id, pct)
            })
            .collect();

        analytics.checkpoints_reached = catalog
            .checkpoints()
            .iter()
            .filter(|cp| {
                !cp.required_node_ids.is_empty()
                    && cp.required_node_ids.iter().all(|id| {
                        records
                            .get(id)
                            .map(|r| r.status.is_completed())
                            .unwrap_or(false)
                    })
            })
            .map(|cp| cp.id.clone())
            .collect();

        analytics.total_study_minutes = sessions.iter().map(|s| s.duration_minutes as u64).sum();
        analytics.daily_progress = daily_progress(records, &sessions);
        analytics.weekly_goal = self.weekly_goal(&sessions, as_of.date_naive());

        let (current, longest) = streaks(&sessions, as_of.date_naive());
        analytics.current_streak = current;
        analytics.longest_streak = longest;

        analytics
    }

    /// First day of the week containing `day`.
    pub fn week_start(&self, day: NaiveDate) -> NaiveDate {
        let offset = (day.weekday().num_days_from_sunday() + 7
            - self.config.week_start.num_days_from_sunday())
            % 7;
        day - Duration::days(offset as i64)
    }

    fn weekly_goal(&self, sessions: &[&StudySession], today: NaiveDate) -> WeeklyGoalProgress {
        let start = self.week_start(today);
        let end = start + Duration::days(7);

        let mut actual_minutes = 0u64;
        let mut nodes = HashSet::new();
        for session in sessions.iter().filter(|s| s.date >= start && s.date < end) {
            actual_minutes += session.duration_minutes as u64;
            nodes.insert(&session.node_id);
        }

        WeeklyGoalProgress {
            week_start: start,
            target_minutes: self.config.weekly_target_minutes,
            actual_minutes,
            target_nodes: self.config.weekly_target_nodes,
            actual_nodes: nodes.len(),
        }
    }
}

impl Default for AnalyticsAggregator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Completion percentage of a phase; 0 for a phase with no members.
pub fn phase_percentage(catalog: &Catalog, records: &Records, phase_id: &PhaseId) -> f64 {
    let mut total = 0usize;
    let mut completed = 0usize;
    for node in catalog.phase_members(phase_id) {
        total += 1;
        if records
            .get(&node.id)
            .map(|r| r.status.is_completed())
            .unwrap_or(false)
        {
            completed += 1;
        }
    }

    if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

fn daily_progress(records: &Records, sessions: &[&StudySession]) -> Vec<DailyProgress> {
    let mut days: BTreeMap<NaiveDate, DailyProgress> = BTreeMap::new();

    for session in sessions {
        day_entry(&mut days, session.date).minutes_studied += session.duration_minutes as u64;
    }
    for record in records.values() {
        if let (true, Some(at)) = (record.status.is_completed(), record.completed_at) {
            day_entry(&mut days, at.date_naive()).nodes_completed += 1;
        }
    }

    days.into_values().collect()
}

fn day_entry(days: &mut BTreeMap<NaiveDate, DailyProgress>, date: NaiveDate) -> &mut DailyProgress {
    days.entry(date).or_insert_with(|| DailyProgress {
        date,
        minutes_studied: 0,
        nodes_completed: 0,
    })
}

/// (current, longest) runs of consecutive days with study time.
fn streaks(sessions: &[&StudySession], today: NaiveDate) -> (u32, u32) {
    let days: BTreeSet<NaiveDate> = sessions
        .iter()
        .filter(|s| s.duration_minutes > 0)
        .map(|s| s.date)
        .collect();

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &day in &days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    let yesterday = today - Duration::days(1);
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return (0, longest);
    };

    let mut current = 0u32;
    while days.contains(&cursor) {
        current += 1;
        cursor -= Duration::days(1);
    }

    (current, longest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc, Weekday};
    use roadmap_core::{
        Checkpoint, CheckpointId, FocusType, LearningNode, NodeId, Phase, ProgressRecord,
    };

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(node: &str, date: NaiveDate, minutes: u32) -> StudySession {
        StudySession::new(node, date, minutes, FocusType::Practice, 4)
    }

    fn catalog() -> Catalog {
        Catalog::with_parts(
            vec![
                LearningNode::new("a", "A", "phase1").with_hours(10.0).with_skill("python"),
                LearningNode::new("b", "B", "phase1").with_hours(5.0).with_skill("testing").with_skill("python"),
                LearningNode::new("c", "C", "phase2").with_hours(2.5),
            ],
            vec![Phase { id: PhaseId::new("phase3"), title: "Empty".into() }],
            vec![Checkpoint {
                id: CheckpointId::new("foundations"),
                title: "Foundations".into(),
                phase_id: PhaseId::new("phase1"),
                required_node_ids: vec![NodeId::new("a"), NodeId::new("b")],
            }],
        )
    }

    fn records(catalog: &Catalog) -> Records {
        catalog
            .nodes()
            .iter()
            .map(|n| (n.id.clone(), ProgressRecord::new(n.id.clone(), NodeStatus::Available)))
            .collect()
    }

    fn complete(records: &mut Records, id: &str, mastery: u8, at: Time) {
        let r = records.get_mut(&NodeId::new(id)).unwrap();
        r.status = NodeStatus::Completed;
        r.mastery_level = mastery;
        r.review_count += 1;
        r.completed_at = Some(at);
        r.next_review_date = Some(at + Duration::days(1));
    }

    // Wednesday
    fn now() -> Time {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_progress_is_zero_not_nan() {
        let catalog = catalog();
        let a = AnalyticsAggregator::default().compute(&catalog, &records(&catalog), &[], now());

        assert_eq!(a.total_nodes, 3);
        assert_eq!(a.completed_nodes, 0);
        assert_eq!(a.average_mastery, 0.0);
        assert_eq!(a.total_hours, 17.5);
        assert_eq!(a.phase_progress[&PhaseId::new("phase3")], 0.0);
        assert_eq!(a.phase_progress[&PhaseId::new("phase1")], 0.0);
        assert!(a.checkpoints_reached.is_empty());
    }

    #[test]
    fn test_completion_stats() {
        let catalog = catalog();
        let mut recs = records(&catalog);
        complete(&mut recs, "a", 5, now());
        complete(&mut recs, "b", 2, now());
        recs.get_mut(&NodeId::new("c")).unwrap().status = NodeStatus::InProgress;

        let a = AnalyticsAggregator::default().compute(&catalog, &recs, &[], now());

        assert_eq!(a.completed_nodes, 2);
        assert_eq!(a.in_progress_nodes, 1);
        assert_eq!(a.completed_hours, 15.0);
        assert_eq!(a.average_mastery, 3.5);
        assert_eq!(a.phase_progress[&PhaseId::new("phase1")], 100.0);
        assert_eq!(a.phase_progress[&PhaseId::new("phase2")], 0.0);
        assert_eq!(a.skills_acquired, vec!["python".to_string(), "testing".to_string()]);
        assert_eq!(a.weak_areas, vec![NodeId::new("b")]);
        assert_eq!(a.strong_areas, vec![NodeId::new("a")]);
        assert_eq!(a.checkpoints_reached, vec![CheckpointId::new("foundations")]);
        assert_eq!(a.review_due_nodes, 0);
        assert_eq!(a.daily_progress[0].nodes_completed, 2);
    }

    #[test]
    fn test_review_due_counts_against_as_of() {
        let catalog = catalog();
        let mut recs = records(&catalog);
        complete(&mut recs, "a", 4, now());

        let agg = AnalyticsAggregator::default();
        assert_eq!(agg.compute(&catalog, &recs, &[], now()).review_due_nodes, 0);
        let later = agg.compute(&catalog, &recs, &[], now() + Duration::days(2));
        assert_eq!(later.review_due_nodes, 1);
        // still counted as completed knowledge
        assert_eq!(later.completed_nodes, 1);
    }

    #[test]
    fn test_weekly_goal_uses_calendar_week() {
        let catalog = catalog();
        let recs = records(&catalog);
        let sessions = vec![
            session("a", day(2024, 5, 11), 100), // Saturday, previous week
            session("a", day(2024, 5, 12), 60),  // Sunday
            session("b", day(2024, 5, 15), 45),
            session("b", day(2024, 5, 18), 15),  // Saturday
            session("ghost", day(2024, 5, 15), 500),
        ];

        let sunday = AnalyticsAggregator::default().compute(&catalog, &recs, &sessions, now());
        assert_eq!(sunday.weekly_goal.week_start, day(2024, 5, 12));
        assert_eq!(sunday.weekly_goal.actual_minutes, 120);
        assert_eq!(sunday.weekly_goal.actual_nodes, 2);
        assert_eq!(sunday.weekly_goal.target_minutes, 600);
        assert_eq!(sunday.weekly_goal.minutes_percentage(), 20.0);
        assert!(!sunday.weekly_goal.is_met());
        assert_eq!(sunday.total_study_minutes, 220);

        let monday = AnalyticsAggregator::new(EngineConfig {
            week_start: Weekday::Mon,
            weekly_target_minutes: 60,
            ..Default::default()
        })
        .compute(&catalog, &recs, &sessions, now());
        assert_eq!(monday.weekly_goal.week_start, day(2024, 5, 13));
        assert_eq!(monday.weekly_goal.actual_minutes, 60);
        assert!(monday.weekly_goal.is_met());
    }

    #[test]
    fn test_daily_progress_and_streaks() {
        let catalog = catalog();
        let recs = records(&catalog);
        let sessions = vec![
            session("a", day(2024, 5, 1), 30),
            session("a", day(2024, 5, 2), 30),
            session("b", day(2024, 5, 3), 30),
            session("b", day(2024, 5, 3), 20),
            session("a", day(2024, 5, 13), 10),
            session("a", day(2024, 5, 14), 10),
        ];

        let a = AnalyticsAggregator::default().compute(&catalog, &recs, &sessions, now());
        assert_eq!(a.daily_progress.len(), 5);
        assert_eq!(a.daily_progress[2].date, day(2024, 5, 3));
        assert_eq!(a.daily_progress[2].minutes_studied, 50);
        assert_eq!(a.longest_streak, 3);
        // nothing today, but yesterday continues the run
        assert_eq!(a.current_streak, 2);

        let stale = AnalyticsAggregator::default().compute(
            &catalog,
            &recs,
            &sessions,
            now() + Duration::days(3),
        );
        assert_eq!(stale.current_streak, 0);
        assert_eq!(stale.longest_streak, 3);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let catalog = catalog();
        let mut recs = records(&catalog);
        complete(&mut recs, "a", 3, now());
        let sessions = vec![session("a", day(2024, 5, 14), 25)];

        let agg = AnalyticsAggregator::default();
        let first = agg.compute(&catalog, &recs, &sessions, now());
        let second = agg.compute(&catalog, &recs, &sessions, now());
        assert_eq!(first, second);
    }
}
