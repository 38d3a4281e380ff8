//! Study session log entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// One study session. The session log is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    /// Node studied
    pub node_id: NodeId,

    /// Day of the session
    pub date: NaiveDate,

    /// Length in minutes
    #[serde(alias = "duration")]
    pub duration_minutes: u32,

    /// Kind of study
    #[serde(alias = "focus")]
    pub focus_type: FocusType,

    /// Self-rated effectiveness, 1-5
    pub effectiveness: u8,
}

impl StudySession {
    /// Create a session.
    pub fn new(
        node_id: impl Into<NodeId>,
        date: NaiveDate,
        duration_minutes: u32,
        focus_type: FocusType,
        effectiveness: u8,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            date,
            duration_minutes,
            focus_type,
            effectiveness,
        }
    }
}

/// What a session concentrated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusType {
    /// Uninterrupted study of new material
    DeepWork,
    /// Revisiting completed material
    Review,
    /// Exercises and drills
    Practice,
    /// Work on a project
    Project,
}

impl std::str::FromStr for FocusType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deep-work" => Ok(FocusType::DeepWork),
            "review" => Ok(FocusType::Review),
            "practice" => Ok(FocusType::Practice),
            "project" => Ok(FocusType::Project),
            other => Err(format!("unknown focus type: {}", other)),
        }
    }
}
