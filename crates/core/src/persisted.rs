//! Persisted state layout written by storage adapters.

use serde::{Deserialize, Serialize};

use crate::progress::ProgressRecord;
use crate::session::StudySession;

/// Durable learner state: records and sessions only. Analytics are always
/// recomputed on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// One record per node
    #[serde(default)]
    pub records: Vec<ProgressRecord>,

    /// Append-only session log
    #[serde(default)]
    pub sessions: Vec<StudySession>,
}
