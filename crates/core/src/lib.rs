//! Roadmap core data models.
//!
//! This crate defines the catalog, progress and analytics types shared by
//! the progress engine, storage adapters and the CLI.

#![warn(missing_docs)]

// Identities
mod id;

// Static content
mod node;
mod catalog;

// Learner state
mod progress;
mod session;
mod persisted;

// Derived views and settings
mod analytics;
mod config;
mod error;

// Re-exports
pub use id::*;

pub use node::{LearningNode, NodeType, Difficulty, Phase, Checkpoint};
pub use catalog::Catalog;
pub use progress::{ProgressRecord, NodeStatus};
pub use session::{StudySession, FocusType};
pub use persisted::PersistedState;
pub use analytics::{DerivedAnalytics, WeeklyGoalProgress, DailyProgress};
pub use config::EngineConfig;
pub use error::{
    ValidationError, InvalidTransitionError, NodeAction, EngineError, CatalogError,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
