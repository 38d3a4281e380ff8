//! Learning progress engine.
//!
//! Status transitions, prerequisite unlocking, spaced-repetition scheduling
//! and derived analytics over a roadmap catalog.

#![warn(missing_docs)]

pub mod clock;
pub mod schedule;
pub mod snapshot;
pub mod resolver;
pub mod analytics;
pub mod store;
pub mod engine;

pub use clock::{Clock, SystemClock, FixedClock};
pub use schedule::ReviewSchedule;
pub use snapshot::{Snapshot, Records};
pub use resolver::{DependencyResolver, Resolution};
pub use analytics::{AnalyticsAggregator, phase_percentage};
pub use store::{ProgressStore, Action, MIN_MASTERY, MAX_MASTERY};
pub use engine::ProgressEngine;
