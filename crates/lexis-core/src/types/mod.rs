//! Core types for lexis.

mod judgment;
mod lexicon;
mod plan;
mod progress;
mod review;

pub use judgment::Judgment;
pub use lexicon::*;
pub use plan::{DailyPlan, LearnerStats, PlanProgress};
pub use progress::*;
pub use review::*;
