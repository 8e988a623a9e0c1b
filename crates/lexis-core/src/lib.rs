//! lexis-core - Core library for lexis.
//!
//! This crate provides the memory models, scheduling algorithms, storage
//! traits and the review engine for vocabulary spaced repetition.
//!
//! # Example
//!
//! ```ignore
//! use lexis_core::{Judgment, LexisConfig, ReviewEngine, Selection, SqliteStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::new("lexis.db")?);
//! let engine = ReviewEngine::new(store, LexisConfig::default());
//!
//! if let Selection::Review(unit) = engine.select_next(learner_id, Some("cet4"))? {
//!     engine.record_judgment(learner_id, unit.sense_id, Judgment::Known)?;
//! }
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod scheduling;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LexisConfig, MemoryModelParams, PlanOrdering, StageParams};
pub use engine::{ProgressUpdater, ReviewEngine};
pub use error::{ErrorCode, LexisError, LexisResult};
pub use scheduling::{Algorithm, AlgorithmInfo, AlgorithmSettings, HalfLifeModel, StageScheduler};
pub use store::{
    CatalogStore, LearningStore, PlanStore, ProgressStore, ProgressTransaction, SettingsStore,
    SqliteStore,
};
pub use types::{
    CandidateOrder, DailyPlan, Judgment, LearnerStats, NewLexicalItem, NewSense, PlanProgress,
    Progress, ReviewUnit, Selection, SelectionOrigin, SenseBrief, SenseDetail, SenseSummary,
    UnitGroup,
};
