//! Storage traits and the SQLite implementation.
//!
//! The engine talks to persistence only through these narrow traits. All
//! timestamps crossing the boundary are UTC; "today" is passed in as the
//! start of the caller's UTC day so stores never read the clock.

mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::PlanOrdering;
use crate::error::LexisResult;
use crate::types::{
    CandidateOrder, DailyPlan, Difficulty, LexicalItem, NewLexicalItem, PlanProgress, Progress,
    Sense, SenseCandidate, SenseSummary,
};

/// Read access to the vocabulary catalog, plus single-item seeding.
pub trait CatalogStore: Send + Sync {
    /// Insert a lexical item with its senses.
    fn insert_lexical_item(&self, item: &NewLexicalItem) -> LexisResult<(LexicalItem, Vec<Sense>)>;

    /// Get a sense by id.
    fn sense(&self, sense_id: i64) -> LexisResult<Option<Sense>>;

    /// Get a sense by id, joined with its item's lemma.
    fn sense_with_lemma(&self, sense_id: i64) -> LexisResult<Option<SenseCandidate>>;

    /// All senses of a lexical item, ordered by id.
    fn senses_of_item(&self, item_id: i64) -> LexisResult<Vec<Sense>>;

    /// Distinct non-empty source tags.
    fn sources(&self) -> LexisResult<Vec<String>>;

    /// Up to `count` senses for plan building.
    fn senses_for_selection(
        &self,
        source: Option<&str>,
        order: CandidateOrder,
        count: u32,
    ) -> LexisResult<Vec<SenseSummary>>;

    /// Every sense from one source, ordered by unit, then lemma, then id.
    fn senses_by_source(&self, source: &str) -> LexisResult<Vec<SenseSummary>>;

    /// Set missing item and sense difficulties to `default`. Returns rows changed.
    fn backfill_difficulty(&self, default: f64) -> LexisResult<u64>;
}

/// Operations available inside an atomic progress update.
pub trait ProgressTransaction {
    /// Stored difficulties for a sense, `None` if the sense does not exist.
    fn sense_difficulty(&mut self, sense_id: i64) -> LexisResult<Option<Difficulty>>;

    /// Current progress for (learner, sense).
    fn progress(&mut self, learner_id: Uuid, sense_id: i64) -> LexisResult<Option<Progress>>;

    /// Insert or replace the progress row keyed by (learner, sense).
    fn upsert_progress(&mut self, progress: &Progress) -> LexisResult<()>;
}

/// Per-learner memory state.
pub trait ProgressStore: Send + Sync {
    /// Point lookup by (learner, sense).
    fn progress(&self, learner_id: Uuid, sense_id: i64) -> LexisResult<Option<Progress>>;

    /// Run `work` in one transaction. Commits only if `work` returns `Ok`.
    fn in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn ProgressTransaction) -> LexisResult<()>,
    ) -> LexisResult<()>;

    /// Highest-priority sense that is due or never reviewed.
    ///
    /// Ordered by `next_review_at` ascending with never-reviewed senses last,
    /// ties broken by a shuffle keyed on `seed`.
    fn due_candidate(
        &self,
        learner_id: Uuid,
        source: Option<&str>,
        now: DateTime<Utc>,
        seed: u32,
    ) -> LexisResult<Option<SenseCandidate>>;

    /// Number of senses the learner has progress for.
    fn learned_count(&self, learner_id: Uuid) -> LexisResult<u64>;
}

/// Daily plans.
pub trait PlanStore: Send + Sync {
    /// Insert a plan and its items atomically. Fails with `NotFound` on an unknown sense.
    fn create_plan(
        &self,
        learner_id: Uuid,
        sense_ids: &[i64],
        created_at: DateTime<Utc>,
    ) -> LexisResult<DailyPlan>;

    /// Id of the most recently created plan in the UTC day starting at `day_start`.
    fn todays_plan(&self, learner_id: Uuid, day_start: DateTime<Utc>) -> LexisResult<Option<Uuid>>;

    /// Items in a plan and how many were reviewed since `day_start`.
    fn plan_progress(&self, plan_id: Uuid, day_start: DateTime<Utc>) -> LexisResult<PlanProgress>;

    /// Next plan item not reviewed since `day_start`.
    fn plan_candidate(
        &self,
        plan_id: Uuid,
        day_start: DateTime<Utc>,
        ordering: PlanOrdering,
        seed: u32,
    ) -> LexisResult<Option<SenseCandidate>>;
}

/// Named process-wide settings.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> LexisResult<Option<String>>;

    fn set_setting(&self, key: &str, value: &str) -> LexisResult<()>;
}

/// Everything the review engine needs from storage.
pub trait LearningStore: CatalogStore + ProgressStore + PlanStore + SettingsStore {}

impl<T> LearningStore for T where T: CatalogStore + ProgressStore + PlanStore + SettingsStore {}
