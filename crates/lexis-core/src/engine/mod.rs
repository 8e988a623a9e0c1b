//! The review engine: selection, progress updates, plans, and catalog queries.

mod enrich;
mod plan_tracker;
mod selector;
mod updater;

pub use enrich::{find_word_form, part_of_speech_from_definition};
pub use updater::ProgressUpdater;

use std::sync::Arc;
use uuid::Uuid;

use crate::clock::{start_of_utc_day, Clock, SystemClock};
use crate::config::LexisConfig;
use crate::error::{LexisError, LexisResult};
use crate::scheduling::{Algorithm, AlgorithmInfo, AlgorithmSettings};
use crate::store::{LearningStore, SettingsStore};
use crate::types::{
    CandidateOrder, DailyPlan, Judgment, LearnerStats, LexicalItem, NewLexicalItem, PlanProgress,
    Progress, Selection, Sense, SenseDetail, SenseSummary, UnitGroup,
};

/// Unit label for senses without one.
pub const DEFAULT_UNIT: &str = "Default";

/// Schedules reviews for learners on top of a [`LearningStore`].
///
/// Every operation reads the clock once. Selection never writes; a judgment
/// is applied in a single store transaction.
pub struct ReviewEngine<S: LearningStore + 'static> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    settings: AlgorithmSettings,
    updater: ProgressUpdater,
    config: LexisConfig,
}

impl<S: LearningStore + 'static> ReviewEngine<S> {
    /// Create an engine reading the system clock.
    pub fn new(store: Arc<S>, config: LexisConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit clock.
    pub fn with_clock(store: Arc<S>, config: LexisConfig, clock: Arc<dyn Clock>) -> Self {
        let settings_store: Arc<dyn SettingsStore> = store.clone();
        Self {
            settings: AlgorithmSettings::new(settings_store),
            updater: ProgressUpdater::from_config(&config),
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &LexisConfig {
        &self.config
    }

    /// Next card for the learner, or a terminal outcome.
    pub fn select_next(&self, learner_id: Uuid, source: Option<&str>) -> LexisResult<Selection> {
        let selection = self.peek_next(learner_id, source)?;
        if let Some(unit) = selection.unit() {
            tracing::info!(%learner_id, sense_id = unit.sense_id, origin = %unit.origin, "Next review selected");
        } else {
            tracing::info!(%learner_id, status = selection.status(), "Nothing to review");
        }
        Ok(selection)
    }

    /// Same as [`select_next`](Self::select_next), without logging the choice.
    pub fn peek_next(&self, learner_id: Uuid, source: Option<&str>) -> LexisResult<Selection> {
        let source = source.map(str::trim).filter(|s| !s.is_empty());
        selector::select(
            &*self.store,
            learner_id,
            source,
            self.clock.now(),
            self.config.selection.plan_ordering,
        )
    }

    /// Apply a judgment to the learner's progress on a sense.
    pub fn record_judgment(
        &self,
        learner_id: Uuid,
        sense_id: i64,
        judgment: Judgment,
    ) -> LexisResult<Progress> {
        let algorithm = self.settings.current();
        let now = self.clock.now();
        let default_difficulty = self.updater.default_difficulty();

        let mut updated = None;
        self.store.in_transaction(&mut |tx| {
            let difficulty = tx
                .sense_difficulty(sense_id)?
                .ok_or_else(|| LexisError::sense_not_found(sense_id))?;
            let current = tx
                .progress(learner_id, sense_id)?
                .unwrap_or_else(|| Progress::new(learner_id, sense_id));
            let next = self.updater.apply(
                &current,
                difficulty.resolve(default_difficulty),
                judgment,
                algorithm,
                now,
            )?;
            tx.upsert_progress(&next)?;
            updated = Some(next);
            Ok(())
        })?;

        let progress =
            updated.ok_or_else(|| LexisError::Internal("Update committed without a result".into()))?;
        tracing::info!(
            %learner_id,
            sense_id,
            %judgment,
            %algorithm,
            stage = progress.stage,
            half_life = progress.memory_half_life,
            next_review_at = ?progress.next_review_at,
            "Progress updated"
        );
        Ok(progress)
    }

    /// Parse a judgment label, then apply it. Unknown labels change nothing.
    pub fn record_judgment_label(
        &self,
        learner_id: Uuid,
        sense_id: i64,
        label: &str,
    ) -> LexisResult<Progress> {
        let judgment = Judgment::parse(label)?;
        self.record_judgment(learner_id, sense_id, judgment)
    }

    /// Active scheduling algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.settings.current()
    }

    pub fn set_algorithm(&self, algorithm: Algorithm) -> LexisResult<()> {
        self.settings.set(algorithm)
    }

    pub fn algorithm_info(&self) -> AlgorithmInfo {
        self.settings.info()
    }

    /// Create today's plan from a list of senses.
    pub fn create_daily_plan(&self, learner_id: Uuid, sense_ids: &[i64]) -> LexisResult<DailyPlan> {
        if sense_ids.is_empty() {
            return Err(LexisError::empty_plan());
        }
        let plan = self
            .store
            .create_plan(learner_id, sense_ids, self.clock.now())?;
        tracing::info!(%learner_id, plan_id = %plan.id, items = plan.sense_ids.len(), "Daily plan created");
        Ok(plan)
    }

    /// Progress through today's plan.
    pub fn plan_progress(&self, learner_id: Uuid) -> LexisResult<PlanProgress> {
        let day_start = start_of_utc_day(self.clock.now());
        plan_tracker::todays_progress(&*self.store, learner_id, day_start)
    }

    pub fn learner_stats(&self, learner_id: Uuid) -> LexisResult<LearnerStats> {
        Ok(LearnerStats {
            learned_senses: self.store.learned_count(learner_id)?,
        })
    }

    /// Distinct vocabulary sources.
    pub fn sources(&self) -> LexisResult<Vec<String>> {
        self.store.sources()
    }

    /// Candidate senses for building a plan.
    pub fn senses_for_selection(
        &self,
        source: Option<&str>,
        order: CandidateOrder,
        count: u32,
    ) -> LexisResult<Vec<SenseSummary>> {
        if count == 0 {
            return Err(LexisError::invalid_input("count must be at least 1"));
        }
        let source = source.map(str::trim).filter(|s| !s.is_empty());
        self.store.senses_for_selection(source, order, count)
    }

    /// One sense with its lemma.
    pub fn sense_details(&self, sense_id: i64) -> LexisResult<SenseDetail> {
        self.store
            .sense_with_lemma(sense_id)?
            .map(SenseDetail::from)
            .ok_or_else(|| LexisError::sense_not_found(sense_id))
    }

    /// Senses of a source grouped by unit, in unit order.
    pub fn senses_by_unit(&self, source: &str) -> LexisResult<Vec<UnitGroup>> {
        let mut groups: Vec<UnitGroup> = Vec::new();
        for summary in self.store.senses_by_source(source)? {
            let unit = summary
                .unit
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .unwrap_or(DEFAULT_UNIT)
                .to_string();
            match groups.iter_mut().find(|g| g.unit == unit) {
                Some(group) => group.senses.push(summary),
                None => groups.push(UnitGroup {
                    unit,
                    senses: vec![summary],
                }),
            }
        }
        Ok(groups)
    }

    /// Fill missing difficulties with the configured default.
    pub fn backfill_difficulty(&self) -> LexisResult<u64> {
        let default = self.updater.default_difficulty();
        let updated = self.store.backfill_difficulty(default)?;
        tracing::info!(updated, default, "Backfilled difficulty");
        Ok(updated)
    }

    /// Add one lexical item with its senses.
    pub fn insert_lexical_item(&self, item: &NewLexicalItem) -> LexisResult<(LexicalItem, Vec<Sense>)> {
        if item.lemma.trim().is_empty() {
            return Err(LexisError::invalid_input("lemma must not be empty"));
        }
        let difficulties = item
            .difficulty
            .iter()
            .chain(item.senses.iter().filter_map(|s| s.difficulty.as_ref()));
        for d in difficulties {
            if !(0.0..=1.0).contains(d) {
                return Err(LexisError::invalid_input(format!(
                    "difficulty must be within [0, 1], got {}",
                    d
                )));
            }
        }
        if item.senses.iter().any(|s| s.definition.trim().is_empty()) {
            return Err(LexisError::invalid_input("sense definition must not be empty"));
        }
        self.store.insert_lexical_item(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ErrorCode;
    use crate::store::{ProgressStore, SqliteStore};
    use crate::types::NewSense;
    use chrono::{TimeZone, Utc};

    fn engine() -> ReviewEngine<SqliteStore> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap());
        ReviewEngine::with_clock(
            Arc::new(SqliteStore::in_memory().unwrap()),
            LexisConfig::default(),
            Arc::new(clock),
        )
    }

    #[test]
    fn test_unknown_label_changes_nothing() {
        let engine = engine();
        let (_, senses) = engine
            .insert_lexical_item(&NewLexicalItem::new("cat").with_sense(NewSense::new("n. animal", "A cat.")))
            .unwrap();
        let learner = Uuid::new_v4();

        let err = engine
            .record_judgment_label(learner, senses[0].id, "maybe")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValInvalidJudgment);
        assert!(engine.store().progress(learner, senses[0].id).unwrap().is_none());
    }

    #[test]
    fn test_unknown_sense_is_not_found() {
        let engine = engine();
        let err = engine
            .record_judgment(Uuid::new_v4(), 404, Judgment::Known)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SenseNotFound);
    }

    #[test]
    fn test_insert_validation() {
        let engine = engine();
        assert!(engine.insert_lexical_item(&NewLexicalItem::new("  ")).is_err());
        assert!(engine
            .insert_lexical_item(&NewLexicalItem::new("x").with_difficulty(1.5))
            .is_err());
        assert!(engine
            .insert_lexical_item(&NewLexicalItem::new("x").with_sense(NewSense::new("", "x")))
            .is_err());
    }

    #[test]
    fn test_empty_plan_rejected() {
        let engine = engine();
        let err = engine.create_daily_plan(Uuid::new_v4(), &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PlanEmpty);
    }

    #[test]
    fn test_senses_by_unit_groups_default() {
        let engine = engine();
        engine
            .insert_lexical_item(
                &NewLexicalItem::new("a")
                    .with_source("book")
                    .with_sense(NewSense::new("d1", "a").with_unit("Unit 1"))
                    .with_sense(NewSense::new("d2", "a")),
            )
            .unwrap();
        engine
            .insert_lexical_item(
                &NewLexicalItem::new("b")
                    .with_source("book")
                    .with_sense(NewSense::new("d3", "b").with_unit("Unit 1")),
            )
            .unwrap();

        let groups = engine.senses_by_unit("book").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].unit, DEFAULT_UNIT);
        assert_eq!(groups[0].senses.len(), 1);
        assert_eq!(groups[1].unit, "Unit 1");
        assert_eq!(groups[1].senses.len(), 2);
    }

    #[test]
    fn test_sense_details() {
        let engine = engine();
        let (_, senses) = engine
            .insert_lexical_item(
                &NewLexicalItem::new("dog").with_sense(
                    NewSense::new("n. animal", "A dog barks.").with_translation("un chien"),
                ),
            )
            .unwrap();

        let detail = engine.sense_details(senses[0].id).unwrap();
        assert_eq!(detail.lemma, "dog");
        assert_eq!(detail.sense, senses[0]);
        assert_eq!(
            engine.sense_details(senses[0].id + 100).unwrap_err().code(),
            ErrorCode::SenseNotFound
        );
    }

    #[test]
    fn test_selection_count_must_be_positive() {
        let engine = engine();
        assert!(engine
            .senses_for_selection(None, CandidateOrder::Sequential, 0)
            .is_err());
    }

    #[test]
    fn test_algorithm_round_trip() {
        let engine = engine();
        assert_eq!(engine.algorithm(), Algorithm::Sspmmc);
        engine.set_algorithm(Algorithm::Legacy).unwrap();
        assert_eq!(engine.algorithm(), Algorithm::Legacy);
        assert_eq!(engine.algorithm_info().algorithm, Algorithm::Legacy);
    }
}
