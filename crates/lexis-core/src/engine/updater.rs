//! Progress update: the pure state transition applied after a judgment.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::config::LexisConfig;
use crate::error::{LexisError, LexisResult};
use crate::scheduling::{Algorithm, HalfLifeModel, StageScheduler};
use crate::types::{Judgment, Progress, RecallHistoryEntry, ReviewHistoryEntry};

/// Applies one judgment to a progress record under a given algorithm.
#[derive(Debug, Clone, Default)]
pub struct ProgressUpdater {
    model: HalfLifeModel,
    stages: StageScheduler,
}

/// Latest year a review time may fall in; keeps stored timestamps fixed-width.
const LAST_SCHEDULABLE_YEAR: i32 = 9999;

fn hours(h: f64) -> Duration {
    Duration::microseconds((h * 3_600_000_000.0).round() as i64)
}

/// `now + interval_hours`, or an error if that leaves the storable range.
fn schedule_after(now: DateTime<Utc>, interval_hours: f64) -> LexisResult<DateTime<Utc>> {
    let out_of_range = || {
        LexisError::schedule_out_of_range(format!(
            "{} + {}h is past year {}",
            now, interval_hours, LAST_SCHEDULABLE_YEAR
        ))
    };
    if !interval_hours.is_finite() {
        return Err(out_of_range());
    }
    now.checked_add_signed(hours(interval_hours))
        .filter(|at| at.year() <= LAST_SCHEDULABLE_YEAR)
        .ok_or_else(out_of_range)
}

impl ProgressUpdater {
    pub fn new(model: HalfLifeModel, stages: StageScheduler) -> Self {
        Self { model, stages }
    }

    pub fn from_config(config: &LexisConfig) -> Self {
        Self::new(
            HalfLifeModel::with_params(config.memory_model.clone()),
            StageScheduler::with_params(config.stage.clone()),
        )
    }

    pub fn model(&self) -> &HalfLifeModel {
        &self.model
    }

    /// Effective difficulty when the catalog has none.
    pub fn default_difficulty(&self) -> f64 {
        self.model.params().default_difficulty
    }

    /// New progress after `judgment` at `now`. Pure.
    ///
    /// Fails if the next review time would land past year 9999.
    pub fn apply(
        &self,
        progress: &Progress,
        difficulty: f64,
        judgment: Judgment,
        algorithm: Algorithm,
        now: DateTime<Utc>,
    ) -> LexisResult<Progress> {
        let mut next = progress.clone();
        next.review_history.push(ReviewHistoryEntry {
            reviewed_at: now,
            stage: progress.stage,
        });
        next.review_count = next.review_count.saturating_add(1);
        next.last_reviewed_at = Some(now);

        match algorithm {
            Algorithm::Sspmmc => self.apply_continuous(&mut next, difficulty, judgment, now)?,
            Algorithm::Legacy => {
                next.stage = self.stages.transition(progress.stage, judgment);
                let interval = self.stages.interval_hours(i64::from(next.stage));
                next.next_review_at = Some(schedule_after(now, interval)?);
            }
        }
        Ok(next)
    }

    fn apply_continuous(
        &self,
        next: &mut Progress,
        difficulty: f64,
        judgment: Judgment,
        now: DateTime<Utc>,
    ) -> LexisResult<()> {
        let params = self.model.params();
        let success = judgment.is_success();

        next.recall_history.push(RecallHistoryEntry {
            reviewed_at: now,
            success,
        });
        let (successes, failures) = next.recall_counts();

        let mut half_life =
            self.model
                .half_life(difficulty, successes, failures, next.memory_half_life);
        if judgment == Judgment::Fuzzy {
            half_life *= params.fuzzy_penalty;
        }
        let optimal = self.model.optimal_interval(half_life);

        let interval = if success {
            optimal
        } else {
            (optimal * params.failure_interval_factor).max(params.min_half_life_hours)
        };

        next.memory_half_life = half_life;
        next.optimal_interval = optimal;
        next.last_recall_success = success;
        next.next_review_at = Some(schedule_after(now, interval)?);
        next.stage = self.stages.transition(next.stage, judgment);
        Ok(())
    }
}
