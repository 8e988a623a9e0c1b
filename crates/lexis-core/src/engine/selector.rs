//! Next-item selection: today's plan first, then the due pool.

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use super::enrich::build_review_unit;
use super::plan_tracker::{plan_state, PlanState};
use crate::clock::start_of_utc_day;
use crate::config::PlanOrdering;
use crate::error::LexisResult;
use crate::store::LearningStore;
use crate::types::{Selection, SelectionOrigin};

/// Shuffle seed fixed for one learner over one UTC day, so repeated
/// selections without an intervening review agree.
pub(crate) fn daily_seed(learner_id: Uuid, day_start: DateTime<Utc>) -> u32 {
    // FNV-1a
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let day = day_start.num_days_from_ce().to_le_bytes();
    for byte in learner_id.as_bytes().iter().chain(day.iter()) {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash >> 32) as u32
}

/// Pick the next review unit. Never writes.
pub(crate) fn select<S: LearningStore>(
    store: &S,
    learner_id: Uuid,
    source: Option<&str>,
    now: DateTime<Utc>,
    ordering: PlanOrdering,
) -> LexisResult<Selection> {
    let day_start = start_of_utc_day(now);
    let seed = daily_seed(learner_id, day_start);

    match plan_state(store, learner_id, day_start) {
        PlanState::Exhausted => {
            tracing::debug!(%learner_id, "Daily plan exhausted");
            return Ok(Selection::Exhausted);
        }
        PlanState::Active(plan_id) => {
            match store.plan_candidate(plan_id, day_start, ordering, seed) {
                Ok(Some(candidate)) => {
                    tracing::debug!(%learner_id, sense_id = candidate.sense.id, "Selected from daily plan");
                    return build_review_unit(store, candidate, SelectionOrigin::Plan)
                        .map(Selection::Review);
                }
                Ok(None) => {
                    tracing::debug!(%learner_id, %plan_id, "No unreviewed plan items left");
                    return Ok(Selection::Exhausted);
                }
                Err(e) => {
                    tracing::warn!(%learner_id, %plan_id, error = %e, "Plan item query failed, using due pool");
                }
            }
        }
        PlanState::Absent => {}
    }

    match store.due_candidate(learner_id, source, now, seed)? {
        Some(candidate) => {
            tracing::debug!(%learner_id, sense_id = candidate.sense.id, "Selected from due pool");
            build_review_unit(store, candidate, SelectionOrigin::Pool).map(Selection::Review)
        }
        None => Ok(Selection::NoneDue),
    }
}
