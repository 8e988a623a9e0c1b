//! Today's daily plan for a learner.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LexisResult;
use crate::store::PlanStore;
use crate::types::PlanProgress;

/// Where a learner stands with respect to today's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlanState {
    /// No plan today, or the plan lookup failed.
    Absent,
    /// A plan exists and still has unreviewed items.
    Active(Uuid),
    /// Every item of a non-empty plan was reviewed today.
    Exhausted,
}

/// Plan state for selection. Lookup failures degrade to [`PlanState::Absent`].
pub(crate) fn plan_state(
    plans: &dyn PlanStore,
    learner_id: Uuid,
    day_start: DateTime<Utc>,
) -> PlanState {
    let plan_id = match plans.todays_plan(learner_id, day_start) {
        Ok(Some(id)) => id,
        Ok(None) => return PlanState::Absent,
        Err(e) => {
            tracing::warn!(%learner_id, error = %e, "Daily plan lookup failed, using due pool");
            return PlanState::Absent;
        }
    };

    match plans.plan_progress(plan_id, day_start) {
        Ok(progress) if progress.is_complete() => PlanState::Exhausted,
        Ok(_) => PlanState::Active(plan_id),
        Err(e) => {
            tracing::warn!(%learner_id, %plan_id, error = %e, "Plan progress check failed");
            PlanState::Active(plan_id)
        }
    }
}

/// Progress through today's plan; zero when there is none.
pub(crate) fn todays_progress(
    plans: &dyn PlanStore,
    learner_id: Uuid,
    day_start: DateTime<Utc>,
) -> LexisResult<PlanProgress> {
    match plans.todays_plan(learner_id, day_start)? {
        Some(plan_id) => plans.plan_progress(plan_id, day_start),
        None => Ok(PlanProgress::default()),
    }
}
