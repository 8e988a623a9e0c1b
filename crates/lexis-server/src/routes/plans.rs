//! Daily plan and learner statistics endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;
use lexis_core::types::{DailyPlan, LearnerStats, PlanProgress};

/// Request body for creating a daily plan.
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub sense_ids: Vec<i64>,
}

/// Create today's plan.
/// POST /learners/:learner_id/plans
pub async fn create_plan(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Json(request): Json<CreatePlanRequest>,
) -> ApiResult<(StatusCode, Json<DailyPlan>)> {
    let plan = state
        .run(move |engine| engine.create_daily_plan(learner_id, &request.sense_ids))
        .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Progress through today's plan.
/// GET /learners/:learner_id/plan-progress
pub async fn plan_progress(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> ApiResult<Json<PlanProgress>> {
    let progress = state
        .run(move |engine| engine.plan_progress(learner_id))
        .await?;
    Ok(Json(progress))
}

/// Learner-wide counters.
/// GET /learners/:learner_id/stats
pub async fn learner_stats(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> ApiResult<Json<LearnerStats>> {
    let stats = state
        .run(move |engine| engine.learner_stats(learner_id))
        .await?;
    Ok(Json(stats))
}
