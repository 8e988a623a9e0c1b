//! Review loop endpoints: next card and judgments.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;
use lexis_core::types::{Progress, ReviewUnit, Selection};

/// Query parameters for card selection.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Restrict the due pool to one vocabulary source.
    pub source: Option<String>,
}

/// Response for card selection.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextResponse {
    Review { unit: ReviewUnit },
    Exhausted { message: String },
    NoneDue { message: String },
}

impl From<Selection> for NextResponse {
    fn from(selection: Selection) -> Self {
        let message = selection.message().unwrap_or_default().to_string();
        match selection {
            Selection::Review(unit) => NextResponse::Review { unit },
            Selection::Exhausted => NextResponse::Exhausted { message },
            Selection::NoneDue => NextResponse::NoneDue { message },
        }
    }
}

/// Request body for a judgment.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub sense_id: i64,
    /// One of `known`, `fuzzy`, `unknown`.
    pub judgment: String,
}

/// Select the next card.
/// GET /learners/:learner_id/next
pub async fn next_review(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Query(query): Query<NextQuery>,
) -> ApiResult<Json<NextResponse>> {
    let selection = state
        .run(move |engine| engine.select_next(learner_id, query.source.as_deref()))
        .await?;
    Ok(Json(selection.into()))
}

/// Preview the next card without logging a selection.
/// GET /learners/:learner_id/peek
pub async fn peek_review(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Query(query): Query<NextQuery>,
) -> ApiResult<Json<NextResponse>> {
    let selection = state
        .run(move |engine| engine.peek_next(learner_id, query.source.as_deref()))
        .await?;
    Ok(Json(selection.into()))
}

/// Record a judgment for a sense.
/// POST /learners/:learner_id/reviews
pub async fn record_review(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<Progress>> {
    let progress = state
        .run(move |engine| {
            engine.record_judgment_label(learner_id, request.sense_id, &request.judgment)
        })
        .await?;
    Ok(Json(progress))
}
