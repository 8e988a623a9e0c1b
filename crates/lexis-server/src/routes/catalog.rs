//! Catalog browsing endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;
use lexis_core::types::{CandidateOrder, SenseDetail, SenseSummary, UnitGroup};

const DEFAULT_SELECTION_COUNT: u32 = 20;

/// Query parameters for plan-building candidates.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub source: Option<String>,
    pub order: Option<CandidateOrder>,
    pub count: Option<u32>,
}

/// List vocabulary sources.
/// GET /sources
pub async fn list_sources(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let sources = state.run(|engine| engine.sources()).await?;
    Ok(Json(sources))
}

/// Senses of a source grouped by unit.
/// GET /sources/:source/units
pub async fn senses_by_unit(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> ApiResult<Json<Vec<UnitGroup>>> {
    let groups = state
        .run(move |engine| engine.senses_by_unit(&source))
        .await?;
    Ok(Json(groups))
}

/// Candidate senses for building a plan.
/// GET /senses/selection
pub async fn senses_for_selection(
    State(state): State<AppState>,
    Query(query): Query<SelectionQuery>,
) -> ApiResult<Json<Vec<SenseSummary>>> {
    let order = query.order.unwrap_or_default();
    let count = query.count.unwrap_or(DEFAULT_SELECTION_COUNT);
    let senses = state
        .run(move |engine| engine.senses_for_selection(query.source.as_deref(), order, count))
        .await?;
    Ok(Json(senses))
}

/// One sense with its lemma.
/// GET /senses/:sense_id
pub async fn get_sense(
    State(state): State<AppState>,
    Path(sense_id): Path<i64>,
) -> ApiResult<Json<SenseDetail>> {
    let detail = state
        .run(move |engine| engine.sense_details(sense_id))
        .await?;
    Ok(Json(detail))
}
