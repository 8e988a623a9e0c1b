//! Scheduling algorithm setting.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;
use lexis_core::scheduling::{Algorithm, AlgorithmInfo};

/// Request body for changing the algorithm.
#[derive(Debug, Deserialize)]
pub struct SetAlgorithmRequest {
    /// `sspmmc` or `legacy`.
    pub algorithm: String,
}

/// Active algorithm and its description.
/// GET /settings/algorithm
pub async fn get_algorithm(State(state): State<AppState>) -> ApiResult<Json<AlgorithmInfo>> {
    let info = state.run(|engine| Ok(engine.algorithm_info())).await?;
    Ok(Json(info))
}

/// Switch the active algorithm.
/// PUT /settings/algorithm
pub async fn set_algorithm(
    State(state): State<AppState>,
    Json(request): Json<SetAlgorithmRequest>,
) -> ApiResult<Json<AlgorithmInfo>> {
    let info = state
        .run(move |engine| {
            let algorithm = Algorithm::parse(&request.algorithm)?;
            engine.set_algorithm(algorithm)?;
            Ok(engine.algorithm_info())
        })
        .await?;
    Ok(Json(info))
}
