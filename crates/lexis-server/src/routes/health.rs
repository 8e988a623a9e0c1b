//! Liveness and storage reachability.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;
use lexis_core::scheduling::Algorithm;

/// Whether the store answered a catalog query.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StorageHealth {
    Ok { sources: usize },
    Unavailable { error: String },
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when storage is unreachable.
    pub status: &'static str,
    pub storage: StorageHealth,
    pub algorithm: Algorithm,
    pub version: &'static str,
}

/// Health check endpoint. Answers 503 when the store is unreachable.
/// GET /health
pub async fn health_check(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<HealthResponse>)> {
    let (algorithm, sources) = state
        .run(|engine| Ok((engine.algorithm(), engine.sources())))
        .await?;

    let (code, status, storage) = match sources {
        Ok(sources) => (
            StatusCode::OK,
            "healthy",
            StorageHealth::Ok {
                sources: sources.len(),
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach storage");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "degraded",
                StorageHealth::Unavailable {
                    error: e.to_string(),
                },
            )
        }
    };

    Ok((
        code,
        Json(HealthResponse {
            status,
            storage,
            algorithm,
            version: env!("CARGO_PKG_VERSION"),
        }),
    ))
}
