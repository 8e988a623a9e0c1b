//! Route definitions for the REST API.

mod catalog;
mod health;
mod learn;
mod plans;
mod settings;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Review loop
        .route("/learners/:learner_id/next", get(learn::next_review))
        .route("/learners/:learner_id/peek", get(learn::peek_review))
        .route("/learners/:learner_id/reviews", post(learn::record_review))
        // Plans and stats
        .route("/learners/:learner_id/plans", post(plans::create_plan))
        .route("/learners/:learner_id/plan-progress", get(plans::plan_progress))
        .route("/learners/:learner_id/stats", get(plans::learner_stats))
        // Catalog
        .route("/sources", get(catalog::list_sources))
        .route("/sources/:source/units", get(catalog::senses_by_unit))
        .route("/senses/selection", get(catalog::senses_for_selection))
        .route("/senses/:sense_id", get(catalog::get_sense))
        // Settings
        .route(
            "/settings/algorithm",
            get(settings::get_algorithm).put(settings::set_algorithm),
        )
        // Attach state
        .with_state(state)
}

pub use catalog::*;
pub use health::*;
pub use learn::*;
pub use plans::*;
pub use settings::*;
