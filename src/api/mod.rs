pub mod auth;
pub mod error;
pub mod validation;
pub mod workouts;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // JSON API; every handler requires an identity through `CurrentUser`
    let api_routes = Router::new()
        .route(
            "/workouts",
            get(workouts::list_workouts).post(workouts::create_workout),
        )
        .route(
            "/workouts/:id",
            get(workouts::get_workout).put(workouts::update_workout),
        )
        .route("/workouts/:id/exercises", post(workouts::add_exercise))
        .route(
            "/workouts/:id/exercises/:workout_exercise_id/sets",
            post(workouts::log_set),
        )
        .route("/exercises", get(workouts::list_exercises));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .merge(crate::ui::create_router())
        .fallback(crate::ui::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
