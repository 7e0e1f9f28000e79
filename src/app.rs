use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/goals/:id/movements", post(handlers::record_movement_form))
        .route(
            "/api/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/api/goals/:id",
            patch(handlers::rename_goal).delete(handlers::delete_goal),
        )
        .route("/api/goals/:id/history", get(handlers::goal_history))
        .route("/api/goals/:id/movements", post(handlers::record_movement))
        .route(
            "/api/movements/:id",
            put(handlers::revise_movement).delete(handlers::delete_movement),
        )
        .route("/api/topics", get(handlers::get_topics))
        .route("/export/summary.xlsx", get(handlers::export_xlsx))
        .route("/export/summary.csv", get(handlers::export_csv))
        .with_state(state)
}
