use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            patch(handlers::edit_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/cells/:date", post(handlers::cell_action))
        .route("/api/habits/:id/series", get(handlers::get_series))
        .route("/api/habits/:id/chart", get(handlers::get_chart))
        .route("/api/grid", get(handlers::get_grid))
        .with_state(state)
}
