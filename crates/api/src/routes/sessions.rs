use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount session lifecycle and selection-gesture routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::sessions::create_session))
        .route("/sessions/{id}", get(handlers::sessions::get_session))
        .route(
            "/sessions/{id}/navigate",
            post(handlers::sessions::navigate),
        )
        .route(
            "/sessions/{id}/selection/begin",
            post(handlers::selection::begin_selection),
        )
        .route(
            "/sessions/{id}/selection/update",
            post(handlers::selection::update_selection),
        )
        .route(
            "/sessions/{id}/selection/end",
            post(handlers::selection::end_selection),
        )
        .route(
            "/sessions/{id}/toggle",
            post(handlers::sessions::toggle_label),
        )
        .route("/sessions/{id}/save", post(handlers::sessions::save_session))
        .route(
            "/sessions/{id}/overlay",
            get(handlers::sessions::get_overlay),
        )
}
