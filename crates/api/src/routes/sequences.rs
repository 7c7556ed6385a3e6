use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount sequence discovery and frame-serving routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sequences", get(handlers::sequences::list_sequences))
        .route(
            "/sequences/{seq}/frames/{idx}",
            get(handlers::sequences::get_frame),
        )
}
