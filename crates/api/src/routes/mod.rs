pub mod health;
pub mod sequences;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sequences                               list sequences + tag config
/// /sequences/{seq}/frames/{idx}            raw frame bytes
///
/// /sessions                                open a session (POST)
/// /sessions/{id}                           session snapshot
/// /sessions/{id}/navigate                  move the frame cursor (POST)
/// /sessions/{id}/selection/begin           start a drag (POST)
/// /sessions/{id}/selection/update          move the drag corner (POST)
/// /sessions/{id}/selection/end             finish the drag, toggle labels (POST)
/// /sessions/{id}/toggle                    toggle one label directly (POST)
/// /sessions/{id}/save                      persist the deletion payload (POST)
/// /sessions/{id}/overlay                   rendered overlay for current frame
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(sequences::router())
        .merge(sessions::router())
}
