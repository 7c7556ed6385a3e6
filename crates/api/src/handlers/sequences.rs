//! Handlers for sequence discovery and frame images.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use segcull_core::deletion::TagPolicy;
use segcull_core::types::FrameIndex;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Annotatable sequences plus the active tag configuration, so a client
/// knows which toggle semantics it is driving.
#[derive(Debug, Serialize)]
pub struct SequenceListing {
    pub sequences: Vec<String>,
    pub tag: String,
    pub policy: TagPolicy,
}

/// GET /sequences
pub async fn list_sequences(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let sequences = state.store.list_sequences().await?;
    Ok(Json(DataResponse {
        data: SequenceListing {
            sequences,
            tag: state.config.tag_name.clone(),
            policy: state.config.policy,
        },
    }))
}

/// GET /sequences/{seq}/frames/{idx}
///
/// Raw frame bytes with a content type from the file extension; pixels are
/// never decoded server-side. Out-of-range indices are 404 here --
/// navigation inside a session clamps instead.
pub async fn get_frame(
    State(state): State<AppState>,
    Path((sequence, frame)): Path<(String, FrameIndex)>,
) -> AppResult<Response> {
    let (bytes, media_type) = state.store.read_frame(&sequence, frame).await?;
    Ok(([(header::CONTENT_TYPE, media_type)], bytes).into_response())
}
