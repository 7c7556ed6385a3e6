//! Handlers for the drag-selection gesture.
//!
//! `begin` and `update` only move the session's rectangle; `end` freezes it
//! against the frame's native resolution, asks the resolver which labels
//! fall inside, and feeds each one through the deletion set in order. The
//! session map's write lock is held across the resolver round-trip so a
//! concurrent toggle cannot interleave with the batch.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use segcull_core::deletion::{DeletionRecord, ToggleAction};
use segcull_core::types::{LabelId, PixelBounds};

use crate::error::AppResult;
use crate::handlers::sessions::{log_toggle, session_not_found};
use crate::response::DataResponse;
use crate::state::AppState;

/// A pointer position in unit coordinates relative to the displayed frame.
#[derive(Debug, Deserialize)]
pub struct PointRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct DrawingState {
    pub drawing: bool,
}

/// Result of finishing a drag: the pixel region, the labels the resolver
/// found in it, what happened to each, and the record set afterwards.
#[derive(Debug, Serialize)]
pub struct SelectionOutcome {
    pub bounds: Option<PixelBounds>,
    pub labels: Vec<LabelId>,
    pub actions: Vec<ToggleAction>,
    pub records: Vec<DeletionRecord>,
}

impl SelectionOutcome {
    fn empty(records: Vec<DeletionRecord>) -> Self {
        Self {
            bounds: None,
            labels: Vec::new(),
            actions: Vec::new(),
            records,
        }
    }
}

/// POST /sessions/{id}/selection/begin
pub async fn begin_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PointRequest>,
) -> AppResult<impl IntoResponse> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    session.begin_selection(input.x, input.y);
    Ok(Json(DataResponse {
        data: DrawingState {
            drawing: session.is_drawing(),
        },
    }))
}

/// POST /sessions/{id}/selection/update
pub async fn update_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PointRequest>,
) -> AppResult<impl IntoResponse> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    session.update_selection(input.x, input.y);
    Ok(Json(DataResponse {
        data: DrawingState {
            drawing: session.is_drawing(),
        },
    }))
}

/// POST /sessions/{id}/selection/end
///
/// Ending with no drag in progress is a no-op and returns an empty outcome.
pub async fn end_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;

    if !session.is_drawing() {
        return Ok(Json(DataResponse {
            data: SelectionOutcome::empty(session.canonical_records().to_vec()),
        }));
    }

    let (width, height) = state
        .store
        .frame_dimensions(session.sequence(), session.frame())
        .await?;

    let Some(bounds) = session.end_selection(width, height) else {
        return Ok(Json(DataResponse {
            data: SelectionOutcome::empty(session.canonical_records().to_vec()),
        }));
    };

    let labels = state
        .resolver
        .resolve_labels(session.sequence(), session.frame(), bounds)
        .await?;

    tracing::info!(
        session_id = %id,
        frame = session.frame(),
        labels = labels.len(),
        "Selection resolved"
    );

    let mut actions = Vec::with_capacity(labels.len());
    for &label in &labels {
        let action = session.toggle(label);
        log_toggle(id, &action);
        actions.push(action);
    }

    Ok(Json(DataResponse {
        data: SelectionOutcome {
            bounds: Some(bounds),
            labels,
            actions,
            records: session.canonical_records().to_vec(),
        },
    }))
}
