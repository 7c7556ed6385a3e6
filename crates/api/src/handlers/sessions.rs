//! Handlers for the session lifecycle: load a sequence, navigate frames,
//! toggle labels, persist the deletion payload, fetch the overlay.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use segcull_core::deletion::{DeletionPayload, DeletionRecord, TagPolicy, ToggleAction};
use segcull_core::error::CoreError;
use segcull_core::session::Session;
use segcull_core::types::{FrameIndex, LabelId};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request and response shapes
   -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub sequence: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub label: LabelId,
}

/// Snapshot of a session, with records in canonical sorted order.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub sequence: String,
    pub frame: FrameIndex,
    pub frame_count: u32,
    pub policy: TagPolicy,
    pub drawing: bool,
    pub records: Vec<DeletionRecord>,
}

impl SessionView {
    pub(crate) fn build(id: Uuid, session: &mut Session) -> Self {
        Self {
            id,
            sequence: session.sequence().to_string(),
            frame: session.frame(),
            frame_count: session.frame_count(),
            policy: session.policy(),
            drawing: session.is_drawing(),
            records: session.canonical_records().to_vec(),
        }
    }
}

/// Session view plus whether a previous save was picked up.
#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub resumed: bool,
    #[serde(flatten)]
    pub view: SessionView,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub action: ToggleAction,
    pub records: Vec<DeletionRecord>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
    pub records: usize,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /sessions
///
/// Load a sequence into a fresh session: count its frames, hydrate the
/// deletion set from a previous save if one exists, and park the cursor on
/// the last frame.
pub async fn create_session(
    State(state): State<AppState>,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<impl IntoResponse> {
    let frame_count = state.store.frame_count(&input.sequence).await?;
    let saved = state.store.load_payload(&input.sequence).await?;
    let resumed = saved.is_some();

    let mut session =
        Session::new(input.sequence.as_str(), frame_count, state.config.policy, saved);
    let id = Uuid::new_v4();
    let view = SessionView::build(id, &mut session);

    state.sessions.write().await.insert(id, session);

    tracing::info!(
        session_id = %id,
        sequence = %input.sequence,
        frame_count,
        resumed,
        "Sequence loaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedSession { resumed, view },
        }),
    ))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    Ok(Json(DataResponse {
        data: SessionView::build(id, session),
    }))
}

/// POST /sessions/{id}/navigate
///
/// Move the frame cursor by `delta`, clamped into the sequence; an
/// out-of-range target is never an error.
pub async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NavigateRequest>,
) -> AppResult<impl IntoResponse> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    session.navigate(input.delta);
    Ok(Json(DataResponse {
        data: SessionView::build(id, session),
    }))
}

/// POST /sessions/{id}/toggle
///
/// Toggle one label against the current frame, bypassing the drag gesture.
pub async fn toggle_label(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ToggleRequest>,
) -> AppResult<impl IntoResponse> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;

    let action = session.toggle(input.label);
    log_toggle(id, &action);

    Ok(Json(DataResponse {
        data: ToggleResponse {
            action,
            records: session.canonical_records().to_vec(),
        },
    }))
}

/// POST /sessions/{id}/save
///
/// Persist the canonical deletion payload for the session's sequence.
pub async fn save_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let (sequence, payload) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
        let payload = DeletionPayload::from_records(session.canonical_records());
        (session.sequence().to_string(), payload)
    };

    state.store.save_payload(&sequence, &payload).await?;

    tracing::info!(
        session_id = %id,
        sequence = %sequence,
        records = payload.labels.len(),
        "Deletion payload saved"
    );

    Ok(Json(DataResponse {
        data: SaveResponse {
            saved: true,
            records: payload.labels.len(),
        },
    }))
}

/// GET /sessions/{id}/overlay
///
/// Proxy the rendered overlay for the current frame and record set from
/// the segmentation service.
pub async fn get_overlay(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let (sequence, frame, records) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
        (
            session.sequence().to_string(),
            session.frame(),
            session.canonical_records().to_vec(),
        )
    };

    let overlay = state
        .resolver
        .fetch_overlay(&sequence, frame, &records)
        .await?;

    Ok(([(header::CONTENT_TYPE, overlay.content_type)], overlay.bytes).into_response())
}

/* --------------------------------------------------------------------------
   Shared helpers
   -------------------------------------------------------------------------- */

pub(crate) fn session_not_found(id: Uuid) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Session",
        id: id.to_string(),
    })
}

/// One log line per toggle, mirroring the original tool's log panel.
pub(crate) fn log_toggle(session_id: Uuid, action: &ToggleAction) {
    match *action {
        ToggleAction::Deleted { label, frame } => {
            tracing::info!(session_id = %session_id, label, frame, "Deleting label");
        }
        ToggleAction::Undeleted { label, frame } => {
            tracing::info!(session_id = %session_id, label, frame, "Un-deleting label");
        }
        ToggleAction::Reassigned { label, from, to } => {
            tracing::info!(session_id = %session_id, label, from, to, "Changing frame of label");
        }
    }
}
