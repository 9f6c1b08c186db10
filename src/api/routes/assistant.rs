//! Assistant Routes
//!
//! - GET /api/v1/assistant - Transcript so far
//! - POST /api/v1/assistant - Ask a question about the menu
//!
//! Model faults never surface here; the reply is a canned apology instead.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{AskRequest, AskResponse, TranscriptResponse};
use crate::api::error::ApiResult;
use crate::api::extract::SessionId;
use crate::api::state::AppState;
use crate::assistant::AskOutcome;

/// GET /api/v1/assistant
pub async fn transcript(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<TranscriptResponse>> {
    let turns = state.kiosk.transcript(session.as_str()).await?;
    let assistant = state.kiosk.assistant();

    Ok(Json(TranscriptResponse {
        configured: assistant.is_configured(),
        thinking: assistant.is_thinking(session.as_str()),
        turns,
    }))
}

/// POST /api/v1/assistant
pub async fn ask(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(req): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    let outcome = state
        .kiosk
        .ask_assistant(session.as_str(), &req.message)
        .await?;

    let response = match outcome {
        AskOutcome::Answered(turn) => AskResponse {
            status: "answered".to_string(),
            reply: Some(turn),
        },
        AskOutcome::Ignored => AskResponse {
            status: "ignored".to_string(),
            reply: None,
        },
        AskOutcome::Busy => AskResponse {
            status: "busy".to_string(),
            reply: None,
        },
    };
    Ok(Json(response))
}
