//! Queue Board, Statistics and Notifications
//!
//! - GET /api/v1/queue - Ready and waiting tickets
//! - GET /api/v1/stats - Revenue and order counts (staff)
//! - GET /api/v1/notifications - Unexpired notifications

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::NotificationListResponse;
use crate::api::error::ApiResult;
use crate::api::extract::SessionId;
use crate::api::state::AppState;
use crate::kiosk::{QueueBoard, ShopStats};

/// GET /api/v1/queue
pub async fn queue_board(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<QueueBoard>> {
    Ok(Json(state.kiosk.queue_board(session.as_str()).await?))
}

/// GET /api/v1/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<ShopStats>> {
    Ok(Json(state.kiosk.stats(session.as_str()).await?))
}

/// GET /api/v1/notifications
pub async fn notifications(State(state): State<Arc<AppState>>) -> Json<NotificationListResponse> {
    Json(NotificationListResponse {
        notifications: state.kiosk.notifications().await,
    })
}
