//! Order Routes
//!
//! - GET /api/v1/orders - Active orders, newest first (staff)
//! - DELETE /api/v1/orders - Clear all orders and reset the queue (staff)
//! - GET /api/v1/orders/:id - One order
//! - POST /api/v1/orders/:id/status - Move an order to a status (staff)
//! - POST /api/v1/orders/:id/advance - Take the next pipeline step (staff)

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ClearOrdersResponse, OrderListResponse, StatusRequest};
use crate::api::error::ApiResult;
use crate::api::extract::SessionId;
use crate::api::state::AppState;
use crate::shop::Order;

/// GET /api/v1/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<OrderListResponse>> {
    let orders = state.kiosk.active_orders(session.as_str()).await?;
    Ok(Json(OrderListResponse {
        total: orders.len(),
        orders,
    }))
}

/// GET /api/v1/orders/:id
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.kiosk.order(session.as_str(), &id).await?))
}

/// POST /api/v1/orders/:id/status
///
/// Backward moves answer 409 `INVALID_TRANSITION`.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Order>> {
    Ok(Json(
        state
            .kiosk
            .update_order_status(session.as_str(), &id, req.status)
            .await?,
    ))
}

/// POST /api/v1/orders/:id/advance
pub async fn advance(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.kiosk.advance_order(session.as_str(), &id).await?))
}

/// DELETE /api/v1/orders
pub async fn clear_orders(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<ClearOrdersResponse>> {
    let removed = state.kiosk.clear_orders(session.as_str()).await?;
    Ok(Json(ClearOrdersResponse { removed }))
}
