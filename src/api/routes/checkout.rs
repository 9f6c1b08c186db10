//! Checkout Routes
//!
//! Simulated QR payment.
//!
//! - POST /api/v1/checkout - Open the payment modal
//! - POST /api/v1/checkout/confirm - Pay and place the order
//! - DELETE /api/v1/checkout - Dismiss the modal

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::SessionId;
use crate::api::state::AppState;
use crate::kiosk::CartView;
use crate::shop::Order;

/// POST /api/v1/checkout
pub async fn open_payment(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<CartView>> {
    Ok(Json(state.kiosk.open_payment(session.as_str()).await?))
}

/// POST /api/v1/checkout/confirm
///
/// Responds once the simulated processing delay has passed.
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.kiosk.confirm_payment(session.as_str()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// DELETE /api/v1/checkout
pub async fn dismiss_payment(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<CartView>> {
    Ok(Json(state.kiosk.dismiss_payment(session.as_str()).await?))
}
