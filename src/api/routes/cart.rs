//! Cart Routes
//!
//! The calling customer's pending selection.
//!
//! - GET /api/v1/cart - Lines, total and customer name
//! - POST /api/v1/cart/items - Add a menu item
//! - PATCH /api/v1/cart/items/:id - Change quantity or notes
//! - DELETE /api/v1/cart/items/:id - Remove a line
//! - PUT /api/v1/cart/customer - Set the name printed on the ticket

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AddToCartRequest, CustomerNameRequest, UpdateCartItemRequest};
use crate::api::error::ApiResult;
use crate::api::extract::SessionId;
use crate::api::state::AppState;
use crate::kiosk::CartView;

/// GET /api/v1/cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<CartView>> {
    Ok(Json(state.kiosk.cart(session.as_str()).await?))
}

/// POST /api/v1/cart/items
///
/// Adding an item already in the cart increments its quantity.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(req): Json<AddToCartRequest>,
) -> ApiResult<Json<CartView>> {
    Ok(Json(
        state
            .kiosk
            .add_to_cart(session.as_str(), &req.item_id)
            .await?,
    ))
}

/// PATCH /api/v1/cart/items/:id
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
    Json(req): Json<UpdateCartItemRequest>,
) -> ApiResult<Json<CartView>> {
    Ok(Json(
        state
            .kiosk
            .update_cart_item(session.as_str(), &id, req.delta, req.notes)
            .await?,
    ))
}

/// DELETE /api/v1/cart/items/:id
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> ApiResult<Json<CartView>> {
    Ok(Json(state.kiosk.remove_from_cart(session.as_str(), &id).await?))
}

/// PUT /api/v1/cart/customer
pub async fn set_customer(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(req): Json<CustomerNameRequest>,
) -> ApiResult<Json<CartView>> {
    Ok(Json(
        state
            .kiosk
            .set_customer_name(session.as_str(), &req.name)
            .await?,
    ))
}
