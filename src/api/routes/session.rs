//! Session Routes
//!
//! Role and view of the calling screen.
//!
//! - GET /api/v1/session - Current role, view and tracked order
//! - POST /api/v1/session/customer - Enter as a customer
//! - POST /api/v1/session/merchant - Staff login
//! - POST /api/v1/session/logout - Back to guest
//! - PUT /api/v1/session/view - Switch view

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{LoginRequest, ViewRequest};
use crate::api::error::ApiResult;
use crate::api::extract::SessionId;
use crate::api::state::AppState;
use crate::kiosk::SessionInfo;

/// GET /api/v1/session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> Json<SessionInfo> {
    Json(state.kiosk.session_info(session.as_str()).await)
}

/// POST /api/v1/session/customer
pub async fn enter_as_customer(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<SessionInfo>> {
    Ok(Json(state.kiosk.enter_as_customer(session.as_str()).await?))
}

/// POST /api/v1/session/merchant
///
/// A wrong password answers 403 with the localized message.
pub async fn merchant_login(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionInfo>> {
    Ok(Json(
        state
            .kiosk
            .merchant_login(session.as_str(), &req.password)
            .await?,
    ))
}

/// POST /api/v1/session/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResult<Json<SessionInfo>> {
    Ok(Json(state.kiosk.logout(session.as_str()).await?))
}

/// PUT /api/v1/session/view
pub async fn set_view(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(req): Json<ViewRequest>,
) -> ApiResult<Json<SessionInfo>> {
    Ok(Json(state.kiosk.set_view(session.as_str(), req.view).await?))
}
