//! Menu Routes
//!
//! Catalog listing for everyone signed in, editing for staff.
//!
//! - GET /api/v1/menu?category= - List items
//! - POST /api/v1/menu - Create an item
//! - PUT /api/v1/menu/:id - Replace an item
//! - DELETE /api/v1/menu/:id - Delete an item

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{MenuItemRequest, MenuListResponse, MenuQuery};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::SessionId;
use crate::api::state::AppState;
use crate::shop::{Category, MenuItem};

/// GET /api/v1/menu
pub async fn list_menu(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Json<MenuListResponse>> {
    let category = parse_category(query.category.as_deref())?;
    let items = state.kiosk.menu(session.as_str(), category).await?;

    Ok(Json(MenuListResponse {
        total: items.len(),
        items,
    }))
}

/// POST /api/v1/menu
pub async fn create_menu_item(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(req): Json<MenuItemRequest>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    let (item, _) = state
        .kiosk
        .save_menu_item(session.as_str(), req.into_draft(None))
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/v1/menu/:id
pub async fn update_menu_item(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
    Json(req): Json<MenuItemRequest>,
) -> ApiResult<Json<MenuItem>> {
    let (item, _) = state
        .kiosk
        .save_menu_item(session.as_str(), req.into_draft(Some(id)))
        .await?;

    Ok(Json(item))
}

/// DELETE /api/v1/menu/:id
pub async fn delete_menu_item(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.kiosk.delete_menu_item(session.as_str(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_category(raw: Option<&str>) -> ApiResult<Option<Category>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<Category>()
            .map(Some)
            .map_err(|e| ApiError::Validation(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category(None).unwrap(), None);
        assert_eq!(parse_category(Some("")).unwrap(), None);
        assert_eq!(parse_category(Some("food")).unwrap(), Some(Category::Food));
        assert!(parse_category(Some("soup")).is_err());
    }
}
