//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::assistant::ChatTurn;
use crate::kiosk::{Notification, View};
use crate::shop::{Category, MenuItem, MenuItemDraft, Order, OrderStatus};

// ============================================
// SESSION DTOs
// ============================================

/// Staff login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// View switch request
#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub view: View,
}

// ============================================
// MENU DTOs
// ============================================

/// Query parameters for listing the menu
#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    /// `drink`, `food` or `dessert`
    #[serde(default)]
    pub category: Option<String>,
}

/// Menu listing
#[derive(Debug, Serialize)]
pub struct MenuListResponse {
    pub items: Vec<MenuItem>,
    pub total: usize,
}

/// Create or update request for a menu item
#[derive(Debug, Deserialize)]
pub struct MenuItemRequest {
    pub name: String,
    pub price: i64,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl MenuItemRequest {
    pub fn into_draft(self, id: Option<String>) -> MenuItemDraft {
        MenuItemDraft {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            description: self.description,
            image: self.image,
        }
    }
}

// ============================================
// CART DTOs
// ============================================

/// Add a menu item to the cart
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub item_id: String,
}

/// Adjust a cart line
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCartItemRequest {
    /// Added to the quantity; the result never drops below 1
    #[serde(default)]
    pub delta: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerNameRequest {
    pub name: String,
}

// ============================================
// ORDER DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct ClearOrdersResponse {
    pub removed: usize,
}

// ============================================
// NOTIFICATION / ASSISTANT DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

/// Reply to a question
///
/// `reply` is absent when the question was blank or another one was still
/// being answered; `status` says which.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub configured: bool,
    pub thinking: bool,
    pub turns: Vec<ChatTurn>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", "unhealthy"
    pub status: String,
    /// Store status
    pub store: String,
    /// Assistant status: "configured" or "disabled"
    pub assistant: String,
    /// Open WebSocket screens
    pub ws_connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_request_defaults() {
        let req: MenuItemRequest =
            serde_json::from_str(r#"{"name": "Cocoa", "price": 50, "category": "drink"}"#).unwrap();
        let draft = req.into_draft(Some("d9".to_string()));
        assert_eq!(draft.id.as_deref(), Some("d9"));
        assert_eq!(draft.category, Category::Drink);
        assert!(draft.description.is_empty());
    }

    #[test]
    fn test_update_cart_request_is_partial() {
        let req: UpdateCartItemRequest = serde_json::from_str(r#"{"delta": -1}"#).unwrap();
        assert_eq!(req.delta, Some(-1));
        assert!(req.notes.is_none());
    }

    #[test]
    fn test_view_request() {
        let req: ViewRequest = serde_json::from_str(r#"{"view": "queue-status"}"#).unwrap();
        assert_eq!(req.view, View::QueueStatus);
    }
}
