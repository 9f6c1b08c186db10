//! Domain error types
//!
//! Errors raised by the catalog, cart and order book.

use thiserror::Error;

use crate::shop::types::OrderStatus;

/// Errors that can occur in the shop domain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShopError {
    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested menu item does not exist
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// Requested cart line does not exist
    #[error("Cart item not found: {0}")]
    CartItemNotFound(String),

    /// Requested order does not exist
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Status change outside the allowed pipeline
    #[error("Invalid transition for order {order_id}: {from} -> {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Checkout attempted with nothing in the cart
    #[error("Cart is empty")]
    EmptyCart,
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
