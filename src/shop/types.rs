//! Core data types for the tea-house kiosk
//!
//! - `MenuItem`: An orderable catalog entry
//! - `CartItem`: A menu item with quantity and notes, held in the cart
//! - `Order`: A submitted cart with its queue label and status
//! - `Category`, `OrderStatus` and `Role`: Classification enums

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::shop::error::ShopError;

/// Category of a menu item, used for the menu tabs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Drink,
    Food,
    Dessert,
}

impl Category {
    /// Get all categories for iteration
    pub fn all() -> &'static [Category] {
        &[Category::Drink, Category::Food, Category::Dessert]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Drink => write!(f, "drink"),
            Category::Food => write!(f, "food"),
            Category::Dessert => write!(f, "dessert"),
        }
    }
}

impl FromStr for Category {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drink" => Ok(Category::Drink),
            "food" => Ok(Category::Food),
            "dessert" => Ok(Category::Dessert),
            _ => Err(ShopError::Validation(format!(
                "Invalid category: {}. Use drink, food, or dessert",
                s
            ))),
        }
    }
}

/// An orderable catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Price in whole baht
    pub price: i64,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    /// Image URL, empty when the item has no picture
    #[serde(default)]
    pub image: String,
}

impl MenuItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: i64,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category,
            description: String::new(),
            image: String::new(),
        }
    }

    /// Builder method: set description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method: set image URL
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// A cart line: the menu item as it was when added, plus quantity and notes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
    /// Special instructions for the kitchen
    #[serde(default)]
    pub notes: String,
}

impl CartItem {
    pub fn new(item: MenuItem) -> Self {
        Self {
            item,
            quantity: 1,
            notes: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// price × quantity
    pub fn line_total(&self) -> i64 {
        self.item.price * i64::from(self.quantity)
    }
}

/// Order lifecycle
///
/// ```text
/// PENDING → PREPARING → READY → COMPLETED
///    └────→ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether `next` is reachable from this status in one step
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }

    /// The forward step along the main pipeline
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Still on the staff board
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OrderStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "READY" => Ok(OrderStatus::Ready),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(ShopError::Validation(format!(
                "Invalid order status: {}. Use PENDING, PREPARING, READY, COMPLETED, or CANCELLED",
                s
            ))),
        }
    }
}

/// A submitted order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    /// Human-facing ticket, e.g. "A007"
    pub queue_number: String,
    pub items: Vec<CartItem>,
    /// Fixed at creation time
    pub total_price: i64,
    pub status: OrderStatus,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    pub customer_name: String,
}

/// Who is using the kiosk
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Customer,
    Merchant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Customer => "customer",
            Role::Merchant => "merchant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "guest" => Ok(Role::Guest),
            "customer" => Ok(Role::Customer),
            "merchant" => Ok(Role::Merchant),
            _ => Err(ShopError::Validation(format!("Invalid role: {}", s))),
        }
    }
}

/// Format a queue label: `prefix` followed by the sequence zero-padded to three digits
pub fn queue_label(prefix: &str, seq: u32) -> String {
    format!("{}{:03}", prefix, seq)
}

/// Sequence number of a queue label, if it has the given prefix
pub fn queue_sequence(prefix: &str, label: &str) -> Option<u32> {
    label.strip_prefix(prefix)?.parse().ok()
}
