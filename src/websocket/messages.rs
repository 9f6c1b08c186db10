//! WebSocket Message Types
//!
//! Defines all message types exchanged between kiosk screens (menu board,
//! kitchen display, queue board) and the server.

use serde::{Deserialize, Serialize};

use crate::shop::{Order, OrderStatus};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for real-time updates
    Subscribe {
        /// List of topics to subscribe to (e.g., "orders", "*")
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe {
        /// List of topics to unsubscribe from
        topics: Vec<String>,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A customer submitted an order
    OrderPlaced {
        order: Order,
    },
    /// Staff moved an order along the pipeline
    OrderStatus {
        order_id: String,
        queue_number: String,
        from: OrderStatus,
        to: OrderStatus,
    },
    /// All orders were cleared and the queue counter reset
    OrdersCleared {
        removed: usize,
    },
    /// The catalog changed
    MenuUpdated {
        item_count: usize,
    },
    /// A toast for every screen
    Notification {
        id: String,
        message: String,
    },
    /// Server lifecycle events
    System {
        message: String,
    },
    /// Subscription confirmed
    Subscribed {
        /// Topics successfully subscribed to
        topics: Vec<String>,
    },
    /// Unsubscription confirmed
    Unsubscribed {
        /// Topics successfully unsubscribed from
        topics: Vec<String>,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
}

pub const TOPIC_ORDERS: &str = "orders";
pub const TOPIC_MENU: &str = "menu";
pub const TOPIC_NOTIFICATIONS: &str = "notifications";
pub const TOPIC_SYSTEM: &str = "system";
/// Receives every topic
pub const TOPIC_ALL: &str = "*";

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    pub fn order_placed(order: &Order) -> Self {
        Self {
            topic: TOPIC_ORDERS.to_string(),
            message: ServerMessage::OrderPlaced {
                order: order.clone(),
            },
        }
    }

    pub fn order_status(order: &Order, from: OrderStatus) -> Self {
        Self {
            topic: TOPIC_ORDERS.to_string(),
            message: ServerMessage::OrderStatus {
                order_id: order.id.clone(),
                queue_number: order.queue_number.clone(),
                from,
                to: order.status,
            },
        }
    }

    pub fn orders_cleared(removed: usize) -> Self {
        Self {
            topic: TOPIC_ORDERS.to_string(),
            message: ServerMessage::OrdersCleared { removed },
        }
    }

    pub fn menu_updated(item_count: usize) -> Self {
        Self {
            topic: TOPIC_MENU.to_string(),
            message: ServerMessage::MenuUpdated { item_count },
        }
    }

    pub fn notification(id: &str, message: &str) -> Self {
        Self {
            topic: TOPIC_NOTIFICATIONS.to_string(),
            message: ServerMessage::Notification {
                id: id.to_string(),
                message: message.to_string(),
            },
        }
    }

    pub fn system(message: &str) -> Self {
        Self {
            topic: TOPIC_SYSTEM.to_string(),
            message: ServerMessage::System {
                message: message.to_string(),
            },
        }
    }
}
