//! Transient notifications
//!
//! Short toasts raised by order events. Each one is pushed to websocket
//! subscribers and expires on its own after the configured TTL.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::websocket::{ConnectionHub, WsEvent};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub message: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

pub struct NotificationCenter {
    entries: Arc<RwLock<Vec<Notification>>>,
    ttl: Duration,
    hub: Arc<ConnectionHub>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration, hub: Arc<ConnectionHub>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            ttl,
            hub,
        }
    }

    /// Raise a notification and schedule its removal
    pub async fn notify(&self, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        self.entries.write().await.push(notification.clone());
        self.hub
            .publish(WsEvent::notification(&notification.id, &notification.message));
        tracing::info!(message = %notification.message, "Notification raised");

        let entries = Arc::clone(&self.entries);
        let id = notification.id.clone();
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            entries.write().await.retain(|n| n.id != id);
        });

        notification
    }

    /// Notifications that have not expired yet, oldest first
    pub async fn active(&self) -> Vec<Notification> {
        self.entries.read().await.clone()
    }
}
