//! WebSocket Connection Hub
//!
//! Manages all WebSocket connections, subscriptions, and message broadcasting.
//! Uses tokio broadcast channels for in-process listeners.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};
use uuid::Uuid;

use super::messages::{
    ServerMessage, WsEvent, TOPIC_ALL, TOPIC_MENU, TOPIC_NOTIFICATIONS, TOPIC_ORDERS, TOPIC_SYSTEM,
};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

type Connections = Arc<RwLock<HashMap<ConnectionId, ConnectionHandle>>>;
type Subscriptions = Arc<RwLock<HashMap<String, HashSet<ConnectionId>>>>;

/// Manages all WebSocket connections and subscriptions
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: Connections,
    /// Topic subscriptions: Topic → Set of ConnectionIds
    subscriptions: Subscriptions,
    /// Broadcast channel for in-process listeners
    broadcast_tx: broadcast::Sender<WsEvent>,
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Capacity of the broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 256,
            broadcast_capacity: 256,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    /// Channel sender for this connection
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Topics this connection is subscribed to
    pub subscriptions: HashSet<String>,
}

impl ConnectionHub {
    pub fn new(config: HubConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            broadcast_tx,
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(
            id.clone(),
            ConnectionHandle {
                sender,
                subscriptions: HashSet::new(),
            },
        );

        tracing::info!(connection_id = %id, "WebSocket connected");
        Ok(id)
    }

    /// Unregister a connection and clean up its subscriptions
    pub async fn unregister(&self, id: &str) {
        let handle = self.connections.write().await.remove(id);

        if let Some(handle) = handle {
            let mut subs = self.subscriptions.write().await;
            for topic in handle.subscriptions {
                if let Some(subscribers) = subs.get_mut(&topic) {
                    subscribers.remove(id);
                    if subscribers.is_empty() {
                        subs.remove(&topic);
                    }
                }
            }
        }

        tracing::info!(connection_id = %id, "WebSocket disconnected");
    }

    /// Subscribe a connection to topics; unknown topics are skipped
    pub async fn subscribe(&self, id: &str, topics: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections.get_mut(id).ok_or(HubError::ConnectionNotFound)?;

        let mut subs = self.subscriptions.write().await;
        let mut subscribed = Vec::new();

        for topic in topics {
            if !is_valid_topic(&topic) {
                tracing::warn!(topic = %topic, "Invalid topic ignored");
                continue;
            }

            handle.subscriptions.insert(topic.clone());
            subs.entry(topic.clone()).or_default().insert(id.to_string());
            subscribed.push(topic);
        }

        tracing::debug!(connection_id = %id, topics = ?subscribed, "Subscribed to topics");
        Ok(subscribed)
    }

    /// Unsubscribe a connection from topics
    pub async fn unsubscribe(&self, id: &str, topics: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections.get_mut(id).ok_or(HubError::ConnectionNotFound)?;

        let mut subs = self.subscriptions.write().await;
        let mut unsubscribed = Vec::new();

        for topic in topics {
            if handle.subscriptions.remove(&topic) {
                if let Some(subscribers) = subs.get_mut(&topic) {
                    subscribers.remove(id);
                    if subscribers.is_empty() {
                        subs.remove(&topic);
                    }
                }
                unsubscribed.push(topic);
            }
        }

        tracing::debug!(connection_id = %id, topics = ?unsubscribed, "Unsubscribed from topics");
        Ok(unsubscribed)
    }

    /// Deliver an event to subscribers of its topic and of `*`
    pub async fn broadcast(&self, event: &WsEvent) -> usize {
        deliver(&self.connections, &self.subscriptions, event).await
    }

    /// Publish an event without waiting for delivery
    pub fn publish(&self, event: WsEvent) {
        let _ = self.broadcast_tx.send(event.clone());

        let connections = Arc::clone(&self.connections);
        let subscriptions = Arc::clone(&self.subscriptions);
        tokio::spawn(async move {
            deliver(&connections, &subscriptions, &event).await;
        });
    }

    /// Send a message directly to a specific connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle.sender.send(message).map_err(|_| HubError::SendFailed)
    }

    /// Receiver for every published event
    pub fn subscribe_broadcast(&self) -> broadcast::Receiver<WsEvent> {
        self.broadcast_tx.subscribe()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn subscription_count(&self, topic: &str) -> usize {
        self.subscriptions
            .read()
            .await
            .get(topic)
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

fn is_valid_topic(topic: &str) -> bool {
    matches!(
        topic,
        TOPIC_ORDERS | TOPIC_MENU | TOPIC_NOTIFICATIONS | TOPIC_SYSTEM | TOPIC_ALL
    )
}

async fn deliver(connections: &Connections, subscriptions: &Subscriptions, event: &WsEvent) -> usize {
    let subs = subscriptions.read().await;
    let connections = connections.read().await;

    let direct = subs.get(&event.topic).cloned().unwrap_or_default();
    let wildcard = subs.get(TOPIC_ALL).cloned().unwrap_or_default();
    let all_ids: HashSet<_> = direct.union(&wildcard).collect();

    let mut sent_count = 0;
    for id in all_ids {
        if let Some(handle) = connections.get(id) {
            if handle.sender.send(event.message.clone()).is_ok() {
                sent_count += 1;
            }
        }
    }

    if sent_count > 0 {
        tracing::trace!(topic = %event.topic, subscribers = sent_count, "Broadcast event");
    }
    sent_count
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_topics() {
        assert!(is_valid_topic("orders"));
        assert!(is_valid_topic("menu"));
        assert!(is_valid_topic("notifications"));
        assert!(is_valid_topic("system"));
        assert!(is_valid_topic("*"));

        assert!(!is_valid_topic("invalid"));
        assert!(!is_valid_topic(""));
        assert!(!is_valid_topic("orders.A001"));
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();

        let subscribed = hub
            .subscribe(&id, vec!["orders".to_string(), "bogus".to_string()])
            .await
            .unwrap();
        assert_eq!(subscribed, vec!["orders"]);
        assert_eq!(hub.subscription_count("orders").await, 1);

        let unsubscribed = hub.unsubscribe(&id, vec!["orders".to_string()]).await.unwrap();
        assert_eq!(unsubscribed, vec!["orders"]);
        assert_eq!(hub.subscription_count("orders").await, 0);

        hub.unregister(&id).await;
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ConnectionHub::new(HubConfig {
            max_connections: 2,
            broadcast_capacity: 16,
        });

        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();
        let (tx3, _) = mpsc::unbounded_channel();

        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();
        let result = hub.register(tx3).await;

        assert!(matches!(result, Err(HubError::TooManyConnections(2))));
    }

    #[tokio::test]
    async fn test_broadcast_to_subscribers() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let id1 = hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();

        hub.subscribe(&id1, vec!["menu".to_string()]).await.unwrap();

        let sent = hub.broadcast(&WsEvent::menu_updated(4)).await;
        assert_eq!(sent, 1);
        assert!(matches!(rx1.try_recv(), Ok(ServerMessage::MenuUpdated { item_count: 4 })));
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wildcard_subscription() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();
        hub.subscribe(&id, vec!["*".to_string()]).await.unwrap();

        hub.broadcast(&WsEvent::orders_cleared(3)).await;
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::OrdersCleared { removed: 3 })));
    }

    #[tokio::test]
    async fn test_publish_reaches_in_process_listeners() {
        let hub = ConnectionHub::new(HubConfig::default());
        let mut listener = hub.subscribe_broadcast();

        hub.publish(WsEvent::system("starting"));

        let event = listener.recv().await.unwrap();
        assert_eq!(event.topic, "system");
    }
}
