//! WebSocket Handler
//!
//! Upgrades `/ws` requests and pumps hub messages to the socket until
//! either side closes.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;

/// Query string accepted on `/ws`
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Comma-separated topics to subscribe to right after connecting,
    /// e.g. `/ws?topics=orders,notifications` for a queue board
    #[serde(default)]
    pub topics: Option<String>,
}

impl WsParams {
    fn initial_topics(&self) -> Vec<String> {
        self.topics
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// WebSocket upgrade handler for kiosk screens
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = Arc::clone(state.kiosk.hub());
    let topics = params.initial_topics();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, topics))
}

fn encode(message: &ServerMessage) -> Message {
    Message::Text(serde_json::to_string(message).unwrap_or_default())
}

async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>, topics: Vec<String>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let _ = sender
                .send(encode(&ServerMessage::Error {
                    message: e.to_string(),
                }))
                .await;
            return;
        }
    };

    let connected = ServerMessage::Connected {
        connection_id: connection_id.clone(),
    };
    if sender.send(encode(&connected)).await.is_err() {
        hub.unregister(&connection_id).await;
        return;
    }

    if !topics.is_empty() {
        handle_client_message(&hub, &connection_id, ClientMessage::Subscribe { topics }).await;
    }

    let send_id = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(encode(&msg)).await.is_err() {
                tracing::debug!(connection_id = %send_id, "WebSocket send failed, closing connection");
                break;
            }
        }
    });

    let recv_hub = Arc::clone(&hub);
    let recv_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&recv_hub, &recv_id, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(connection_id = %recv_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(hub: &Arc<ConnectionHub>, connection_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_client_message(hub, connection_id, client_msg).await,
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "Invalid client message");
                    reply(
                        hub,
                        connection_id,
                        ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        },
                    )
                    .await;
                }
            }
            true
        }
        Message::Binary(_) => {
            reply(
                hub,
                connection_id,
                ServerMessage::Error {
                    message: "Binary messages not supported".to_string(),
                },
            )
            .await;
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

async fn handle_client_message(hub: &Arc<ConnectionHub>, connection_id: &str, message: ClientMessage) {
    let response = match message {
        ClientMessage::Subscribe { topics } => hub
            .subscribe(connection_id, topics)
            .await
            .map(|topics| ServerMessage::Subscribed { topics }),
        ClientMessage::Unsubscribe { topics } => hub
            .unsubscribe(connection_id, topics)
            .await
            .map(|topics| ServerMessage::Unsubscribed { topics }),
        ClientMessage::Ping => Ok(ServerMessage::Pong),
    };

    let response = response.unwrap_or_else(|e| {
        tracing::error!(connection_id = %connection_id, error = %e, "Subscription error");
        ServerMessage::Error {
            message: e.to_string(),
        }
    });
    reply(hub, connection_id, response).await;
}

async fn reply(hub: &ConnectionHub, connection_id: &str, message: ServerMessage) {
    if let Err(e) = hub.send_to(connection_id, message).await {
        tracing::debug!(connection_id = %connection_id, error = %e, "Reply dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::HubConfig;

    #[test]
    fn test_initial_topics() {
        let params = WsParams {
            topics: Some("orders, notifications,,".to_string()),
        };
        assert_eq!(params.initial_topics(), vec!["orders", "notifications"]);
        assert!(WsParams::default().initial_topics().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_message_is_confirmed() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();

        let text = r#"{"type": "subscribe", "topics": ["orders"]}"#;
        assert!(handle_ws_message(&hub, &id, Message::Text(text.to_string())).await);

        match rx.recv().await {
            Some(ServerMessage::Subscribed { topics }) => assert_eq!(topics, vec!["orders"]),
            other => panic!("Expected Subscribed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_message_keeps_connection_open() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();

        assert!(handle_ws_message(&hub, &id, Message::Text("nonsense".to_string())).await);
        assert!(matches!(rx.recv().await, Some(ServerMessage::Error { .. })));

        assert!(!handle_ws_message(&hub, &id, Message::Close(None)).await);
    }
}
