//! WebSocket Real-Time Updates
//!
//! Pushes order, menu and notification events to kiosk screens (kitchen
//! display, queue board, menu tablets).
//!
//! Clients connect to `/ws` and subscribe to topics:
//! - `orders` - Order placed, status changed, orders cleared
//! - `menu` - Catalog edits
//! - `notifications` - Toast messages
//! - `system` - Server lifecycle
//! - `*` - Everything
//!
//! Topics may also be given up front: `/ws?topics=orders,notifications`.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8090/ws');
//! ws.onopen = () => ws.send(JSON.stringify({type: 'subscribe', topics: ['orders']}));
//! ws.onmessage = (event) => console.log(JSON.parse(event.data));
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::{websocket_handler, WsParams};
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{
    ClientMessage, ServerMessage, WsEvent, TOPIC_ALL, TOPIC_MENU, TOPIC_NOTIFICATIONS,
    TOPIC_ORDERS, TOPIC_SYSTEM,
};
