//! # Homcha
//!
//! Smart Queue - ordering and queue tickets for a Phayao tea house, served
//! over HTTP and WebSocket.
//!
//! ## Features
//!
//! - **Menu catalog**: Staff-edited, persisted across restarts
//! - **Cart and checkout**: Simulated QR payment that issues queue tickets (`A001`, `A002`, ...)
//! - **Order pipeline**: PENDING → PREPARING → READY → COMPLETED, or CANCELLED
//! - **Real-time**: WebSocket events for kitchen displays and queue boards
//! - **Menu assistant**: Answers questions through a generative-language API
//!
//! ## Modules
//!
//! - [`shop`]: Domain types, catalog, cart and order book
//! - [`kiosk`]: Sessions, roles, payment and notifications
//! - [`store`]: Key-value persistence for the catalog and role
//! - [`assistant`]: Chat assistant and its REST client
//! - [`websocket`]: Connection hub and event types
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use homcha::kiosk::{Kiosk, KioskConfig, DEFAULT_SESSION};
//! use homcha::shop::OrderStatus;
//! use homcha::store::{LocalStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LocalStore::open(&StoreConfig::new("homcha_data"))?;
//!     let kiosk = Kiosk::open(KioskConfig::default(), store, None)?;
//!
//!     // A customer orders a Thai tea
//!     kiosk.enter_as_customer("table-1").await?;
//!     kiosk.add_to_cart("table-1", "d1").await?;
//!     kiosk.open_payment("table-1").await?;
//!     let order = kiosk.confirm_payment("table-1").await?;
//!
//!     // Staff move it along
//!     kiosk.merchant_login(DEFAULT_SESSION, "907264").await?;
//!     kiosk.update_order_status(DEFAULT_SESSION, &order.id, OrderStatus::Preparing).await?;
//!
//!     println!("Queue {} is being prepared", order.queue_number);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod config;
pub mod kiosk;
pub mod shop;
pub mod store;
pub mod websocket;

// Re-export top-level types for convenience
pub use shop::{
    CartItem, Category, MenuItem, MenuItemDraft, Order, OrderStatus, Role, ShopError, ShopResult,
};

pub use kiosk::{Kiosk, KioskConfig, KioskError, KioskResult, SessionInfo, View};

pub use store::{LocalStore, StorageError, StorageResult, StoreConfig};

pub use assistant::{
    AskOutcome, AssistantError, ChatAssistant, ChatTurn, GenerativeClient, GenerativeConfig,
    LanguageModel,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage, WsEvent,
};

pub use config::{
    ApiConfig as ConfigApiConfig, AssistantConfig, Config, ConfigError,
    KioskConfig as ConfigKioskConfig, LoggingConfig, StoreSection,
};
