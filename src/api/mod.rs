//! Homcha REST API
//!
//! HTTP API layer for the kiosk, built with Axum. Screens name their session
//! with the `x-kiosk-session` header; without it they share the kiosk's
//! default session.
//!
//! # Endpoints
//!
//! ## Session
//! - `GET /api/v1/session` - Role, view and tracked order
//! - `POST /api/v1/session/customer` - Enter as a customer
//! - `POST /api/v1/session/merchant` - Staff login
//! - `POST /api/v1/session/logout` - Back to guest
//! - `PUT /api/v1/session/view` - Switch view
//!
//! ## Menu
//! - `GET /api/v1/menu` - List items (`?category=drink`)
//! - `POST /api/v1/menu` - Create an item
//! - `PUT /api/v1/menu/:id` - Replace an item
//! - `DELETE /api/v1/menu/:id` - Delete an item
//!
//! ## Cart and checkout
//! - `GET /api/v1/cart` - Current cart
//! - `POST /api/v1/cart/items` - Add an item
//! - `PATCH /api/v1/cart/items/:id` - Change quantity or notes
//! - `DELETE /api/v1/cart/items/:id` - Remove a line
//! - `PUT /api/v1/cart/customer` - Set the customer name
//! - `POST /api/v1/checkout` - Open the payment modal
//! - `POST /api/v1/checkout/confirm` - Pay and place the order
//! - `DELETE /api/v1/checkout` - Dismiss the modal
//!
//! ## Orders
//! - `GET /api/v1/orders` - Active orders
//! - `DELETE /api/v1/orders` - Clear all and reset queue numbers
//! - `GET /api/v1/orders/:id` - One order
//! - `POST /api/v1/orders/:id/status` - Change status
//! - `POST /api/v1/orders/:id/advance` - Next pipeline step
//! - `GET /api/v1/queue` - Public queue board
//! - `GET /api/v1/stats` - Revenue and counts
//! - `GET /api/v1/notifications` - Active notifications
//!
//! ## Assistant
//! - `GET /api/v1/assistant` - Transcript
//! - `POST /api/v1/assistant` - Ask a question
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws` - Real-time order, menu and notification events
//!
//! # Example
//!
//! ```rust,ignore
//! use homcha::api::{serve, ApiConfig, AppState};
//! use homcha::kiosk::{Kiosk, KioskConfig};
//! use homcha::store::{LocalStore, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LocalStore::open(&StoreConfig::default())?;
//!     let kiosk = Arc::new(Kiosk::open(KioskConfig::default(), store, None)?);
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(kiosk, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::{SessionId, SESSION_HEADER};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Session routes
        .route("/session", get(routes::session::get_session))
        .route("/session/customer", post(routes::session::enter_as_customer))
        .route("/session/merchant", post(routes::session::merchant_login))
        .route("/session/logout", post(routes::session::logout))
        .route("/session/view", put(routes::session::set_view))
        // Menu routes
        .route(
            "/menu",
            get(routes::menu::list_menu).post(routes::menu::create_menu_item),
        )
        .route(
            "/menu/:id",
            put(routes::menu::update_menu_item).delete(routes::menu::delete_menu_item),
        )
        // Cart routes
        .route("/cart", get(routes::cart::get_cart))
        .route("/cart/items", post(routes::cart::add_item))
        .route(
            "/cart/items/:id",
            patch(routes::cart::update_item).delete(routes::cart::remove_item),
        )
        .route("/cart/customer", put(routes::cart::set_customer))
        // Checkout routes
        .route(
            "/checkout",
            post(routes::checkout::open_payment).delete(routes::checkout::dismiss_payment),
        )
        .route("/checkout/confirm", post(routes::checkout::confirm_payment))
        // Order routes
        .route(
            "/orders",
            get(routes::orders::list_orders).delete(routes::orders::clear_orders),
        )
        .route("/orders/:id", get(routes::orders::get_order))
        .route("/orders/:id/status", post(routes::orders::update_status))
        .route("/orders/:id/advance", post(routes::orders::advance))
        // Board routes
        .route("/queue", get(routes::queue::queue_board))
        .route("/stats", get(routes::queue::stats))
        .route("/notifications", get(routes::queue::notifications))
        // Assistant routes
        .route(
            "/assistant",
            get(routes::assistant::transcript).post(routes::assistant::ask),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::permissive().allow_origin(allowed)
    }
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Homcha API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Homcha API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
