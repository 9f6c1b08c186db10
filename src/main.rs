//! Homcha Server
//!
//! Run with: cargo run --bin homcha
//!
//! # Configuration
//!
//! Read from `HOMCHA_CONFIG` when set, otherwise from the first of
//! `<config_dir>/homcha/config.toml`, `/etc/homcha/config.toml` and
//! `./config.toml` that exists. Environment variables override the file:
//! - `HOMCHA_DATA_DIR`: Where the menu and role are persisted
//! - `HOMCHA_API_HOST` / `HOMCHA_API_PORT`: Bind address (default: 0.0.0.0:8090)
//! - `HOMCHA_MERCHANT_PASSWORD`: Staff login password
//! - `API_KEY`: Generative-language API key (the assistant apologises without it)
//! - `HOMCHA_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Log filter (default: homcha=info,tower_http=debug)

use homcha::api::{serve, AppState};
use homcha::assistant::{GenerativeClient, LanguageModel};
use homcha::config::{Config, LoggingConfig};
use homcha::kiosk::Kiosk;
use homcha::store::LocalStore;
use homcha::websocket::WsEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("HOMCHA_CONFIG") {
        Ok(path) => Config::load_with_env(&PathBuf::from(path))?,
        Err(_) => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting Homcha server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.store.data_dir);

    let store = LocalStore::open(&config.store_config())?;

    let model: Option<Arc<dyn LanguageModel>> = match config.assistant_config() {
        Some(assistant_config) => {
            tracing::info!(model = %assistant_config.model, "Menu assistant enabled");
            Some(Arc::new(GenerativeClient::new(assistant_config)?))
        }
        None => {
            tracing::info!("Menu assistant disabled (set API_KEY to enable)");
            None
        }
    };

    let kiosk = Arc::new(Kiosk::open(config.kiosk_config(), store, model)?);
    kiosk.hub().publish(WsEvent::system("Kiosk opened"));

    let api_config = config.api_config();
    tracing::info!("Starting server on {}", api_config.addr());
    serve(AppState::new(Arc::clone(&kiosk), api_config.clone()), &api_config).await?;

    kiosk.hub().publish(WsEvent::system("Kiosk closing"));
    tracing::info!("Homcha server stopped");

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("homcha={},tower_http=debug", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
