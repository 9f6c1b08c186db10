//! Kiosk
//!
//! The single owner of all live state. The catalog and the order book are
//! shared by every screen; each client gets its own [`Session`] (role, view,
//! cart, payment modal, tracked order) keyed by a session id. All mutations
//! go through one write lock, so they are serialised.
//!
//! The role of the [`DEFAULT_SESSION`] is mirrored to the store, as is every
//! catalog change.
//!
//! # Example
//!
//! ```rust,no_run
//! use homcha::kiosk::{Kiosk, KioskConfig, DEFAULT_SESSION};
//! use homcha::store::{LocalStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LocalStore::open(&StoreConfig::default())?;
//!     let kiosk = Kiosk::open(KioskConfig::default(), store, None)?;
//!
//!     kiosk.enter_as_customer(DEFAULT_SESSION).await?;
//!     kiosk.add_to_cart(DEFAULT_SESSION, "d1").await?;
//!     kiosk.open_payment(DEFAULT_SESSION).await?;
//!     let order = kiosk.confirm_payment(DEFAULT_SESSION).await?;
//!
//!     println!("Your queue number is {}", order.queue_number);
//!     Ok(())
//! }
//! ```

pub mod notifications;
pub mod payment;
pub mod session;

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::assistant::{AskOutcome, ChatAssistant, ChatTurn, LanguageModel};
use crate::shop::{
    default_menu, CartItem, Catalog, Category, MenuItem, MenuItemDraft, Order, OrderBook,
    OrderStatus, Role, SaveOutcome, ShopError, Transition,
};
use crate::store::{LocalStore, StorageError, MENU_KEY, ROLE_KEY};
use crate::websocket::{ConnectionHub, HubConfig, WsEvent};

pub use notifications::{Notification, NotificationCenter};
pub use payment::{PaymentRefusal, PaymentState};
pub use session::{Session, View, DEFAULT_SESSION};

/// Staff password accepted when none is configured
pub const DEFAULT_MERCHANT_PASSWORD: &str = "907264";

/// Runtime settings for the kiosk
#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub merchant_password: String,
    /// Simulated time spent "processing" a QR payment
    pub payment_delay: Duration,
    /// Lifetime of a notification
    pub notification_ttl: Duration,
    pub queue_prefix: String,
    pub restaurant_name: String,
    pub hub: HubConfig,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            merchant_password: DEFAULT_MERCHANT_PASSWORD.to_string(),
            payment_delay: Duration::from_millis(1500),
            notification_ttl: Duration::from_millis(5000),
            queue_prefix: "A".to_string(),
            restaurant_name: "บ้านหอมชาพะเยา".to_string(),
            hub: HubConfig::default(),
        }
    }
}

/// Errors returned by kiosk operations
#[derive(Error, Debug)]
pub enum KioskError {
    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The session's role does not allow the action
    #[error("{action} requires role {required}")]
    Forbidden {
        action: &'static str,
        required: Role,
    },

    #[error("รหัสผ่านไม่ถูกต้อง (กรุณาลองใหม่อีกครั้ง)")]
    InvalidPassword,

    #[error("View {view:?} is not available to role {role}")]
    ViewNotAllowed { view: View, role: Role },

    #[error("Payment is already being processed")]
    PaymentInProgress,

    #[error("Payment has not been started")]
    PaymentNotOpen,
}

impl From<PaymentRefusal> for KioskError {
    fn from(refusal: PaymentRefusal) -> Self {
        match refusal {
            PaymentRefusal::InFlight => KioskError::PaymentInProgress,
            PaymentRefusal::NotOpen => KioskError::PaymentNotOpen,
        }
    }
}

pub type KioskResult<T> = Result<T, KioskError>;

/// What a screen needs to render its chrome
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub role: Role,
    pub view: View,
    pub customer_name: String,
    pub cart_items: u32,
    pub payment: PaymentState,
    /// The order this session is waiting on, if any
    pub tracked_order: Option<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: i64,
    pub item_count: u32,
    pub customer_name: String,
    pub payment: PaymentState,
}

/// One entry on the public queue board
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueueTicket {
    pub queue_number: String,
    pub customer_name: String,
    pub status: OrderStatus,
}

impl From<&Order> for QueueTicket {
    fn from(order: &Order) -> Self {
        Self {
            queue_number: order.queue_number.clone(),
            customer_name: order.customer_name.clone(),
            status: order.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueBoard {
    pub ready: Vec<QueueTicket>,
    pub waiting: Vec<QueueTicket>,
}

/// Dashboard figures for staff
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShopStats {
    pub completed_revenue: i64,
    pub completed_orders: usize,
    pub cancelled_orders: usize,
    pub active_orders: usize,
    pub total_orders: usize,
    /// Label the next submitted order will get
    pub next_queue_number: String,
}

struct KioskState {
    catalog: Catalog,
    orders: OrderBook,
    sessions: HashMap<String, Session>,
}

impl KioskState {
    fn session(&self, id: &str) -> Session {
        self.sessions.get(id).cloned().unwrap_or_default()
    }

    /// Creates the session; only for sign-in paths
    fn session_mut(&mut self, id: &str) -> &mut Session {
        self.sessions.entry(id.to_string()).or_default()
    }

    fn info(&self, id: &str) -> SessionInfo {
        let session = self.session(id);
        let tracked_order = session
            .tracked_order_id
            .as_deref()
            .and_then(|order_id| self.orders.get(order_id))
            .cloned();

        SessionInfo {
            session_id: id.to_string(),
            role: session.role,
            view: session.view,
            customer_name: session.customer_name,
            cart_items: session.cart.item_count(),
            payment: session.payment,
            tracked_order,
        }
    }
}

fn cart_view(session: &Session) -> CartView {
    CartView {
        items: session.cart.items().to_vec(),
        total: session.cart.total(),
        item_count: session.cart.item_count(),
        customer_name: session.customer_name.clone(),
        payment: session.payment,
    }
}

fn require(session: &Session, required: Role, action: &'static str) -> KioskResult<()> {
    if session.role == required {
        Ok(())
    } else {
        Err(KioskError::Forbidden { action, required })
    }
}

/// The existing session of `id` if it has the `required` role
///
/// Unknown ids are guests and are refused without being inserted.
fn session_as<'a>(
    sessions: &'a mut HashMap<String, Session>,
    id: &str,
    required: Role,
    action: &'static str,
) -> KioskResult<&'a mut Session> {
    match sessions.get_mut(id) {
        Some(session) if session.role == required => Ok(session),
        _ => Err(KioskError::Forbidden { action, required }),
    }
}

/// The cart is frozen while its payment is processing
fn require_idle(session: &Session) -> KioskResult<()> {
    if session.payment.is_processing() {
        Err(KioskError::PaymentInProgress)
    } else {
        Ok(())
    }
}

/// Reopens the payment modal if the confirming future is dropped before the
/// order is placed
struct PendingPayment {
    state: Arc<RwLock<KioskState>>,
    session_id: String,
    settled: bool,
}

impl Drop for PendingPayment {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        tracing::warn!(session = %self.session_id, "Payment abandoned before it settled");
        let state = Arc::clone(&self.state);
        let session_id = std::mem::take(&mut self.session_id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Some(session) = state.write().await.sessions.get_mut(&session_id) {
                    session.payment.abandon();
                }
            });
        }
    }
}

fn require_signed_in(session: &Session, action: &'static str) -> KioskResult<()> {
    if session.role == Role::Guest {
        Err(KioskError::Forbidden {
            action,
            required: Role::Customer,
        })
    } else {
        Ok(())
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct Kiosk {
    state: Arc<RwLock<KioskState>>,
    store: LocalStore,
    notifications: NotificationCenter,
    assistant: ChatAssistant,
    hub: Arc<ConnectionHub>,
    config: KioskConfig,
}

impl Kiosk {
    /// Restore the catalog and default-session role from `store`
    ///
    /// A missing catalog is seeded and written back; an unreadable one is an
    /// error. `model` is `None` when the assistant has no API key.
    pub fn open(
        config: KioskConfig,
        store: LocalStore,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> KioskResult<Self> {
        let items = match store.load_json::<Vec<MenuItem>>(MENU_KEY)? {
            Some(items) => items,
            None => {
                let seed = default_menu();
                store.save_json(MENU_KEY, &seed)?;
                tracing::info!(items = seed.len(), "Seeded menu catalog");
                seed
            }
        };

        let role = match store.get(ROLE_KEY)? {
            Some(raw) => raw.trim().parse::<Role>().unwrap_or_else(|_| {
                tracing::warn!(role = %raw, "Ignoring unknown persisted role");
                Role::Guest
            }),
            None => Role::Guest,
        };

        let mut sessions = HashMap::new();
        sessions.insert(DEFAULT_SESSION.to_string(), Session::with_role(role));

        let hub = Arc::new(ConnectionHub::new(config.hub.clone()));
        let notifications = NotificationCenter::new(config.notification_ttl, Arc::clone(&hub));
        let assistant = ChatAssistant::new(model, config.restaurant_name.clone());

        tracing::info!(
            items = items.len(),
            role = %role,
            assistant = assistant.is_configured(),
            "Kiosk opened"
        );

        Ok(Self {
            state: Arc::new(RwLock::new(KioskState {
                catalog: Catalog::new(items),
                orders: OrderBook::new(config.queue_prefix.clone()),
                sessions,
            })),
            store,
            notifications,
            assistant,
            hub,
            config,
        })
    }

    pub fn hub(&self) -> &Arc<ConnectionHub> {
        &self.hub
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn assistant(&self) -> &ChatAssistant {
        &self.assistant
    }

    // ---- session ------------------------------------------------------

    pub async fn session_info(&self, session_id: &str) -> SessionInfo {
        self.state.read().await.info(session_id)
    }

    pub async fn enter_as_customer(&self, session_id: &str) -> KioskResult<SessionInfo> {
        let mut state = self.state.write().await;
        state.session_mut(session_id).set_role(Role::Customer);
        self.persist_role(session_id, Role::Customer)?;

        tracing::info!(session = %session_id, "Customer entered");
        Ok(state.info(session_id))
    }

    pub async fn merchant_login(&self, session_id: &str, password: &str) -> KioskResult<SessionInfo> {
        if password != self.config.merchant_password {
            tracing::warn!(session = %session_id, "Rejected merchant login");
            return Err(KioskError::InvalidPassword);
        }

        let mut state = self.state.write().await;
        state.session_mut(session_id).set_role(Role::Merchant);
        self.persist_role(session_id, Role::Merchant)?;

        tracing::info!(session = %session_id, "Merchant logged in");
        Ok(state.info(session_id))
    }

    /// Back to guest; drops the cart, the tracked order and the assistant
    /// transcript
    pub async fn logout(&self, session_id: &str) -> KioskResult<SessionInfo> {
        let mut state = self.state.write().await;
        if session_id == DEFAULT_SESSION {
            state.session_mut(session_id).reset();
            self.store.remove(ROLE_KEY)?;
        } else {
            state.sessions.remove(session_id);
        }
        self.assistant.forget(session_id);

        tracing::info!(session = %session_id, "Logged out");
        Ok(state.info(session_id))
    }

    pub async fn set_view(&self, session_id: &str, view: View) -> KioskResult<SessionInfo> {
        let mut state = self.state.write().await;
        let role = state.session(session_id).role;
        if !view.selectable_by(role) {
            return Err(KioskError::ViewNotAllowed { view, role });
        }
        // guests select nothing, so the session exists here
        if let Some(session) = state.sessions.get_mut(session_id) {
            session.view = view;
        }
        Ok(state.info(session_id))
    }

    fn persist_role(&self, session_id: &str, role: Role) -> KioskResult<()> {
        if session_id == DEFAULT_SESSION {
            self.store.set(ROLE_KEY, role.as_str())?;
        }
        Ok(())
    }

    // ---- catalog ------------------------------------------------------

    pub async fn menu(&self, session_id: &str, category: Option<Category>) -> KioskResult<Vec<MenuItem>> {
        let state = self.state.read().await;
        require_signed_in(&state.session(session_id), "Viewing the menu")?;
        Ok(state.catalog.list(category).into_iter().cloned().collect())
    }

    /// Create or replace a menu item and persist the catalog
    ///
    /// A draft carrying an id must name an existing item.
    pub async fn save_menu_item(
        &self,
        session_id: &str,
        draft: MenuItemDraft,
    ) -> KioskResult<(MenuItem, SaveOutcome)> {
        let mut state = self.state.write().await;
        require(&state.session(session_id), Role::Merchant, "Editing the menu")?;

        if let Some(id) = draft.id.as_deref() {
            if state.catalog.get(id).is_none() {
                return Err(ShopError::MenuItemNotFound(id.to_string()).into());
            }
        }

        let (item, outcome) = state.catalog.save(draft, now_ms())?;
        self.store.save_json(MENU_KEY, state.catalog.items())?;
        self.hub.publish(WsEvent::menu_updated(state.catalog.len()));

        tracing::info!(item_id = %item.id, outcome = ?outcome, "Menu item saved");
        Ok((item, outcome))
    }

    pub async fn delete_menu_item(&self, session_id: &str, item_id: &str) -> KioskResult<MenuItem> {
        let mut state = self.state.write().await;
        require(&state.session(session_id), Role::Merchant, "Editing the menu")?;

        let item = state.catalog.delete(item_id)?;
        self.store.save_json(MENU_KEY, state.catalog.items())?;
        self.hub.publish(WsEvent::menu_updated(state.catalog.len()));

        tracing::info!(item_id = %item.id, "Menu item deleted");
        Ok(item)
    }

    // ---- cart ---------------------------------------------------------

    pub async fn cart(&self, session_id: &str) -> KioskResult<CartView> {
        let state = self.state.read().await;
        let session = state.session(session_id);
        require(&session, Role::Customer, "Viewing the cart")?;
        Ok(cart_view(&session))
    }

    pub async fn add_to_cart(&self, session_id: &str, item_id: &str) -> KioskResult<CartView> {
        let mut guard = self.state.write().await;
        let KioskState {
            catalog, sessions, ..
        } = &mut *guard;

        let session = session_as(sessions, session_id, Role::Customer, "Ordering")?;
        require_idle(session)?;

        let item = catalog
            .get(item_id)
            .ok_or_else(|| ShopError::MenuItemNotFound(item_id.to_string()))?;
        session.cart.add(item);
        Ok(cart_view(session))
    }

    /// Adjust quantity by `delta` and/or replace the notes of a cart line
    pub async fn update_cart_item(
        &self,
        session_id: &str,
        item_id: &str,
        delta: Option<i64>,
        notes: Option<String>,
    ) -> KioskResult<CartView> {
        let mut state = self.state.write().await;
        let session = session_as(&mut state.sessions, session_id, Role::Customer, "Ordering")?;
        require_idle(session)?;

        if let Some(delta) = delta {
            session.cart.update_quantity(item_id, delta)?;
        }
        if let Some(notes) = notes {
            session.cart.update_notes(item_id, notes)?;
        }
        Ok(cart_view(session))
    }

    pub async fn remove_from_cart(&self, session_id: &str, item_id: &str) -> KioskResult<CartView> {
        let mut state = self.state.write().await;
        let session = session_as(&mut state.sessions, session_id, Role::Customer, "Ordering")?;
        require_idle(session)?;

        session.cart.remove(item_id)?;
        Ok(cart_view(session))
    }

    pub async fn set_customer_name(&self, session_id: &str, name: &str) -> KioskResult<CartView> {
        let mut state = self.state.write().await;
        let session = session_as(&mut state.sessions, session_id, Role::Customer, "Ordering")?;
        require_idle(session)?;

        session.customer_name = name.to_string();
        Ok(cart_view(session))
    }

    // ---- payment ------------------------------------------------------

    /// Show the QR payment modal for the current cart
    pub async fn open_payment(&self, session_id: &str) -> KioskResult<CartView> {
        let mut state = self.state.write().await;
        let session = session_as(&mut state.sessions, session_id, Role::Customer, "Checkout")?;

        if session.cart.is_empty() {
            return Err(ShopError::EmptyCart.into());
        }
        session.payment.open()?;
        Ok(cart_view(session))
    }

    pub async fn dismiss_payment(&self, session_id: &str) -> KioskResult<CartView> {
        let mut state = self.state.write().await;
        let session = session_as(&mut state.sessions, session_id, Role::Customer, "Checkout")?;

        session.payment.dismiss()?;
        Ok(cart_view(session))
    }

    /// Simulate the payment and turn the cart into an order
    ///
    /// The lock is released while the payment "processes"; the processing
    /// flag keeps a second confirmation and cart edits out. If the returned
    /// future is dropped before the order is placed, the modal reopens.
    pub async fn confirm_payment(&self, session_id: &str) -> KioskResult<Order> {
        {
            let mut state = self.state.write().await;
            let session = session_as(&mut state.sessions, session_id, Role::Customer, "Checkout")?;
            if session.cart.is_empty() {
                return Err(ShopError::EmptyCart.into());
            }
            session.payment.begin()?;
        }
        let mut pending = PendingPayment {
            state: Arc::clone(&self.state),
            session_id: session_id.to_string(),
            settled: false,
        };

        tracing::debug!(session = %session_id, delay_ms = self.config.payment_delay.as_millis() as u64, "Processing payment");
        tokio::time::sleep(self.config.payment_delay).await;

        let order = {
            let mut guard = self.state.write().await;
            let KioskState {
                orders, sessions, ..
            } = &mut *guard;

            pending.settled = true;

            let session = match sessions.get_mut(session_id) {
                Some(session) if session.payment.is_processing() => session,
                _ => {
                    tracing::info!(session = %session_id, "Signed out before the payment settled");
                    return Err(KioskError::PaymentNotOpen);
                }
            };
            session.payment.finish();

            let order = orders.submit(session.cart.items().to_vec(), &session.customer_name, now_ms())?;
            session.tracked_order_id = Some(order.id.clone());
            session.cart.clear();
            session.view = View::QueueStatus;
            order
        };

        tracing::info!(
            order_id = %order.id,
            queue = %order.queue_number,
            total = order.total_price,
            "Order placed"
        );
        self.hub.publish(WsEvent::order_placed(&order));
        self.notifications
            .notify(format!(
                "ออร์เดอร์ของ {} (คิว {}) ได้รับแล้ว",
                order.customer_name, order.queue_number
            ))
            .await;

        Ok(order)
    }

    // ---- orders -------------------------------------------------------

    /// Non-terminal orders, newest first
    pub async fn active_orders(&self, session_id: &str) -> KioskResult<Vec<Order>> {
        let state = self.state.read().await;
        require(&state.session(session_id), Role::Merchant, "Viewing orders")?;
        Ok(state.orders.active().into_iter().cloned().collect())
    }

    pub async fn order(&self, session_id: &str, order_id: &str) -> KioskResult<Order> {
        let state = self.state.read().await;
        require_signed_in(&state.session(session_id), "Viewing an order")?;
        state
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| ShopError::OrderNotFound(order_id.to_string()).into())
    }

    pub async fn update_order_status(
        &self,
        session_id: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> KioskResult<Order> {
        self.change_order(session_id, |orders| orders.transition(order_id, status))
            .await
    }

    /// Move an order one step along the main pipeline
    pub async fn advance_order(&self, session_id: &str, order_id: &str) -> KioskResult<Order> {
        self.change_order(session_id, |orders| orders.advance(order_id))
            .await
    }

    async fn change_order<F>(&self, session_id: &str, change: F) -> KioskResult<Order>
    where
        F: FnOnce(&mut OrderBook) -> Result<Transition, ShopError>,
    {
        let Transition { order, from } = {
            let mut state = self.state.write().await;
            require(&state.session(session_id), Role::Merchant, "Updating orders")?;

            let transition = change(&mut state.orders)?;
            for (id, session) in state.sessions.iter_mut() {
                if session.observe(&transition.order) {
                    tracing::debug!(session = %id, view = ?session.view, "Tracked order finished");
                }
            }
            transition
        };

        tracing::info!(
            order_id = %order.id,
            queue = %order.queue_number,
            from = %from,
            to = %order.status,
            "Order status changed"
        );
        self.hub.publish(WsEvent::order_status(&order, from));

        let message = match order.status {
            OrderStatus::Ready => Some(format!("คิว {} พร้อมเสิร์ฟแล้ว!", order.queue_number)),
            OrderStatus::Completed => Some(format!("ออร์เดอร์ {} จัดส่งเรียบร้อยแล้ว", order.queue_number)),
            OrderStatus::Cancelled => Some(format!("ออร์เดอร์ {} ถูกปฏิเสธ (ยกเลิกแล้ว)", order.queue_number)),
            OrderStatus::Pending | OrderStatus::Preparing => None,
        };
        if let Some(message) = message {
            self.notifications.notify(message).await;
        }

        Ok(order)
    }

    /// Remove every order and restart queue numbering
    pub async fn clear_orders(&self, session_id: &str) -> KioskResult<usize> {
        let removed = {
            let mut state = self.state.write().await;
            require(&state.session(session_id), Role::Merchant, "Resetting orders")?;
            state.orders.clear()
        };

        tracing::info!(removed, "Orders cleared");
        self.hub.publish(WsEvent::orders_cleared(removed));
        self.notifications.notify("ล้างรายการออร์เดอร์ทั้งหมดแล้ว").await;
        Ok(removed)
    }

    pub async fn queue_board(&self, session_id: &str) -> KioskResult<QueueBoard> {
        let state = self.state.read().await;
        require_signed_in(&state.session(session_id), "Viewing the queue")?;
        Ok(QueueBoard {
            ready: state.orders.ready().into_iter().map(QueueTicket::from).collect(),
            waiting: state.orders.waiting().into_iter().map(QueueTicket::from).collect(),
        })
    }

    pub async fn stats(&self, session_id: &str) -> KioskResult<ShopStats> {
        let state = self.state.read().await;
        require(&state.session(session_id), Role::Merchant, "Viewing statistics")?;

        let orders = &state.orders;
        Ok(ShopStats {
            completed_revenue: orders.completed_revenue(),
            completed_orders: orders.with_status(OrderStatus::Completed).len(),
            cancelled_orders: orders.with_status(OrderStatus::Cancelled).len(),
            active_orders: orders.active().len(),
            total_orders: orders.len(),
            next_queue_number: crate::shop::queue_label(orders.queue_prefix(), orders.next_queue_no()),
        })
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.active().await
    }

    // ---- assistant ----------------------------------------------------

    /// Ask the assistant about the current menu
    pub async fn ask_assistant(&self, session_id: &str, message: &str) -> KioskResult<AskOutcome> {
        let menu = {
            let state = self.state.read().await;
            require_signed_in(&state.session(session_id), "Asking the assistant")?;
            state.catalog.render_for_prompt()
        };
        Ok(self.assistant.ask(session_id, message, &menu).await)
    }

    pub async fn transcript(&self, session_id: &str) -> KioskResult<Vec<ChatTurn>> {
        {
            let state = self.state.read().await;
            require_signed_in(&state.session(session_id), "Asking the assistant")?;
        }
        Ok(self.assistant.transcript(session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use tempfile::TempDir;

    const GUEST: &str = "guest-tab";
    const CUSTOMER: &str = "phone-1";
    const STAFF: &str = "counter";

    fn test_config() -> KioskConfig {
        KioskConfig {
            payment_delay: Duration::from_millis(20),
            notification_ttl: Duration::from_millis(200),
            ..KioskConfig::default()
        }
    }

    fn open_in(dir: &TempDir) -> Kiosk {
        let store = LocalStore::open(&StoreConfig::new(dir.path())).unwrap();
        Kiosk::open(test_config(), store, None).unwrap()
    }

    async fn ready_kiosk(dir: &TempDir) -> Kiosk {
        let kiosk = open_in(dir);
        kiosk.enter_as_customer(CUSTOMER).await.unwrap();
        kiosk.merchant_login(STAFF, DEFAULT_MERCHANT_PASSWORD).await.unwrap();
        kiosk
    }

    async fn place_order(kiosk: &Kiosk) -> Order {
        kiosk.add_to_cart(CUSTOMER, "d1").await.unwrap();
        kiosk.open_payment(CUSTOMER).await.unwrap();
        kiosk.confirm_payment(CUSTOMER).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_start_seeds_catalog() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;

        assert_eq!(kiosk.menu(CUSTOMER, None).await.unwrap().len(), 6);
        let stored: Vec<MenuItem> = kiosk.store().load_json(MENU_KEY).unwrap().unwrap();
        assert_eq!(stored.len(), 6);
    }

    #[tokio::test]
    async fn test_role_and_catalog_survive_restart() {
        let dir = TempDir::new().unwrap();
        {
            let kiosk = open_in(&dir);
            kiosk
                .merchant_login(DEFAULT_SESSION, DEFAULT_MERCHANT_PASSWORD)
                .await
                .unwrap();
            kiosk
                .save_menu_item(
                    DEFAULT_SESSION,
                    MenuItemDraft {
                        id: None,
                        name: "Mango sticky rice".to_string(),
                        price: 80,
                        category: Category::Dessert,
                        description: String::new(),
                        image: String::new(),
                    },
                )
                .await
                .unwrap();
        }

        let kiosk = open_in(&dir);
        let info = kiosk.session_info(DEFAULT_SESSION).await;
        assert_eq!(info.role, Role::Merchant);
        assert_eq!(info.view, View::Merchant);
        assert_eq!(kiosk.menu(DEFAULT_SESSION, None).await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_logout_forgets_role() {
        let dir = TempDir::new().unwrap();
        let kiosk = open_in(&dir);
        kiosk.enter_as_customer(DEFAULT_SESSION).await.unwrap();
        kiosk.add_to_cart(DEFAULT_SESSION, "f1").await.unwrap();

        let info = kiosk.logout(DEFAULT_SESSION).await.unwrap();
        assert_eq!(info.role, Role::Guest);
        assert_eq!(info.cart_items, 0);
        assert!(kiosk.store().get(ROLE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let dir = TempDir::new().unwrap();
        let kiosk = open_in(&dir);

        let err = kiosk.merchant_login(STAFF, "000000").await.unwrap_err();
        assert!(matches!(err, KioskError::InvalidPassword));
        assert_eq!(err.to_string(), "รหัสผ่านไม่ถูกต้อง (กรุณาลองใหม่อีกครั้ง)");
        assert_eq!(kiosk.session_info(STAFF).await.role, Role::Guest);
    }

    #[tokio::test]
    async fn test_role_gates() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;

        assert!(matches!(
            kiosk.menu(GUEST, None).await,
            Err(KioskError::Forbidden { .. })
        ));
        assert!(matches!(
            kiosk.add_to_cart(STAFF, "d1").await,
            Err(KioskError::Forbidden { .. })
        ));
        assert!(matches!(
            kiosk.clear_orders(CUSTOMER).await,
            Err(KioskError::Forbidden { .. })
        ));
        assert!(matches!(
            kiosk.delete_menu_item(CUSTOMER, "d1").await,
            Err(KioskError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_item_cannot_be_added() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;

        let err = kiosk.add_to_cart(CUSTOMER, "nope").await.unwrap_err();
        assert!(matches!(err, KioskError::Shop(ShopError::MenuItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_checkout_places_order() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        kiosk.set_customer_name(CUSTOMER, "Nok").await.unwrap();
        kiosk.add_to_cart(CUSTOMER, "d1").await.unwrap();
        kiosk.add_to_cart(CUSTOMER, "d1").await.unwrap();

        kiosk.open_payment(CUSTOMER).await.unwrap();
        let order = kiosk.confirm_payment(CUSTOMER).await.unwrap();

        assert_eq!(order.queue_number, "A001");
        assert_eq!(order.customer_name, "Nok");
        assert_eq!(order.items[0].quantity, 2);

        let info = kiosk.session_info(CUSTOMER).await;
        assert_eq!(info.view, View::QueueStatus);
        assert_eq!(info.cart_items, 0);
        assert_eq!(info.payment, PaymentState::Closed);
        assert_eq!(info.tracked_order.map(|o| o.id), Some(order.id));

        let notes = kiosk.notifications().await;
        assert_eq!(notes[0].message, "ออร์เดอร์ของ Nok (คิว A001) ได้รับแล้ว");
    }

    #[tokio::test]
    async fn test_checkout_requires_items_and_open_modal() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;

        assert!(matches!(
            kiosk.open_payment(CUSTOMER).await,
            Err(KioskError::Shop(ShopError::EmptyCart))
        ));

        kiosk.add_to_cart(CUSTOMER, "d1").await.unwrap();
        assert!(matches!(
            kiosk.confirm_payment(CUSTOMER).await,
            Err(KioskError::PaymentNotOpen)
        ));
    }

    #[tokio::test]
    async fn test_second_confirm_is_rejected() {
        let dir = TempDir::new().unwrap();
        let kiosk = Arc::new(ready_kiosk(&dir).await);
        kiosk.add_to_cart(CUSTOMER, "d1").await.unwrap();
        kiosk.open_payment(CUSTOMER).await.unwrap();

        let first = {
            let kiosk = Arc::clone(&kiosk);
            tokio::spawn(async move { kiosk.confirm_payment(CUSTOMER).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(matches!(
            kiosk.confirm_payment(CUSTOMER).await,
            Err(KioskError::PaymentInProgress)
        ));
        assert!(matches!(
            kiosk.dismiss_payment(CUSTOMER).await,
            Err(KioskError::PaymentInProgress)
        ));

        first.await.unwrap().unwrap();
        assert_eq!(kiosk.stats(STAFF).await.unwrap().total_orders, 1);
    }

    #[tokio::test]
    async fn test_completion_moves_customer_to_complete_view() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        let order = place_order(&kiosk).await;

        for status in [OrderStatus::Preparing, OrderStatus::Ready] {
            kiosk.update_order_status(STAFF, &order.id, status).await.unwrap();
        }
        assert_eq!(kiosk.session_info(CUSTOMER).await.view, View::QueueStatus);

        kiosk.advance_order(STAFF, &order.id).await.unwrap();
        let info = kiosk.session_info(CUSTOMER).await;
        assert_eq!(info.view, View::OrderComplete);
        assert!(info.tracked_order.is_none());

        let messages: Vec<String> = kiosk
            .notifications()
            .await
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert!(messages.contains(&"คิว A001 พร้อมเสิร์ฟแล้ว!".to_string()));
        assert!(messages.contains(&"ออร์เดอร์ A001 จัดส่งเรียบร้อยแล้ว".to_string()));
    }

    #[tokio::test]
    async fn test_cancellation_moves_customer_to_rejected_view() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        let order = place_order(&kiosk).await;

        kiosk
            .update_order_status(STAFF, &order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(kiosk.session_info(CUSTOMER).await.view, View::OrderRejected);
    }

    #[tokio::test]
    async fn test_backward_transition_rejected() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        let order = place_order(&kiosk).await;

        kiosk
            .update_order_status(STAFF, &order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        let err = kiosk
            .update_order_status(STAFF, &order.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, KioskError::Shop(ShopError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_clear_resets_queue_numbers() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        place_order(&kiosk).await;
        place_order(&kiosk).await;

        assert_eq!(kiosk.clear_orders(STAFF).await.unwrap(), 2);
        assert_eq!(kiosk.stats(STAFF).await.unwrap().next_queue_number, "A001");
        assert_eq!(place_order(&kiosk).await.queue_number, "A001");
    }

    #[tokio::test]
    async fn test_revenue_ignores_later_price_edits() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        let order = place_order(&kiosk).await;

        let tea = kiosk
            .menu(STAFF, None)
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.id == "d1")
            .unwrap();
        kiosk
            .save_menu_item(
                STAFF,
                MenuItemDraft {
                    id: Some(tea.id.clone()),
                    name: tea.name.clone(),
                    price: tea.price * 10,
                    category: tea.category,
                    description: tea.description.clone(),
                    image: tea.image.clone(),
                },
            )
            .await
            .unwrap();

        for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
            kiosk.update_order_status(STAFF, &order.id, status).await.unwrap();
        }
        assert_eq!(kiosk.stats(STAFF).await.unwrap().completed_revenue, tea.price);
    }

    #[tokio::test]
    async fn test_queue_board() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        let first = place_order(&kiosk).await;
        place_order(&kiosk).await;

        for status in [OrderStatus::Preparing, OrderStatus::Ready] {
            kiosk.update_order_status(STAFF, &first.id, status).await.unwrap();
        }

        let board = kiosk.queue_board(CUSTOMER).await.unwrap();
        assert_eq!(board.ready.len(), 1);
        assert_eq!(board.ready[0].queue_number, "A001");
        assert_eq!(board.waiting.len(), 1);
        assert_eq!(board.waiting[0].queue_number, "A002");
    }

    #[tokio::test]
    async fn test_assistant_without_key_answers_with_fallback() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;

        match kiosk.ask_assistant(CUSTOMER, "มีชาไทยไหม").await.unwrap() {
            AskOutcome::Answered(turn) => {
                assert_eq!(turn.text, crate::assistant::FALLBACK_REPLY)
            }
            other => panic!("Expected answer, got {:?}", other),
        }
        assert_eq!(kiosk.transcript(CUSTOMER).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_view_switching() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;

        let info = kiosk.set_view(CUSTOMER, View::QueueStatus).await.unwrap();
        assert_eq!(info.view, View::QueueStatus);
        assert!(matches!(
            kiosk.set_view(CUSTOMER, View::Merchant).await,
            Err(KioskError::ViewNotAllowed { .. })
        ));
    }

    #[tokio::test]
    async fn test_abandoned_confirm_reopens_payment() {
        let dir = TempDir::new().unwrap();
        let kiosk = Arc::new(ready_kiosk(&dir).await);
        kiosk.add_to_cart(CUSTOMER, "d1").await.unwrap();
        kiosk.open_payment(CUSTOMER).await.unwrap();

        let confirm = {
            let kiosk = Arc::clone(&kiosk);
            tokio::spawn(async move { kiosk.confirm_payment(CUSTOMER).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(kiosk.session_info(CUSTOMER).await.payment, PaymentState::Processing);

        confirm.abort();
        assert!(confirm.await.unwrap_err().is_cancelled());
        tokio::time::sleep(Duration::from_millis(40)).await;

        let info = kiosk.session_info(CUSTOMER).await;
        assert_eq!(info.payment, PaymentState::Open);
        assert_eq!(info.cart_items, 1);
        assert_eq!(kiosk.stats(STAFF).await.unwrap().total_orders, 0);

        // the customer can pay again
        let order = kiosk.confirm_payment(CUSTOMER).await.unwrap();
        assert_eq!(order.queue_number, "A001");
    }

    #[tokio::test]
    async fn test_cart_is_frozen_while_payment_processes() {
        let dir = TempDir::new().unwrap();
        let kiosk = Arc::new(ready_kiosk(&dir).await);
        let charged = kiosk.add_to_cart(CUSTOMER, "d1").await.unwrap().total;
        kiosk.open_payment(CUSTOMER).await.unwrap();

        let confirm = {
            let kiosk = Arc::clone(&kiosk);
            tokio::spawn(async move { kiosk.confirm_payment(CUSTOMER).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(matches!(
            kiosk.add_to_cart(CUSTOMER, "f2").await,
            Err(KioskError::PaymentInProgress)
        ));
        assert!(matches!(
            kiosk.update_cart_item(CUSTOMER, "d1", Some(3), None).await,
            Err(KioskError::PaymentInProgress)
        ));
        assert!(matches!(
            kiosk.remove_from_cart(CUSTOMER, "d1").await,
            Err(KioskError::PaymentInProgress)
        ));
        assert!(matches!(
            kiosk.set_customer_name(CUSTOMER, "Somchai").await,
            Err(KioskError::PaymentInProgress)
        ));

        let order = confirm.await.unwrap().unwrap();
        assert_eq!(order.total_price, charged);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_refused_requests_do_not_create_sessions() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        let before = kiosk.state.read().await.sessions.len();

        for n in 0..50 {
            let id = format!("stranger-{}", n);
            assert!(kiosk.add_to_cart(&id, "d1").await.is_err());
            assert!(kiosk.update_cart_item(&id, "d1", Some(1), None).await.is_err());
            assert!(kiosk.remove_from_cart(&id, "d1").await.is_err());
            assert!(kiosk.set_customer_name(&id, "x").await.is_err());
            assert!(kiosk.open_payment(&id).await.is_err());
            assert!(kiosk.dismiss_payment(&id).await.is_err());
            assert!(kiosk.confirm_payment(&id).await.is_err());
            assert!(kiosk.set_view(&id, View::Customer).await.is_err());
            assert!(kiosk.ask_assistant(&id, "hello").await.is_err());
        }

        assert_eq!(kiosk.state.read().await.sessions.len(), before);
        assert_eq!(kiosk.session_info("stranger-0").await.role, Role::Guest);
    }

    #[tokio::test]
    async fn test_assistant_transcripts_are_per_session() {
        let dir = TempDir::new().unwrap();
        let kiosk = ready_kiosk(&dir).await;
        kiosk.enter_as_customer("phone-2").await.unwrap();

        kiosk.ask_assistant(CUSTOMER, "my question").await.unwrap();
        assert_eq!(kiosk.transcript(CUSTOMER).await.unwrap().len(), 2);
        assert!(kiosk.transcript("phone-2").await.unwrap().is_empty());

        kiosk.logout(CUSTOMER).await.unwrap();
        kiosk.enter_as_customer(CUSTOMER).await.unwrap();
        assert!(kiosk.transcript(CUSTOMER).await.unwrap().is_empty());
    }
}
