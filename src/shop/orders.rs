//! Order Book
//!
//! Holds the session's orders and the queue counter. Orders are created from
//! a cart snapshot, change only through the status pipeline, and are removed
//! only by the bulk reset.

use crate::shop::error::{ShopError, ShopResult};
use crate::shop::types::{queue_label, CartItem, Order, OrderStatus};

/// First queue number handed out after startup or a reset
pub const INITIAL_QUEUE_NO: u32 = 1;

/// Default label for orders submitted without a customer name
pub const DEFAULT_CUSTOMER_NAME: &str = "ลูกค้าทั่วไป";

/// Result of a status change
#[derive(Debug, Clone)]
pub struct Transition {
    pub order: Order,
    pub from: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct OrderBook {
    orders: Vec<Order>,
    next_queue_no: u32,
    queue_prefix: String,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new("A")
    }
}

impl OrderBook {
    pub fn new(queue_prefix: impl Into<String>) -> Self {
        Self {
            orders: Vec::new(),
            next_queue_no: INITIAL_QUEUE_NO,
            queue_prefix: queue_prefix.into(),
        }
    }

    pub fn next_queue_no(&self) -> u32 {
        self.next_queue_no
    }

    pub fn queue_prefix(&self) -> &str {
        &self.queue_prefix
    }

    /// Create a PENDING order from a cart snapshot
    ///
    /// The total is computed here once and never recomputed.
    pub fn submit(
        &mut self,
        items: Vec<CartItem>,
        customer_name: &str,
        created_at: i64,
    ) -> ShopResult<Order> {
        if items.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let customer_name = match customer_name.trim() {
            "" => DEFAULT_CUSTOMER_NAME.to_string(),
            name => name.to_string(),
        };

        let order = Order {
            id: generate_order_id(),
            queue_number: queue_label(&self.queue_prefix, self.next_queue_no),
            total_price: items.iter().map(CartItem::line_total).sum(),
            items,
            status: OrderStatus::Pending,
            created_at,
            customer_name,
        };

        self.next_queue_no += 1;
        self.orders.push(order.clone());
        Ok(order)
    }

    /// Move an order to `next` if the pipeline allows it
    pub fn transition(&mut self, id: &str, next: OrderStatus) -> ShopResult<Transition> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| ShopError::OrderNotFound(id.to_string()))?;

        let from = order.status;
        if !from.can_transition_to(next) {
            return Err(ShopError::InvalidTransition {
                order_id: id.to_string(),
                from,
                to: next,
            });
        }

        order.status = next;
        Ok(Transition {
            order: order.clone(),
            from,
        })
    }

    /// Take the forward step along the main pipeline
    pub fn advance(&mut self, id: &str) -> ShopResult<Transition> {
        let current = self
            .get(id)
            .map(|o| o.status)
            .ok_or_else(|| ShopError::OrderNotFound(id.to_string()))?;

        match current.next() {
            Some(next) => self.transition(id, next),
            None => Err(ShopError::InvalidTransition {
                order_id: id.to_string(),
                from: current,
                to: current,
            }),
        }
    }

    /// Drop every order and restart the queue counter
    pub fn clear(&mut self) -> usize {
        let removed = self.orders.len();
        self.orders.clear();
        self.next_queue_no = INITIAL_QUEUE_NO;
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Non-terminal orders, newest first
    pub fn active(&self) -> Vec<&Order> {
        let mut active: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| o.status.is_active())
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active
    }

    pub fn with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status == status).collect()
    }

    /// Orders ready for pickup
    pub fn ready(&self) -> Vec<&Order> {
        self.with_status(OrderStatus::Ready)
    }

    /// Orders still being worked on (PENDING or PREPARING)
    pub fn waiting(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::Preparing))
            .collect()
    }

    /// Σ total of COMPLETED orders
    pub fn completed_revenue(&self) -> i64 {
        self.with_status(OrderStatus::Completed)
            .iter()
            .map(|o| o.total_price)
            .sum()
    }
}

/// Random 9-character base-36 order id
fn generate_order_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(9);
    for _ in 0..9 {
        id.push(ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    id
}
