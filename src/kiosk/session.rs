//! Per-client session state
//!
//! What one screen sees: its role, the current view, the cart, and the order
//! it is waiting for.

use serde::{Deserialize, Serialize};

use crate::kiosk::payment::PaymentState;
use crate::shop::{Cart, Order, OrderStatus, Role};

/// Session id used when a request names none; its role is persisted
pub const DEFAULT_SESSION: &str = "kiosk";

/// Screen currently shown to a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// Menu and cart
    Customer,
    /// Staff dashboard
    Merchant,
    /// The customer's ticket and the public queue board
    QueueStatus,
    /// The tracked order was handed over
    OrderComplete,
    /// The tracked order was cancelled by staff
    OrderRejected,
}

impl View {
    /// Landing view for a role
    pub fn home(role: Role) -> Self {
        match role {
            Role::Merchant => View::Merchant,
            Role::Guest | Role::Customer => View::Customer,
        }
    }

    /// Views a user can navigate to themselves
    pub fn selectable_by(self, role: Role) -> bool {
        match role {
            Role::Guest => false,
            Role::Customer => matches!(self, View::Customer | View::QueueStatus),
            Role::Merchant => matches!(self, View::Merchant | View::Customer),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub role: Role,
    pub view: View,
    pub cart: Cart,
    pub customer_name: String,
    /// Order this session placed and is waiting on
    pub tracked_order_id: Option<String>,
    pub payment: PaymentState,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_role(Role::Guest)
    }
}

impl Session {
    pub fn with_role(role: Role) -> Self {
        Self {
            role,
            view: View::home(role),
            cart: Cart::new(),
            customer_name: String::new(),
            tracked_order_id: None,
            payment: PaymentState::Closed,
        }
    }

    /// Switch role and land on its home view
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.view = View::home(role);
    }

    /// Back to guest; the cart and tracked order are dropped
    pub fn reset(&mut self) {
        *self = Self::with_role(Role::Guest);
    }

    /// React to a change in an order's status
    ///
    /// When the tracked order of a customer session completes or is
    /// cancelled, the session moves to the matching view and forgets the
    /// cart and the order. Returns true if the session changed.
    pub fn observe(&mut self, order: &Order) -> bool {
        if self.role != Role::Customer || self.tracked_order_id.as_deref() != Some(order.id.as_str()) {
            return false;
        }

        let view = match order.status {
            OrderStatus::Completed => View::OrderComplete,
            OrderStatus::Cancelled => View::OrderRejected,
            _ => return false,
        };

        self.view = view;
        self.cart.clear();
        self.tracked_order_id = None;
        true
    }
}
