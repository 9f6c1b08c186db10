//! Shop Domain
//!
//! Plain, synchronous domain logic with no I/O:
//!
//! - **types**: Menu items, cart lines, orders and their status pipeline
//! - **catalog**: Staff-edited menu
//! - **cart**: The customer's pending selection
//! - **orders**: Submitted orders and the queue counter
//! - **seed**: Catalog used on first start
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use homcha::shop::{Cart, Category, MenuItem, OrderBook, OrderStatus};
//!
//! let tea = MenuItem::new("d1", "Thai tea", 45, Category::Drink);
//!
//! let mut cart = Cart::new();
//! cart.add(&tea);
//! cart.add(&tea);
//! assert_eq!(cart.total(), 90);
//!
//! let mut book = OrderBook::new("A");
//! let order = book.submit(cart.items().to_vec(), "Nok", 0).unwrap();
//! assert_eq!(order.queue_number, "A001");
//!
//! book.transition(&order.id, OrderStatus::Preparing).unwrap();
//! assert!(book.transition(&order.id, OrderStatus::Pending).is_err());
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod orders;
pub mod seed;
pub mod types;

pub use cart::Cart;
pub use catalog::{Catalog, MenuItemDraft, SaveOutcome};
pub use error::{ShopError, ShopResult};
pub use orders::{OrderBook, Transition, DEFAULT_CUSTOMER_NAME, INITIAL_QUEUE_NO};
pub use seed::default_menu;
pub use types::{queue_label, queue_sequence, CartItem, Category, MenuItem, Order, OrderStatus, Role};
