//! API Routes
//!
//! Route handlers organized by functionality.

pub mod assistant;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod menu;
pub mod orders;
pub mod queue;
pub mod session;
