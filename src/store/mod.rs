//! Persisted Settings
//!
//! A tiny key-value store standing in for browser local storage. Two keys
//! are used: the menu catalog snapshot and the current role.

pub mod error;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use local::{LocalStore, StoreConfig, MENU_KEY, ROLE_KEY};
