//! Boutique Cart - Persisted shopping cart core.
//!
//! The cart holds the shopper's selected line items, keeps quantities within
//! each inventory unit's stock, merges repeat selections of the same unit,
//! and survives restarts by writing itself to a named storage slot after
//! every change.
//!
//! # Architecture
//!
//! - [`state`] - Pure transitions: `Cart` + `CartOp` -> new `Cart` + notification
//! - [`store`] - `CartStore`, which couples transitions with persistence
//! - [`storage`] - Slot backends (`MemoryStorage`, `FileStorage`)
//! - [`notify`] - Shopper-facing notifications and their sinks
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```
//! use boutique_cart::{CartLineItem, CartStore, MemoryStorage, SlotName, TracingNotifier};
//! use boutique_core::{InventoryId, LineItemId, ProductId};
//! use rust_decimal::Decimal;
//!
//! let mut cart = CartStore::hydrate(MemoryStorage::new(), TracingNotifier, SlotName::default());
//! let tee = CartLineItem::new(
//!     LineItemId::new(1),
//!     ProductId::new(10),
//!     InventoryId::new(7),
//!     "Classic Tee",
//!     Decimal::from(50),
//! )
//! .with_quantity(2)
//! .with_stock(5);
//!
//! cart.add_item(tee);
//! assert_eq!(cart.item_count(), 2);
//! assert_eq!(cart.total(), Decimal::from(100));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod model;
pub mod notify;
pub mod slot;
pub mod state;
pub mod storage;
pub mod store;

/// Slot name used when none is configured.
pub const DEFAULT_SLOT: &str = "cart";

pub use config::{CartConfig, ConfigError};
pub use model::{CartLineItem, VariantKey};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use slot::{SlotError, SlotName};
pub use state::{Cart, CartOp, CartSummary, Repair, Transition};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, HydrateError};
