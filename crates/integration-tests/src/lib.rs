//! Integration tests for the Boutique cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p boutique-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Carts surviving across store instances on disk
//! - `file_storage` - File backend behaviour (atomic writes, missing files)
//!
//! This crate provides shared fixtures for those tests. Scratch directories
//! come from `tempfile::tempdir`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use boutique_cart::CartLineItem;
use boutique_core::{InventoryId, LineItemId, ProductId};
use rust_decimal::Decimal;

/// A line item for inventory unit `inventory_id` with a whole-number price.
#[must_use]
pub fn line_item(inventory_id: i32, quantity: u32, price: i64, stock: u32) -> CartLineItem {
    CartLineItem::new(
        LineItemId::new(inventory_id),
        ProductId::new(inventory_id * 10),
        InventoryId::new(inventory_id),
        format!("Item {inventory_id}"),
        Decimal::from(price),
    )
    .with_quantity(quantity)
    .with_stock(stock)
}
