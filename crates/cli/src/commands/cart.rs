//! Cart commands.
//!
//! # Environment Variables
//!
//! - `BOUTIQUE_CART_DIR` - Directory holding cart slot files
//! - `BOUTIQUE_CART_SLOT` - Slot name (default: `cart`)

use std::io::{self, Write};
use std::path::PathBuf;

use boutique_cart::{
    CartConfig, CartLineItem, CartStorage, CartStore, CartSummary, FileStorage, Notifier,
    TracingNotifier, VariantKey,
};
use boutique_core::{CurrencyCode, InventoryId, LineItemId, Price, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// The mutation applied in memory but the slot could not be written.
    #[error("Cart could not be saved to {0}")]
    NotSaved(PathBuf),

    /// Writing command output failed.
    #[error("Output error: {0}")]
    Output(#[from] io::Error),

    /// Encoding JSON output failed.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Fields for a new line item, as given on the command line.
pub struct NewLine {
    pub line_id: Option<LineItemId>,
    pub inventory_id: InventoryId,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub stock: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

/// Hydrate the configured cart.
pub fn open(config: &CartConfig) -> CartStore<FileStorage, TracingNotifier> {
    CartStore::hydrate(config.file_storage(), TracingNotifier, config.slot.clone())
}

/// Build a line item from command-line fields.
pub fn line_item(line: NewLine) -> CartLineItem {
    let id = line
        .line_id
        .unwrap_or_else(|| LineItemId::new(line.inventory_id.as_i32()));
    let mut item = CartLineItem::new(
        id,
        line.product_id,
        line.inventory_id,
        line.name,
        line.unit_price,
    )
    .with_quantity(line.quantity)
    .with_stock(line.stock);

    if let Some(variant) = VariantKey::from_parts(line.size, line.color) {
        item = item.with_variant(variant);
    }
    if let Some(url) = line.image_url {
        item = item.with_image(url);
    }
    item
}

/// Fail when the last mutation did not reach the slot file.
///
/// # Errors
///
/// Returns `CartCommandError::NotSaved` if the store reports an unpersisted cart.
pub fn ensure_saved<S: CartStorage, N: Notifier>(
    store: &CartStore<S, N>,
    config: &CartConfig,
) -> Result<(), CartCommandError> {
    if store.is_persisted() {
        Ok(())
    } else {
        Err(CartCommandError::NotSaved(
            config.file_storage().slot_path(&config.slot),
        ))
    }
}

/// Print the cart as a table or as JSON.
///
/// # Errors
///
/// Returns an error if writing to `out` or JSON encoding fails.
pub fn show<S: CartStorage, N: Notifier>(
    store: &CartStore<S, N>,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CartCommandError> {
    if json {
        let body = serde_json::json!({
            "items": store.items(),
            "summary": store.summary(),
        });
        serde_json::to_writer_pretty(&mut *out, &body)?;
        writeln!(out)?;
    } else {
        render_table(store.items(), &store.summary(), out)?;
    }
    Ok(())
}

/// Print `yes` or `no`.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn contains<S: CartStorage, N: Notifier>(
    store: &CartStore<S, N>,
    inventory_id: InventoryId,
    out: &mut impl Write,
) -> Result<(), CartCommandError> {
    let answer = if store.is_in_cart(inventory_id) {
        "yes"
    } else {
        "no"
    };
    writeln!(out, "{answer}")?;
    Ok(())
}

fn money(amount: Decimal) -> Price {
    Price::new(amount, CurrencyCode::USD)
}

fn render_table(
    items: &[CartLineItem],
    summary: &CartSummary,
    out: &mut impl Write,
) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    for item in items {
        let variant = item
            .variant_key
            .as_ref()
            .map(|v| format!(" ({v})"))
            .unwrap_or_default();
        writeln!(
            out,
            "[{}] {}{} - {} x {} = {} ({} in stock)",
            item.inventory_id,
            item.name,
            variant,
            item.quantity,
            item.price(),
            money(item.line_total()),
            item.available_stock,
        )?;
    }
    writeln!(out, "Items: {}", summary.item_count)?;
    writeln!(out, "Total: {}", money(summary.total))
}
