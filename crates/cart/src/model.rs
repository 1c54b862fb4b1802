//! Cart line item model.
//!
//! Line items are snapshots: name, price, and stock are captured when the
//! shopper adds the item and are not re-fetched from the catalog. The
//! serialized field names are part of the persisted slot format and must not
//! change.

use core::fmt;

use boutique_core::{CurrencyCode, InventoryId, LineItemId, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Size/color attributes identifying a sellable variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl VariantKey {
    /// Build a variant key, returning `None` when neither attribute is set.
    #[must_use]
    pub fn from_parts(size: Option<String>, color: Option<String>) -> Option<Self> {
        if size.is_none() && color.is_none() {
            None
        } else {
            Some(Self { size, color })
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => write!(f, "{size} / {color}"),
            (Some(only), None) | (None, Some(only)) => f.write_str(only),
            (None, None) => Ok(()),
        }
    }
}

/// A single shopping-cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Identifier of the line item itself.
    pub id: LineItemId,
    pub product_id: ProductId,
    /// Display name at the time of add.
    pub name: String,
    /// Unit price at the time of add, stored as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_key: Option<VariantKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Stock-keeping unit; the cart's deduplication key.
    pub inventory_id: InventoryId,
    /// Remaining stock for the inventory unit when last seen.
    pub available_stock: u32,
}

impl CartLineItem {
    /// Create a line item with quantity 1 and no stock.
    ///
    /// Callers set the stock snapshot with [`with_stock`](Self::with_stock);
    /// an item with zero stock is rejected by the cart.
    #[must_use]
    pub fn new(
        id: LineItemId,
        product_id: ProductId,
        inventory_id: InventoryId,
        name: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id,
            product_id,
            name: name.into(),
            unit_price,
            quantity: 1,
            variant_key: None,
            image_url: None,
            inventory_id,
            available_stock: 0,
        }
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub fn with_stock(mut self, available_stock: u32) -> Self {
        self.available_stock = available_stock;
        self
    }

    #[must_use]
    pub fn with_variant(mut self, variant_key: VariantKey) -> Self {
        self.variant_key = Some(variant_key);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// `unit_price × quantity`, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// `unit_price × quantity`, or `None` on overflow.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Unit price in the store currency.
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::new(self.unit_price, CurrencyCode::USD)
    }
}
