//! The cart store: owned cart state plus its persisted slot.
//!
//! Lifecycle: [`CartStore::hydrate`] once at startup, then mutations through
//! [`add_item`](CartStore::add_item), [`remove_item`](CartStore::remove_item),
//! [`update_quantity`](CartStore::update_quantity), and
//! [`clear_cart`](CartStore::clear_cart). Each mutation applies a pure
//! [`CartOp`], recomputes the [`CartSummary`], notifies, then writes the full
//! cart back to the slot. Storage failures are logged and never surface to
//! the caller; the in-memory cart stays authoritative for the session.

use boutique_core::InventoryId;
use rust_decimal::Decimal;
use tracing::{debug, error, instrument, warn};

use crate::model::CartLineItem;
use crate::notify::Notifier;
use crate::slot::SlotName;
use crate::state::{Cart, CartOp, CartSummary};
use crate::storage::CartStorage;

/// Why a persisted slot could not be used at hydration.
#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    /// The slot holds something other than a list of line items.
    #[error("Malformed cart data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The slot could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Owner of the shopper's cart.
///
/// Consumers hold the store by reference and only see read-only snapshots of
/// the items; every write to the slot goes through the store.
#[derive(Debug)]
pub struct CartStore<S, N> {
    cart: Cart,
    summary: CartSummary,
    storage: S,
    notifier: N,
    slot: SlotName,
    persisted: bool,
}

impl<S: CartStorage, N: Notifier> CartStore<S, N> {
    /// Load the cart from `slot`.
    ///
    /// An absent slot yields an empty cart. A slot that cannot be read or
    /// parsed also yields an empty cart; the problem is logged and the next
    /// mutation overwrites the slot. Nothing is written here.
    #[instrument(skip_all, fields(slot = %slot))]
    pub fn hydrate(storage: S, notifier: N, slot: SlotName) -> Self {
        let (cart, persisted) = match Self::read_slot(&storage, &slot) {
            Ok(Some(loaded)) => loaded,
            Ok(None) => {
                debug!("No persisted cart, starting empty");
                (Cart::default(), true)
            }
            Err(e @ HydrateError::Malformed(_)) => {
                warn!(error = %e, "Discarding malformed persisted cart");
                (Cart::default(), false)
            }
            Err(e @ HydrateError::Storage(_)) => {
                error!(error = %e, "Failed to read persisted cart");
                (Cart::default(), false)
            }
        };

        let summary = cart.summary();
        debug!(
            lines = summary.lines,
            item_count = summary.item_count,
            "Cart hydrated"
        );

        Self {
            cart,
            summary,
            storage,
            notifier,
            slot,
            persisted,
        }
    }

    fn read_slot(
        storage: &S,
        slot: &SlotName,
    ) -> Result<Option<(Cart, bool)>, HydrateError> {
        let Some(raw) = storage.load(slot)? else {
            return Ok(None);
        };
        let items: Vec<CartLineItem> = serde_json::from_str(&raw)?;
        let (cart, repairs) = Cart::normalize(items);
        for repair in &repairs {
            warn!(%repair, "Repaired persisted cart");
        }
        Ok(Some((cart, repairs.is_empty())))
    }

    /// Add a line item, merging with an existing line for the same inventory unit.
    #[instrument(skip(self, item), fields(inventory_id = %item.inventory_id, quantity = item.quantity))]
    pub fn add_item(&mut self, item: CartLineItem) {
        self.dispatch(CartOp::Add(item));
    }

    /// Remove the line for `inventory_id`; no-op when absent.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, inventory_id: InventoryId) {
        self.dispatch(CartOp::Remove(inventory_id));
    }

    /// Set the quantity for `inventory_id`, clamped to `[1, available_stock]`.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, inventory_id: InventoryId, quantity: u32) {
        self.dispatch(CartOp::UpdateQuantity {
            inventory_id,
            quantity,
        });
    }

    /// Empty the cart and delete the persisted slot.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) {
        self.dispatch(CartOp::Clear);
    }

    fn dispatch(&mut self, op: CartOp) {
        let clearing = matches!(op, CartOp::Clear);
        let transition = self.cart.apply(op);
        self.summary = self.cart.summary();

        if let Some(notification) = &transition.notification {
            self.notifier.notify(notification);
        }

        if clearing {
            self.remove_slot();
        } else if transition.changed || !self.persisted {
            self.persist();
        }
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.cart) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, "Failed to encode cart");
                self.persisted = false;
                return;
            }
        };

        match self.storage.save(&self.slot, &encoded) {
            Ok(()) => self.persisted = true,
            Err(e) => {
                error!(error = %e, slot = %self.slot, "Failed to persist cart");
                self.persisted = false;
            }
        }
    }

    fn remove_slot(&mut self) {
        match self.storage.remove(&self.slot) {
            Ok(()) => self.persisted = true,
            Err(e) => {
                error!(error = %e, slot = %self.slot, "Failed to remove persisted cart");
                self.persisted = false;
            }
        }
    }

    /// Whether the slot is known to match the in-memory cart.
    ///
    /// `false` after a failed write or a hydrate that discarded or repaired
    /// data, until the next successful write.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.persisted
    }

    #[must_use]
    pub fn is_in_cart(&self, inventory_id: InventoryId) -> bool {
        self.cart.contains(inventory_id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn get(&self, inventory_id: InventoryId) -> Option<&CartLineItem> {
        self.cart.get(inventory_id)
    }

    #[must_use]
    pub const fn summary(&self) -> CartSummary {
        self.summary
    }

    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.summary.item_count
    }

    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.summary.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    #[must_use]
    pub const fn slot(&self) -> &SlotName {
        &self.slot
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Tear down the store, handing back its storage and notifier.
    #[must_use]
    pub fn into_parts(self) -> (S, N) {
        (self.storage, self.notifier)
    }
}
