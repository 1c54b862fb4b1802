//! Pure cart state transitions.
//!
//! [`Cart::apply`] maps the current items plus a [`CartOp`] to the new items
//! and the notification the shopper should see. Nothing here touches storage;
//! [`CartStore`](crate::CartStore) couples each transition with a write.
//!
//! # Invariants
//!
//! - every line satisfies `1 <= quantity <= available_stock`
//! - no two lines share an `inventory_id`
//! - every unit price is non-negative and the cart total fits in a `Decimal`
//! - insertion order is preserved

use core::fmt;

use boutique_core::InventoryId;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::model::CartLineItem;
use crate::notify::Notification;

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOp {
    /// Insert a line, or merge into the existing line for its inventory unit.
    Add(CartLineItem),
    Remove(InventoryId),
    /// Set a quantity, clamped to `[1, available_stock]`.
    UpdateQuantity {
        inventory_id: InventoryId,
        quantity: u32,
    },
    Clear,
}

/// Outcome of applying a [`CartOp`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Whether the item sequence differs from before.
    pub changed: bool,
    pub notification: Option<Notification>,
}

impl Transition {
    const fn unchanged() -> Self {
        Self {
            changed: false,
            notification: None,
        }
    }

    const fn changed(notification: Option<Notification>) -> Self {
        Self {
            changed: true,
            notification,
        }
    }
}

/// Aggregates derived from the current items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of `unit_price × quantity`.
    pub total: Decimal,
    /// Number of distinct line items.
    pub lines: usize,
}

impl CartSummary {
    /// Aggregates over `items`. The total saturates at the `Decimal` bounds.
    #[must_use]
    pub fn of(items: &[CartLineItem]) -> Self {
        Self {
            item_count: items.iter().map(|item| u64::from(item.quantity)).sum(),
            total: items
                .iter()
                .fold(Decimal::ZERO, |total, item| total.saturating_add(item.line_total())),
            lines: items.len(),
        }
    }

    /// Aggregates over `items`, or `None` if a line total or the cart total
    /// overflows.
    #[must_use]
    pub fn checked(items: &[CartLineItem]) -> Option<Self> {
        let mut total = Decimal::ZERO;
        for item in items {
            total = total.checked_add(item.checked_line_total()?)?;
        }
        Some(Self {
            total,
            ..Self::of(items)
        })
    }
}

/// A problem found in persisted items and fixed while loading them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// A second line for the same inventory unit was merged into the first.
    MergedDuplicate(InventoryId),
    /// A quantity outside `[1, available_stock]` was clamped.
    ClampedQuantity {
        inventory_id: InventoryId,
        from: u32,
        to: u32,
    },
    /// A line with no remaining stock was dropped.
    DroppedOutOfStock(InventoryId),
    /// A line with a negative unit price was dropped.
    DroppedNegativePrice(InventoryId),
    /// A line whose subtotal, or whose share of the cart total, does not fit
    /// in a `Decimal` was dropped.
    DroppedTotalOverflow(InventoryId),
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MergedDuplicate(id) => write!(f, "merged duplicate line for inventory {id}"),
            Self::ClampedQuantity {
                inventory_id,
                from,
                to,
            } => write!(f, "clamped quantity of inventory {inventory_id} from {from} to {to}"),
            Self::DroppedOutOfStock(id) => write!(f, "dropped out-of-stock inventory {id}"),
            Self::DroppedNegativePrice(id) => {
                write!(f, "dropped inventory {id} with a negative price")
            }
            Self::DroppedTotalOverflow(id) => {
                write!(f, "dropped inventory {id}: cart total would overflow")
            }
        }
    }
}

/// Why an add left the cart untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refusal {
    NegativePrice,
    TotalOverflow,
}

impl Refusal {
    const fn repair(self, inventory_id: InventoryId) -> Repair {
        match self {
            Self::NegativePrice => Repair::DroppedNegativePrice(inventory_id),
            Self::TotalOverflow => Repair::DroppedTotalOverflow(inventory_id),
        }
    }
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativePrice => f.write_str("negative unit price"),
            Self::TotalOverflow => f.write_str("cart total would overflow"),
        }
    }
}

/// Clamp a requested quantity to `[1, stock]`; `None` when nothing is in stock.
#[must_use]
pub fn clamp_quantity(requested: u32, stock: u32) -> Option<u32> {
    (stock > 0).then(|| requested.clamp(1, stock))
}

/// Ordered line items, unique by inventory unit.
///
/// Serializes as a plain list. There is no `Deserialize`: persisted items go
/// through [`Cart::normalize`] so the invariants hold.
///
/// ```compile_fail
/// let cart: boutique_cart::Cart = serde_json::from_str("[]").unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Build a cart from untrusted items, repairing invariant violations.
    ///
    /// Duplicates merge with add semantics (the later line's stock snapshot
    /// wins), quantities are clamped, and lines that are out of stock, have a
    /// negative price, or would overflow the total are dropped.
    #[must_use]
    pub fn normalize(items: Vec<CartLineItem>) -> (Self, Vec<Repair>) {
        let mut cart = Self::default();
        let mut repairs = Vec::new();

        for item in items {
            let inventory_id = item.inventory_id;
            if cart.contains(inventory_id) {
                repairs.push(Repair::MergedDuplicate(inventory_id));
                if item.available_stock == 0 {
                    repairs.push(Repair::DroppedOutOfStock(inventory_id));
                }
                if let Err(refusal) = cart.add(item) {
                    repairs.push(refusal.repair(inventory_id));
                }
                continue;
            }

            if item.unit_price < Decimal::ZERO {
                repairs.push(Repair::DroppedNegativePrice(inventory_id));
                continue;
            }

            let Some(quantity) = clamp_quantity(item.quantity, item.available_stock) else {
                repairs.push(Repair::DroppedOutOfStock(inventory_id));
                continue;
            };
            let requested = item.quantity;
            if let Err(refusal) = cart.push_checked(CartLineItem { quantity, ..item }) {
                repairs.push(refusal.repair(inventory_id));
            } else if quantity != requested {
                repairs.push(Repair::ClampedQuantity {
                    inventory_id,
                    from: requested,
                    to: quantity,
                });
            }
        }

        (cart, repairs)
    }

    /// Apply a mutation.
    ///
    /// An add that has a negative price or would overflow the cart total is
    /// logged and leaves the cart unchanged.
    pub fn apply(&mut self, op: CartOp) -> Transition {
        match op {
            CartOp::Add(item) => {
                let inventory_id = item.inventory_id;
                self.add(item).unwrap_or_else(|refusal| {
                    warn!(%inventory_id, %refusal, "Refused line item");
                    Transition::unchanged()
                })
            }
            CartOp::Remove(inventory_id) => self.remove(inventory_id),
            CartOp::UpdateQuantity {
                inventory_id,
                quantity,
            } => self.update_quantity(inventory_id, quantity),
            CartOp::Clear => self.clear(),
        }
    }

    fn add(&mut self, item: CartLineItem) -> Result<Transition, Refusal> {
        let incoming_stock = item.available_stock;

        if let Some(pos) = self.position(item.inventory_id) {
            if incoming_stock == 0 {
                let removed = self.items.remove(pos);
                return Ok(Transition::changed(Some(Notification::OutOfStock {
                    name: removed.name,
                })));
            }

            let Some(existing) = self.items.get_mut(pos) else {
                return Ok(Transition::unchanged());
            };
            let previous = (existing.quantity, existing.available_stock);
            // The incoming stock snapshot is treated as the most current one.
            let quantity = existing
                .quantity
                .saturating_add(item.quantity)
                .min(incoming_stock);
            existing.quantity = quantity;
            existing.available_stock = incoming_stock;
            let name = existing.name.clone();

            if !self.total_fits() {
                if let Some(existing) = self.items.get_mut(pos) {
                    (existing.quantity, existing.available_stock) = previous;
                }
                return Err(Refusal::TotalOverflow);
            }

            return Ok(Transition {
                changed: (quantity, incoming_stock) != previous,
                notification: Some(Notification::QuantityUpdated { name, quantity }),
            });
        }

        if item.unit_price < Decimal::ZERO {
            return Err(Refusal::NegativePrice);
        }
        let Some(quantity) = clamp_quantity(item.quantity, incoming_stock) else {
            return Ok(Transition {
                changed: false,
                notification: Some(Notification::OutOfStock { name: item.name }),
            });
        };
        let notification = Notification::Added {
            name: item.name.clone(),
        };
        self.push_checked(CartLineItem { quantity, ..item })?;
        Ok(Transition::changed(Some(notification)))
    }

    fn push_checked(&mut self, line: CartLineItem) -> Result<(), Refusal> {
        self.items.push(line);
        if self.total_fits() {
            Ok(())
        } else {
            self.items.pop();
            Err(Refusal::TotalOverflow)
        }
    }

    fn total_fits(&self) -> bool {
        CartSummary::checked(&self.items).is_some()
    }

    fn remove(&mut self, inventory_id: InventoryId) -> Transition {
        match self.position(inventory_id) {
            Some(pos) => {
                let removed = self.items.remove(pos);
                Transition::changed(Some(Notification::Removed { name: removed.name }))
            }
            None => Transition::unchanged(),
        }
    }

    fn update_quantity(&mut self, inventory_id: InventoryId, requested: u32) -> Transition {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.inventory_id == inventory_id)
        else {
            return Transition::unchanged();
        };

        let Some(quantity) = clamp_quantity(requested, item.available_stock) else {
            return Transition::unchanged();
        };
        let previous = item.quantity;
        if quantity == previous {
            return Transition::unchanged();
        }
        item.quantity = quantity;

        if self.total_fits() {
            Transition::changed(None)
        } else {
            warn!(%inventory_id, quantity, "Refused quantity update: cart total would overflow");
            if let Some(item) = self.items.iter_mut().find(|item| item.inventory_id == inventory_id) {
                item.quantity = previous;
            }
            Transition::unchanged()
        }
    }

    fn clear(&mut self) -> Transition {
        if self.items.is_empty() {
            return Transition::unchanged();
        }
        self.items.clear();
        Transition::changed(None)
    }

    fn position(&self, inventory_id: InventoryId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.inventory_id == inventory_id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, inventory_id: InventoryId) -> Option<&CartLineItem> {
        self.items
            .iter()
            .find(|item| item.inventory_id == inventory_id)
    }

    #[must_use]
    pub fn contains(&self, inventory_id: InventoryId) -> bool {
        self.get(inventory_id).is_some()
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.items)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boutique_core::{LineItemId, ProductId};

    use super::*;

    fn item(inventory_id: i32, quantity: u32, price: i64, stock: u32) -> CartLineItem {
        CartLineItem::new(
            LineItemId::new(inventory_id),
            ProductId::new(100),
            InventoryId::new(inventory_id),
            format!("Item {inventory_id}"),
            Decimal::from(price),
        )
        .with_quantity(quantity)
        .with_stock(stock)
    }

    #[test]
    fn test_add_new_item() {
        let mut cart = Cart::default();
        let t = cart.apply(CartOp::Add(item(7, 2, 50, 5)));

        assert!(t.changed);
        assert_eq!(
            t.notification,
            Some(Notification::Added {
                name: "Item 7".to_string()
            })
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.summary().total, Decimal::from(100));
    }

    #[test]
    fn test_add_merges_and_clamps_to_incoming_stock() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(7, 2, 50, 5)));
        let t = cart.apply(CartOp::Add(item(7, 10, 50, 5)));

        assert_eq!(
            t.notification,
            Some(Notification::QuantityUpdated {
                name: "Item 7".to_string(),
                quantity: 5
            })
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(InventoryId::new(7)).unwrap().quantity, 5);
        assert_eq!(cart.summary().total, Decimal::from(250));
    }

    #[test]
    fn test_add_refreshes_stock_snapshot() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(7, 4, 50, 10)));
        cart.apply(CartOp::Add(item(7, 1, 50, 3)));

        let line = cart.get(InventoryId::new(7)).unwrap();
        assert_eq!(line.available_stock, 3);
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn test_add_keeps_original_snapshot_fields() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(7, 1, 50, 10)));
        let mut repriced = item(7, 1, 60, 10);
        repriced.name = "Renamed".to_string();
        cart.apply(CartOp::Add(repriced));

        let line = cart.get(InventoryId::new(7)).unwrap();
        assert_eq!(line.name, "Item 7");
        assert_eq!(line.unit_price, Decimal::from(50));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_add_new_item_clamps_quantity() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(1, 9, 10, 4)));
        cart.apply(CartOp::Add(item(2, 0, 10, 4)));

        assert_eq!(cart.get(InventoryId::new(1)).unwrap().quantity, 4);
        assert_eq!(cart.get(InventoryId::new(2)).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_out_of_stock_is_rejected() {
        let mut cart = Cart::default();
        let t = cart.apply(CartOp::Add(item(3, 1, 10, 0)));

        assert!(!t.changed);
        assert_eq!(
            t.notification,
            Some(Notification::OutOfStock {
                name: "Item 3".to_string()
            })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_out_of_stock_drops_existing_line() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(3, 2, 10, 5)));
        let t = cart.apply(CartOp::Add(item(3, 1, 10, 0)));

        assert!(t.changed);
        assert!(!cart.contains(InventoryId::new(3)));
        assert_eq!(cart.summary(), CartSummary::default());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(1, 1, 10, 5)));
        let before = cart.clone();

        let t = cart.apply(CartOp::Remove(InventoryId::new(99)));
        assert_eq!(t, Transition::default());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_existing() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(1, 1, 10, 5)));
        let t = cart.apply(CartOp::Remove(InventoryId::new(1)));

        assert_eq!(
            t.notification,
            Some(Notification::Removed {
                name: "Item 1".to_string()
            })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_clamps_both_ends() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(1, 2, 10, 5)));

        cart.apply(CartOp::UpdateQuantity {
            inventory_id: InventoryId::new(1),
            quantity: 0,
        });
        assert_eq!(cart.get(InventoryId::new(1)).unwrap().quantity, 1);

        cart.apply(CartOp::UpdateQuantity {
            inventory_id: InventoryId::new(1),
            quantity: 99,
        });
        assert_eq!(cart.get(InventoryId::new(1)).unwrap().quantity, 5);
    }

    #[test]
    fn test_update_quantity_missing_is_noop() {
        let mut cart = Cart::default();
        let t = cart.apply(CartOp::UpdateQuantity {
            inventory_id: InventoryId::new(1),
            quantity: 3,
        });
        assert!(!t.changed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(1, 2, 10, 5)));
        cart.apply(CartOp::Add(item(2, 1, 15, 5)));

        assert!(cart.apply(CartOp::Clear).changed);
        assert_eq!(cart.summary(), CartSummary::default());
        assert!(!cart.apply(CartOp::Clear).changed);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::default();
        for id in [5, 2, 9] {
            cart.apply(CartOp::Add(item(id, 1, 1, 3)));
        }
        cart.apply(CartOp::Add(item(2, 1, 1, 3)));

        let order: Vec<i32> = cart
            .items()
            .iter()
            .map(|line| line.inventory_id.as_i32())
            .collect();
        assert_eq!(order, vec![5, 2, 9]);
    }

    #[test]
    fn test_summary() {
        let items = vec![item(1, 2, 50, 5), item(2, 3, 10, 5)];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.total, Decimal::from(130));
        assert_eq!(summary.lines, 2);
    }

    #[test]
    fn test_normalize_repairs() {
        let items = vec![
            item(1, 2, 10, 5),
            item(2, 8, 10, 3),
            item(3, 1, 10, 0),
            item(1, 9, 10, 6),
            item(4, 0, 10, 2),
        ];
        let (cart, repairs) = Cart::normalize(items);

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.get(InventoryId::new(1)).unwrap().quantity, 6);
        assert_eq!(cart.get(InventoryId::new(2)).unwrap().quantity, 3);
        assert_eq!(cart.get(InventoryId::new(4)).unwrap().quantity, 1);
        assert_eq!(
            repairs,
            vec![
                Repair::ClampedQuantity {
                    inventory_id: InventoryId::new(2),
                    from: 8,
                    to: 3
                },
                Repair::DroppedOutOfStock(InventoryId::new(3)),
                Repair::MergedDuplicate(InventoryId::new(1)),
                Repair::ClampedQuantity {
                    inventory_id: InventoryId::new(4),
                    from: 0,
                    to: 1
                },
            ]
        );
    }

    #[test]
    fn test_normalize_clean_items_untouched() {
        let items = vec![item(1, 2, 10, 5), item(2, 1, 10, 3)];
        let (cart, repairs) = Cart::normalize(items.clone());
        assert!(repairs.is_empty());
        assert_eq!(cart.items(), items.as_slice());
    }

    fn priced(inventory_id: i32, quantity: u32, unit_price: Decimal, stock: u32) -> CartLineItem {
        CartLineItem {
            unit_price,
            ..item(inventory_id, quantity, 0, stock)
        }
    }

    #[test]
    fn test_add_refuses_line_total_overflow() {
        let mut cart = Cart::default();
        let t = cart.apply(CartOp::Add(priced(1, 2, Decimal::MAX, 5)));

        assert_eq!(t, Transition::default());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_refuses_cart_total_overflow() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(priced(1, 1, Decimal::MAX, 5)));
        let t = cart.apply(CartOp::Add(priced(2, 1, Decimal::ONE, 5)));

        assert!(!t.changed);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.summary().total, Decimal::MAX);
    }

    #[test]
    fn test_merge_refuses_overflow_and_keeps_line() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(priced(1, 1, Decimal::MAX, 5)));
        let t = cart.apply(CartOp::Add(priced(1, 1, Decimal::MAX, 4)));

        assert_eq!(t, Transition::default());
        let line = cart.get(InventoryId::new(1)).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.available_stock, 5);
    }

    #[test]
    fn test_update_quantity_refuses_overflow() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(priced(1, 1, Decimal::MAX, 5)));
        let t = cart.apply(CartOp::UpdateQuantity {
            inventory_id: InventoryId::new(1),
            quantity: 3,
        });

        assert!(!t.changed);
        assert_eq!(cart.get(InventoryId::new(1)).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_refuses_negative_price() {
        let mut cart = Cart::default();
        let t = cart.apply(CartOp::Add(priced(1, 1, Decimal::NEGATIVE_ONE, 5)));
        assert!(!t.changed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_normalize_drops_overflowing_lines() {
        let items = vec![
            item(1, 1, 10, 5),
            priced(2, 2, Decimal::MAX, 5),
            priced(3, 1, Decimal::MAX, 5),
            priced(5, 1, Decimal::NEGATIVE_ONE, 5),
        ];
        let (cart, repairs) = Cart::normalize(items);

        let ids: Vec<i32> = cart
            .items()
            .iter()
            .map(|line| line.inventory_id.as_i32())
            .collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(
            repairs,
            vec![
                Repair::DroppedTotalOverflow(InventoryId::new(2)),
                Repair::DroppedTotalOverflow(InventoryId::new(3)),
                Repair::DroppedNegativePrice(InventoryId::new(5)),
            ]
        );
        assert_eq!(cart.summary().total, Decimal::from(10));
    }

    #[test]
    fn test_normalize_json_with_duplicate_ids() {
        let raw = r#"[
            {"id":1,"productId":3,"name":"Tee","unitPrice":20,"quantity":9,
             "inventoryId":7,"availableStock":0},
            {"id":2,"productId":3,"name":"Tee","unitPrice":20,"quantity":2,
             "inventoryId":7,"availableStock":4}
        ]"#;
        let items: Vec<CartLineItem> = serde_json::from_str(raw).unwrap();
        let (cart, repairs) = Cart::normalize(items);

        assert_eq!(cart.len(), 1);
        let line = cart.get(InventoryId::new(7)).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.available_stock, 4);
        assert_eq!(repairs.first(), Some(&Repair::DroppedOutOfStock(InventoryId::new(7))));
    }

    #[test]
    fn test_checked_summary() {
        assert_eq!(CartSummary::checked(&[priced(1, 2, Decimal::MAX, 5)]), None);
        let items = vec![item(1, 2, 50, 5)];
        assert_eq!(CartSummary::checked(&items), Some(CartSummary::of(&items)));
    }

    #[test]
    fn test_cart_serializes_as_list() {
        let mut cart = Cart::default();
        cart.apply(CartOp::Add(item(1, 2, 10, 5)));
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["inventoryId"], 1);
    }
}
