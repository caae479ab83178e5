//! Inventory item domain model.
//!
//! # Responsibility
//! - Define the canonical inventory record and its lifecycle helpers.
//! - Own the quantity and low-stock constants shared by engine components.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `quantity` always lies in `[0.0, 1.0]` after any mutation.
//! - `purchase_history` is append-only, oldest first.
//! - `last_updated` reflects the most recent content mutation (cosmetic
//!   reordering does not count).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::subcategory::SubcategoryRef;

/// Stable identifier for an inventory item.
pub type ItemId = Uuid;

/// Fraction of full stock below which an item is shopping-list-eligible.
///
/// Canonical predicate is strictly `quantity < LOW_STOCK_THRESHOLD`.
pub const LOW_STOCK_THRESHOLD: f64 = 0.25;

/// Sort key value for items persisted before manual ordering existed.
/// Replaced with a real position on first load.
pub const UNASSIGNED_ORDER: i64 = -1;

fn unassigned_order() -> i64 {
    UNASSIGNED_ORDER
}

/// Canonical inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    /// Non-empty after trim; unique case-insensitively across all items.
    pub name: String,
    /// Stock level as a fraction of "fully stocked", in `[0.0, 1.0]`.
    pub quantity: f64,
    pub subcategory: SubcategoryRef,
    /// `true` when the user created this item; `false` for seeded samples.
    #[serde(default)]
    pub is_custom: bool,
    /// Excluded from low-stock generation and the stock-health metric.
    #[serde(default)]
    pub is_ignored: bool,
    /// Restock timestamps, append-only, oldest first.
    #[serde(default)]
    pub purchase_history: Vec<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
    /// Stable manual sort key within the item's subcategory.
    #[serde(default = "unassigned_order")]
    pub order: i64,
}

impl InventoryItem {
    /// Creates a fully-stocked item with a generated stable id.
    pub fn new(
        name: impl Into<String>,
        subcategory: SubcategoryRef,
        is_custom: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: 1.0,
            subcategory,
            is_custom,
            is_ignored: false,
            purchase_history: Vec::new(),
            last_updated: now,
            order: UNASSIGNED_ORDER,
        }
    }

    /// Clamps a requested quantity into the valid `[0.0, 1.0]` range.
    ///
    /// Non-finite input degrades to `0.0` rather than poisoning the store.
    pub fn clamp_quantity(quantity: f64) -> f64 {
        if !quantity.is_finite() {
            return 0.0;
        }
        quantity.clamp(0.0, 1.0)
    }

    /// Whether this item qualifies for shopping-list generation.
    pub fn is_low_stock(&self) -> bool {
        !self.is_ignored && self.quantity < LOW_STOCK_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::{InventoryItem, LOW_STOCK_THRESHOLD};
    use crate::model::subcategory::SubcategoryRef;
    use chrono::Utc;

    #[test]
    fn clamp_quantity_bounds_and_degrades_non_finite() {
        assert_eq!(InventoryItem::clamp_quantity(-0.5), 0.0);
        assert_eq!(InventoryItem::clamp_quantity(1.7), 1.0);
        assert_eq!(InventoryItem::clamp_quantity(0.4), 0.4);
        assert_eq!(InventoryItem::clamp_quantity(f64::NAN), 0.0);
        assert_eq!(InventoryItem::clamp_quantity(f64::INFINITY), 0.0);
    }

    #[test]
    fn low_stock_is_strict_and_respects_ignore_flag() {
        let mut item = InventoryItem::new(
            "Milk",
            SubcategoryRef::Builtin("Dairy".to_string()),
            true,
            Utc::now(),
        );
        item.quantity = LOW_STOCK_THRESHOLD;
        assert!(!item.is_low_stock());
        item.quantity = 0.2;
        assert!(item.is_low_stock());
        item.is_ignored = true;
        assert!(!item.is_low_stock());
    }
}
