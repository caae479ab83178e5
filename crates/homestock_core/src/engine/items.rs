//! Inventory item collection and its mutation rules.
//!
//! # Responsibility
//! - Own the item collection; enforce name uniqueness and quantity bounds.
//! - Provide pre-mutation snapshots so the facade can ledger every change.
//!
//! # Invariants
//! - No two items share a case-insensitive trimmed name.
//! - Quantity mutations clamp into `[0.0, 1.0]`.
//! - Unknown-id mutations log a warning and return `None`; they never error.

use chrono::{DateTime, Utc};
use log::warn;

use crate::engine::EngineError;
use crate::model::item::{InventoryItem, ItemId, UNASSIGNED_ORDER};
use crate::model::subcategory::SubcategoryRef;
use crate::model::{names_equal, normalize_name};

/// Owning collection of inventory items.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<InventoryItem>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: ItemId) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Returns the stored name colliding with `name`, excluding `exclude`.
    pub fn find_name_conflict(&self, name: &str, exclude: Option<ItemId>) -> Option<String> {
        self.items
            .iter()
            .filter(|item| Some(item.id) != exclude)
            .find(|item| names_equal(&item.name, name))
            .map(|item| item.name.clone())
    }

    /// Adds a new fully-stocked item at the end of its subcategory.
    ///
    /// # Errors
    /// - [`EngineError::BlankName`] when the trimmed name is empty.
    /// - [`EngineError::DuplicateItemName`] on a case-insensitive collision.
    pub fn add(
        &mut self,
        name: &str,
        subcategory: SubcategoryRef,
        is_custom: bool,
        now: DateTime<Utc>,
    ) -> Result<ItemId, EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BlankName);
        }
        if let Some(existing) = self.find_name_conflict(trimmed, None) {
            return Err(EngineError::DuplicateItemName(existing));
        }

        let mut item = InventoryItem::new(trimmed, subcategory, is_custom, now);
        item.order = self.next_order(&item.subcategory);
        let id = item.id;
        self.items.push(item);
        Ok(id)
    }

    /// Removes an item, returning it for cascade and ledgering.
    pub fn remove(&mut self, id: ItemId) -> Option<InventoryItem> {
        let index = self.items.iter().position(|item| item.id == id);
        match index {
            Some(index) => Some(self.items.remove(index)),
            None => {
                warn!("event=item_remove module=items status=skipped reason=not_found item_id={id}");
                None
            }
        }
    }

    /// Removal variant for undo replay; missing ids are expected and silent.
    pub fn remove_silent(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Sets a clamped quantity. Returns the pre-mutation snapshot.
    pub fn update_quantity(
        &mut self,
        id: ItemId,
        quantity: f64,
        now: DateTime<Utc>,
    ) -> Option<InventoryItem> {
        let Some(item) = self.get_mut(id) else {
            warn!("event=item_update_quantity module=items status=skipped reason=not_found item_id={id}");
            return None;
        };
        let snapshot = item.clone();
        item.quantity = InventoryItem::clamp_quantity(quantity);
        item.last_updated = now;
        Some(snapshot)
    }

    /// Renames an item. Returns the pre-mutation snapshot, or `Ok(None)`
    /// when the id is unknown (logged no-op).
    ///
    /// # Errors
    /// - [`EngineError::BlankName`] when the trimmed name is empty.
    /// - [`EngineError::DuplicateItemName`] on a collision with another item.
    pub fn rename(
        &mut self,
        id: ItemId,
        new_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InventoryItem>, EngineError> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BlankName);
        }
        if self.get(id).is_none() {
            warn!("event=item_rename module=items status=skipped reason=not_found item_id={id}");
            return Ok(None);
        }
        if let Some(existing) = self.find_name_conflict(trimmed, Some(id)) {
            return Err(EngineError::DuplicateItemName(existing));
        }

        // Lookup re-done mutably after validation to keep the borrow short.
        let Some(item) = self.get_mut(id) else {
            return Ok(None);
        };
        let snapshot = item.clone();
        item.name = trimmed.to_string();
        item.last_updated = now;
        Ok(Some(snapshot))
    }

    /// Restocks to full and appends a purchase timestamp.
    /// Returns the pre-mutation snapshot.
    pub fn restock(&mut self, id: ItemId, now: DateTime<Utc>) -> Option<InventoryItem> {
        let Some(item) = self.get_mut(id) else {
            warn!("event=item_restock module=items status=skipped reason=not_found item_id={id}");
            return None;
        };
        let snapshot = item.clone();
        item.quantity = 1.0;
        item.purchase_history.push(now);
        item.last_updated = now;
        Some(snapshot)
    }

    /// Shopping-completion restock: full quantity, purchase timestamp, and
    /// the ignore flag cleared so the item re-enters generation.
    pub fn fulfill(&mut self, id: ItemId, now: DateTime<Utc>) -> bool {
        let Some(item) = self.get_mut(id) else {
            warn!("event=item_fulfill module=items status=skipped reason=not_found item_id={id}");
            return false;
        };
        item.quantity = 1.0;
        item.purchase_history.push(now);
        item.is_ignored = false;
        item.last_updated = now;
        true
    }

    /// Flips the ignore flag. Returns the pre-mutation snapshot.
    pub fn toggle_ignore(&mut self, id: ItemId, now: DateTime<Utc>) -> Option<InventoryItem> {
        let Some(item) = self.get_mut(id) else {
            warn!("event=item_toggle_ignore module=items status=skipped reason=not_found item_id={id}");
            return None;
        };
        let snapshot = item.clone();
        item.is_ignored = !item.is_ignored;
        item.last_updated = now;
        Some(snapshot)
    }

    /// Assigns consecutive sort keys following the given id sequence.
    ///
    /// Cosmetic: `last_updated` is left untouched. Unknown ids are skipped
    /// with a warning. Returns whether any order changed.
    pub fn reorder(&mut self, ordered_ids: &[ItemId]) -> bool {
        let mut changed = false;
        for (position, id) in ordered_ids.iter().enumerate() {
            let Some(item) = self.get_mut(*id) else {
                warn!("event=item_reorder module=items status=skipped reason=not_found item_id={id}");
                continue;
            };
            let order = position as i64;
            if item.order != order {
                item.order = order;
                changed = true;
            }
        }
        changed
    }

    /// Overwrite-or-reinsert used by snapshot undo; bypasses validation so
    /// the ledger snapshot is restored verbatim.
    pub fn restore(&mut self, snapshot: InventoryItem) {
        match self.get_mut(snapshot.id) {
            Some(item) => *item = snapshot,
            None => self.items.push(snapshot),
        }
    }

    /// Re-points every item in `from` at `to`. Returns the migration count.
    pub fn migrate_subcategory(&mut self, from: &SubcategoryRef, to: &SubcategoryRef) -> usize {
        let mut migrated = 0;
        for item in &mut self.items {
            if refs_equal(&item.subcategory, from) {
                item.subcategory = to.clone();
                migrated += 1;
            }
        }
        migrated
    }

    /// Ids of the items referencing the given subcategory.
    pub fn ids_in_subcategory(&self, subcategory: &SubcategoryRef) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| refs_equal(&item.subcategory, subcategory))
            .map(|item| item.id)
            .collect()
    }

    /// Items of one subcategory in manual order.
    pub fn in_subcategory(&self, subcategory: &SubcategoryRef) -> Vec<&InventoryItem> {
        let mut members: Vec<&InventoryItem> = self
            .items
            .iter()
            .filter(|item| refs_equal(&item.subcategory, subcategory))
            .collect();
        members.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        members
    }

    /// Shopping-list candidates: below threshold, not ignored, most urgent
    /// (lowest quantity) first.
    pub fn low_stock(&self) -> Vec<&InventoryItem> {
        let mut candidates: Vec<&InventoryItem> = self
            .items
            .iter()
            .filter(|item| item.is_low_stock())
            .collect();
        candidates.sort_by(|a, b| {
            a.quantity
                .partial_cmp(&b.quantity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        candidates
    }

    /// Mean quantity across non-ignored items; `None` when there are none.
    pub fn stock_health(&self) -> Option<f64> {
        let tracked: Vec<f64> = self
            .items
            .iter()
            .filter(|item| !item.is_ignored)
            .map(|item| item.quantity)
            .collect();
        if tracked.is_empty() {
            return None;
        }
        Some(tracked.iter().sum::<f64>() / tracked.len() as f64)
    }

    /// First-load repair: give every item persisted without a sort key a
    /// position at the end of its subcategory. Returns whether anything
    /// changed.
    pub fn assign_missing_orders(&mut self) -> bool {
        let unassigned: Vec<ItemId> = self
            .items
            .iter()
            .filter(|item| item.order < 0)
            .map(|item| item.id)
            .collect();
        for id in &unassigned {
            let Some(index) = self.items.iter().position(|item| item.id == *id) else {
                continue;
            };
            let subcategory = self.items[index].subcategory.clone();
            self.items[index].order = self.next_order(&subcategory);
        }
        !unassigned.is_empty()
    }

    fn next_order(&self, subcategory: &SubcategoryRef) -> i64 {
        self.items
            .iter()
            .filter(|item| refs_equal(&item.subcategory, subcategory))
            .map(|item| item.order)
            .max()
            .map_or(0, |max| max.max(UNASSIGNED_ORDER) + 1)
    }
}

/// Reference equality with case-insensitive builtin names.
fn refs_equal(a: &SubcategoryRef, b: &SubcategoryRef) -> bool {
    match (a, b) {
        (SubcategoryRef::Builtin(left), SubcategoryRef::Builtin(right)) => {
            normalize_name(left) == normalize_name(right)
        }
        (SubcategoryRef::Custom(left), SubcategoryRef::Custom(right)) => left == right,
        _ => false,
    }
}
