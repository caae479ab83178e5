//! Domain engine facade and orchestration.
//!
//! # Responsibility
//! - Compose taxonomy, item store, shopping workflow and activity ledger
//!   behind one entry point host code calls.
//! - Fan out persistence writes and subscriber notifications after every
//!   successful mutation.
//!
//! # Invariants
//! - Validation failures never leave in-memory state mutated.
//! - Persistence failures after an applied mutation are logged and
//!   swallowed; every save is a full overwrite, so the next successful
//!   save converges storage back onto memory.
//! - Single-owner, single-threaded: callers on threads must serialize
//!   externally.

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::Utc;
use log::{info, warn};

use crate::gateway::{GatewayResult, PersistenceGateway};
use crate::model::activity::{ActivityAction, ActivityDetails, ActivityId, ActivityLogEntry};
use crate::model::item::{InventoryItem, ItemId};
use crate::model::shopping::{ListEntryId, ShoppingListItem, ShoppingState};
use crate::model::subcategory::{
    builtin_by_name, CustomSubcategory, SubcategoryId, SubcategoryRef, SubcategoryStyle,
};

pub mod items;
pub mod ledger;
pub mod shopping;
pub mod taxonomy;
pub mod transfer;

use items::ItemStore;
use ledger::{ActivityLedger, UndoOp};
use shopping::ShoppingList;
use taxonomy::Taxonomy;
use transfer::{hidden_builtins_for_import, TransferPayload};

/// Validation failure raised synchronously to the caller.
///
/// "Not found" conditions are never errors; they degrade to logged no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Name is empty after trimming.
    BlankName,
    /// Another item already uses this name (stored spelling attached).
    DuplicateItemName(String),
    /// Another visible subcategory already uses this name.
    DuplicateSubcategoryName {
        name: String,
        /// Human-readable `"Category > Name"` of the existing subcategory.
        location: String,
    },
    /// Promotion target is not in the builtin catalog.
    UnknownBuiltin(String),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::DuplicateItemName(existing) => {
                write!(f, "an item named `{existing}` already exists")
            }
            Self::DuplicateSubcategoryName { name, location } => {
                write!(f, "subcategory name `{name}` conflicts with {location}")
            }
            Self::UnknownBuiltin(name) => write!(f, "unknown builtin subcategory: {name}"),
        }
    }
}

impl Error for EngineError {}

/// Handle returned by [`InventoryEngine::subscribe`]; pass it back to
/// [`InventoryEngine::unsubscribe`] to stop notifications.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
}

#[derive(Default)]
struct SubscriberRegistry {
    next_id: u64,
    subscribers: Vec<(u64, Box<dyn FnMut()>)>,
}

impl SubscriberRegistry {
    fn subscribe(&mut self, callback: Box<dyn FnMut()>) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, callback));
        Subscription { id }
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscribers.retain(|(id, _)| *id != subscription.id);
    }

    /// Payload-free notification; subscribers re-pull state via getters.
    fn notify(&mut self) {
        for (_, callback) in &mut self.subscribers {
            callback();
        }
    }
}

/// The household inventory engine: single entry point for host code.
///
/// Construct with [`InventoryEngine::new`], then call
/// [`InventoryEngine::load`] before anything else.
pub struct InventoryEngine<G: PersistenceGateway> {
    gateway: G,
    items: ItemStore,
    taxonomy: Taxonomy,
    shopping: ShoppingList,
    ledger: ActivityLedger,
    subscribers: SubscriberRegistry,
}

impl<G: PersistenceGateway> InventoryEngine<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            items: ItemStore::new(),
            taxonomy: Taxonomy::new(),
            shopping: ShoppingList::new(),
            ledger: ActivityLedger::new(),
            subscribers: SubscriberRegistry::default(),
        }
    }

    /// Read access to the injected gateway, mainly for host inspection.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Loads all tables from the gateway, assigning missing item sort keys
    /// and repairing inconsistent shopping state left by older data.
    pub fn load(&mut self) -> GatewayResult<()> {
        self.items = ItemStore::from_items(self.gateway.load_inventory_items()?);
        self.taxonomy = Taxonomy::from_parts(
            self.gateway.load_custom_subcategories()?,
            self.gateway.load_hidden_builtins()?,
            self.gateway.load_subcategory_order()?,
        );
        let loaded_state = self.gateway.load_shopping_state()?;
        let loaded_entries = self.gateway.load_shopping_list()?;
        let loaded_len = loaded_entries.len();
        self.shopping = ShoppingList::from_parts(loaded_state, loaded_entries);
        self.ledger = ActivityLedger::from_entries(self.gateway.load_activity_log()?);

        if self.items.assign_missing_orders() {
            self.persist_items();
        }
        if self.shopping.state() != loaded_state || self.shopping.entries().len() != loaded_len {
            self.persist_shopping();
        }

        info!(
            "event=engine_load module=engine status=ok items={} customs={} log_entries={}",
            self.items.items().len(),
            self.taxonomy.customs().len(),
            self.ledger.entries().len()
        );
        Ok(())
    }

    // ---- read models -----------------------------------------------------

    pub fn items(&self) -> &[InventoryItem] {
        self.items.items()
    }

    pub fn item(&self, id: ItemId) -> Option<&InventoryItem> {
        self.items.get(id)
    }

    /// Items of one subcategory in manual order.
    pub fn items_in(&self, subcategory: &SubcategoryRef) -> Vec<&InventoryItem> {
        self.items.in_subcategory(subcategory)
    }

    /// Generation candidates: low stock, not ignored, most urgent first.
    pub fn low_stock_items(&self) -> Vec<&InventoryItem> {
        self.items.low_stock()
    }

    /// Mean stock level of non-ignored items; `None` with nothing tracked.
    pub fn stock_health(&self) -> Option<f64> {
        self.items.stock_health()
    }

    pub fn shopping_state(&self) -> ShoppingState {
        self.shopping.state()
    }

    pub fn shopping_list(&self) -> &[ShoppingListItem] {
        self.shopping.entries()
    }

    pub fn activity_log(&self) -> &[ActivityLogEntry] {
        self.ledger.entries()
    }

    pub fn custom_subcategories(&self) -> &[CustomSubcategory] {
        self.taxonomy.customs()
    }

    pub fn hidden_builtins(&self) -> Vec<String> {
        self.taxonomy.hidden_builtins()
    }

    pub fn resolve_subcategory(&self, subcategory: &SubcategoryRef) -> Option<SubcategoryStyle> {
        self.taxonomy.resolve(subcategory)
    }

    /// Visible subcategory names for a category, explicit order first.
    pub fn ordered_subcategories(&self, category: &str) -> Vec<String> {
        self.taxonomy.ordered_subcategories(category)
    }

    // ---- subscriptions ---------------------------------------------------

    /// Registers a payload-free change callback, invoked after every
    /// successful mutation.
    pub fn subscribe(&mut self, callback: Box<dyn FnMut()>) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscribers.unsubscribe(subscription);
    }

    // ---- item operations -------------------------------------------------

    /// Adds a user-created, fully-stocked item.
    pub fn add_item(
        &mut self,
        name: &str,
        subcategory: SubcategoryRef,
    ) -> Result<ItemId, EngineError> {
        let now = Utc::now();
        let id = self.items.add(name, subcategory, true, now)?;
        let item_name = self
            .items
            .get(id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        self.ledger.record(
            ActivityAction::AddItem,
            id,
            item_name,
            ActivityDetails::default(),
            now,
        );
        self.persist_items();
        self.persist_ledger();
        self.notify();
        Ok(id)
    }

    /// Seeds the catalog sample items of a builtin subcategory, skipping
    /// names already taken. Returns how many items were created.
    pub fn add_sample_items(&mut self, builtin_name: &str) -> usize {
        let Some(builtin) = builtin_by_name(builtin_name) else {
            warn!("event=sample_seed module=engine status=skipped reason=unknown_builtin name={builtin_name}");
            return 0;
        };
        let now = Utc::now();
        let subcategory = SubcategoryRef::Builtin(builtin.name.to_string());
        let mut added = 0;
        for sample in builtin.sample_items {
            match self.items.add(sample, subcategory.clone(), false, now) {
                Ok(id) => {
                    self.ledger.record(
                        ActivityAction::AddItem,
                        id,
                        *sample,
                        ActivityDetails::default(),
                        now,
                    );
                    added += 1;
                }
                Err(_) => continue,
            }
        }
        if added == 0 {
            return 0;
        }
        self.persist_items();
        self.persist_ledger();
        self.notify();
        added
    }

    /// Removes an item and cascades into the shopping list.
    pub fn remove_item(&mut self, id: ItemId) {
        let now = Utc::now();
        let Some(removed) = self.items.remove(id) else {
            return;
        };
        let list_changed = self.shopping.remove_backing_item(id);
        self.ledger.record(
            ActivityAction::RemoveItem,
            id,
            removed.name.clone(),
            ActivityDetails::snapshot(removed),
            now,
        );
        self.persist_items();
        if list_changed {
            self.persist_shopping();
        }
        self.persist_ledger();
        self.notify();
    }

    /// Sets an item's stock level, clamped into `[0.0, 1.0]`.
    pub fn update_quantity(&mut self, id: ItemId, quantity: f64) {
        let now = Utc::now();
        let Some(snapshot) = self.items.update_quantity(id, quantity, now) else {
            return;
        };
        let new_quantity = self.items.get(id).map(|item| item.quantity).unwrap_or(0.0);
        self.ledger.record(
            ActivityAction::UpdateQuantity,
            id,
            snapshot.name.clone(),
            ActivityDetails::change(
                format!("{:.2}", snapshot.quantity),
                format!("{new_quantity:.2}"),
                snapshot,
            ),
            now,
        );
        self.persist_items();
        self.persist_ledger();
        self.notify();
    }

    /// Renames an item and resyncs any referencing shopping entry.
    pub fn rename_item(&mut self, id: ItemId, new_name: &str) -> Result<(), EngineError> {
        let now = Utc::now();
        let Some(snapshot) = self.items.rename(id, new_name, now)? else {
            return Ok(());
        };
        let stored_name = self
            .items
            .get(id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        let list_changed = self.shopping.sync_item_name(id, &stored_name);
        self.ledger.record(
            ActivityAction::UpdateName,
            id,
            stored_name.clone(),
            ActivityDetails::change(snapshot.name.clone(), stored_name, snapshot),
            now,
        );
        self.persist_items();
        if list_changed {
            self.persist_shopping();
        }
        self.persist_ledger();
        self.notify();
        Ok(())
    }

    /// Restocks an item to full and appends a purchase timestamp.
    pub fn restock_item(&mut self, id: ItemId) {
        let now = Utc::now();
        let Some(snapshot) = self.items.restock(id, now) else {
            return;
        };
        self.ledger.record(
            ActivityAction::Restock,
            id,
            snapshot.name.clone(),
            ActivityDetails::snapshot(snapshot),
            now,
        );
        self.persist_items();
        self.persist_ledger();
        self.notify();
    }

    /// Flips an item's ignore flag.
    pub fn toggle_item_ignored(&mut self, id: ItemId) {
        let now = Utc::now();
        let Some(snapshot) = self.items.toggle_ignore(id, now) else {
            return;
        };
        let ignored_now = !snapshot.is_ignored;
        self.ledger.record(
            ActivityAction::ToggleIgnore,
            id,
            snapshot.name.clone(),
            ActivityDetails::change(
                snapshot.is_ignored.to_string(),
                ignored_now.to_string(),
                snapshot,
            ),
            now,
        );
        self.persist_items();
        self.persist_ledger();
        self.notify();
    }

    /// Applies a manual item ordering.
    ///
    /// Notifies subscribers before the write settles so drag-reorder UI
    /// stays responsive; the write itself still follows immediately.
    pub fn reorder_items(&mut self, ordered_ids: &[ItemId]) {
        if !self.items.reorder(ordered_ids) {
            return;
        }
        self.notify();
        self.persist_items();
    }

    // ---- taxonomy operations ---------------------------------------------

    pub fn add_custom_subcategory(
        &mut self,
        name: &str,
        icon: &str,
        color: &str,
        category: &str,
    ) -> Result<SubcategoryId, EngineError> {
        let id = self.taxonomy.add_custom(name, icon, color, category)?;
        self.persist_taxonomy();
        self.notify();
        Ok(id)
    }

    pub fn update_custom_subcategory(
        &mut self,
        id: SubcategoryId,
        name: &str,
        icon: &str,
        color: &str,
        category: &str,
    ) -> Result<(), EngineError> {
        if !self.taxonomy.update_custom(id, name, icon, color, category)? {
            return Ok(());
        }
        self.persist_taxonomy();
        self.notify();
        Ok(())
    }

    /// Promotes a builtin into a custom subcategory, migrating member items
    /// when the name changes. Hidden set, customs and items are persisted
    /// together as one logical transaction.
    pub fn promote_builtin(
        &mut self,
        builtin_name: &str,
        new_name: &str,
        icon: &str,
        color: &str,
        category: &str,
    ) -> Result<SubcategoryId, EngineError> {
        let promotion = self
            .taxonomy
            .promote(builtin_name, new_name, icon, color, category)?;
        let mut migrated = 0;
        if promotion.requires_migration {
            migrated = self.items.migrate_subcategory(
                &SubcategoryRef::Builtin(promotion.hidden_name.clone()),
                &SubcategoryRef::Custom(promotion.custom_id),
            );
        }
        info!(
            "event=subcategory_promote module=engine status=ok builtin={} custom_id={} migrated_items={migrated}",
            promotion.hidden_name, promotion.custom_id
        );
        self.persist_taxonomy();
        if migrated > 0 {
            self.persist_items();
        }
        self.notify();
        Ok(promotion.custom_id)
    }

    /// Removes a subcategory, cascading removal of every member item
    /// (builtins are hidden, customs deleted).
    pub fn remove_subcategory(&mut self, subcategory: &SubcategoryRef) {
        let member_ids = self.items.ids_in_subcategory(subcategory);
        let now = Utc::now();
        let mut list_changed = false;
        for id in &member_ids {
            let Some(removed) = self.items.remove(*id) else {
                continue;
            };
            list_changed |= self.shopping.remove_backing_item(*id);
            self.ledger.record(
                ActivityAction::RemoveItem,
                *id,
                removed.name.clone(),
                ActivityDetails::snapshot(removed),
                now,
            );
        }

        let taxonomy_changed = match subcategory {
            SubcategoryRef::Builtin(name) => {
                let hidden = self.taxonomy.hide_builtin(name);
                if hidden {
                    self.taxonomy.prune_order(name);
                }
                hidden
            }
            SubcategoryRef::Custom(id) => match self.taxonomy.remove_custom(*id) {
                Some(removed) => {
                    self.taxonomy.prune_order(&removed.name);
                    true
                }
                None => false,
            },
        };
        if !taxonomy_changed && member_ids.is_empty() {
            return;
        }

        self.persist_taxonomy();
        if !member_ids.is_empty() {
            self.persist_items();
            self.persist_ledger();
        }
        if list_changed {
            self.persist_shopping();
        }
        self.notify();
    }

    /// Applies an explicit subcategory presentation order for a category.
    ///
    /// Like item reordering, subscribers are notified before the write.
    pub fn set_subcategory_order(&mut self, category: &str, names: Vec<String>) {
        self.taxonomy.set_order(category, names);
        self.notify();
        if let Err(err) = self.gateway.save_subcategory_order(self.taxonomy.order()) {
            warn!("event=persist module=engine status=error table=subcategory_order error={err}");
        }
    }

    // ---- shopping operations ---------------------------------------------

    /// Rebuilds the cart from low-stock items and enters `Generating`.
    pub fn generate_shopping_list(&mut self) {
        let candidates = self.items.low_stock();
        if !self.shopping.generate(&candidates) {
            return;
        }
        self.persist_shopping();
        self.notify();
    }

    /// Adds a temporary "misc" entry to the cart.
    pub fn add_misc_item(&mut self, name: &str) -> Result<(), EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BlankName);
        }
        if !self.shopping.add_misc(trimmed) {
            return Ok(());
        }
        self.persist_shopping();
        self.notify();
        Ok(())
    }

    /// Adds an inventory item to the cart.
    pub fn add_item_to_shopping_list(&mut self, id: ItemId) {
        let Some(item) = self.items.get(id) else {
            warn!("event=shopping_add_item module=engine status=skipped reason=not_found item_id={id}");
            return;
        };
        if !self.shopping.add_item(item) {
            return;
        }
        self.persist_shopping();
        self.notify();
    }

    /// Removes one cart entry while the list is being assembled.
    pub fn remove_shopping_entry(&mut self, entry_id: ListEntryId) {
        if !self.shopping.remove_entry(entry_id) {
            return;
        }
        self.persist_shopping();
        self.notify();
    }

    /// `Generating -> ListReady`.
    pub fn finalize_shopping_list(&mut self) {
        if !self.shopping.finalize() {
            return;
        }
        self.persist_shopping();
        self.notify();
    }

    /// `ListReady -> Shopping`.
    pub fn start_shopping(&mut self) {
        if !self.shopping.start() {
            return;
        }
        self.persist_shopping();
        self.notify();
    }

    /// Flips one entry's checked flag during the trip.
    pub fn toggle_shopping_entry(&mut self, entry_id: ListEntryId) {
        if !self.shopping.toggle_checked(entry_id) {
            return;
        }
        self.persist_shopping();
        self.notify();
    }

    /// Completes the trip: every checked, non-temporary entry restocks its
    /// backing item (full quantity, purchase timestamp, ignore cleared).
    pub fn complete_shopping(&mut self) {
        let Some(fulfilled) = self.shopping.complete() else {
            return;
        };
        let now = Utc::now();
        for id in &fulfilled {
            self.items.fulfill(*id, now);
        }
        self.persist_shopping();
        if !fulfilled.is_empty() {
            self.persist_items();
        }
        self.notify();
    }

    /// Abandons the trip in any non-Empty state.
    pub fn cancel_shopping(&mut self) {
        if !self.shopping.cancel() {
            return;
        }
        self.persist_shopping();
        self.notify();
    }

    // ---- ledger operations -----------------------------------------------

    /// Reverses one ledger entry; repeated undo of the same entry is a
    /// no-op.
    pub fn undo_activity(&mut self, id: ActivityId) {
        let Some(op) = self.ledger.undo(id) else {
            return;
        };
        let mut list_changed = false;
        match op {
            UndoOp::Remove(item_id) => {
                self.items.remove_silent(item_id);
                list_changed = self.shopping.remove_backing_item(item_id);
            }
            UndoOp::Restore(snapshot) => self.items.restore(snapshot),
        }
        self.persist_items();
        if list_changed {
            self.persist_shopping();
        }
        self.persist_ledger();
        self.notify();
    }

    /// Explicit "clear history".
    pub fn clear_activity_log(&mut self) {
        self.ledger.clear();
        self.persist_ledger();
        self.notify();
    }

    // ---- export / import -------------------------------------------------

    /// Snapshot of the exportable state. The hidden-builtins mask is
    /// intentionally left out; import re-derives it.
    pub fn export_payload(&self) -> TransferPayload {
        TransferPayload {
            inventory_items: self.items.items().to_vec(),
            custom_subcategories: self.taxonomy.customs().to_vec(),
            shopping_list: self.shopping.entries().to_vec(),
            subcategory_order: self.taxonomy.order().clone(),
        }
    }

    /// Replaces the whole household with an imported payload.
    ///
    /// Every builtin starts hidden, then builtins referenced by imported
    /// items (and not shadowed by imported customs) are un-hidden. A
    /// non-empty imported cart resumes in `Generating`.
    pub fn import_payload(&mut self, payload: TransferPayload) {
        let hidden =
            hidden_builtins_for_import(&payload.inventory_items, &payload.custom_subcategories);
        self.items = ItemStore::from_items(payload.inventory_items);
        self.items.assign_missing_orders();
        self.taxonomy.set_customs(payload.custom_subcategories);
        self.taxonomy.set_hidden_builtins(hidden);
        self.taxonomy.set_order_map(payload.subcategory_order);
        let state = if payload.shopping_list.is_empty() {
            ShoppingState::Empty
        } else {
            ShoppingState::Generating
        };
        self.shopping = ShoppingList::from_parts(state, payload.shopping_list);

        info!(
            "event=engine_import module=engine status=ok items={} customs={}",
            self.items.items().len(),
            self.taxonomy.customs().len()
        );
        self.persist_items();
        self.persist_taxonomy();
        self.persist_shopping();
        self.notify();
    }

    // ---- persistence plumbing --------------------------------------------

    fn notify(&mut self) {
        self.subscribers.notify();
    }

    fn persist_items(&self) {
        if let Err(err) = self.gateway.save_inventory_items(self.items.items()) {
            warn!("event=persist module=engine status=error table=inventory_items error={err}");
        }
    }

    fn persist_shopping(&self) {
        if let Err(err) = self.gateway.save_shopping_list(self.shopping.entries()) {
            warn!("event=persist module=engine status=error table=shopping_list error={err}");
        }
        if let Err(err) = self.gateway.save_shopping_state(self.shopping.state()) {
            warn!("event=persist module=engine status=error table=shopping_state error={err}");
        }
    }

    fn persist_taxonomy(&self) {
        if let Err(err) = self
            .gateway
            .save_custom_subcategories(self.taxonomy.customs())
        {
            warn!("event=persist module=engine status=error table=custom_subcategories error={err}");
        }
        let hidden = self.taxonomy.hidden_builtins();
        if let Err(err) = self.gateway.save_hidden_builtins(&hidden) {
            warn!("event=persist module=engine status=error table=hidden_builtin_subcategories error={err}");
        }
        if let Err(err) = self.gateway.save_subcategory_order(self.taxonomy.order()) {
            warn!("event=persist module=engine status=error table=subcategory_order error={err}");
        }
    }

    fn persist_ledger(&self) {
        if let Err(err) = self.gateway.save_activity_log(self.ledger.entries()) {
            warn!("event=persist module=engine status=error table=activity_log error={err}");
        }
    }
}
