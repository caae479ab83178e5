//! Shopping trip workflow: a state machine over the cart.
//!
//! # Responsibility
//! - Gate every cart mutation on the current [`ShoppingState`].
//! - Keep the cart consistent with the inventory (no dangling references,
//!   no duplicate backing items).
//!
//! # Invariants
//! - At most one non-temporary entry references a given inventory item.
//! - `Empty` implies an empty cart; removing the last entry while
//!   non-Empty force-repairs the state back to `Empty`.
//! - Out-of-state operations are logged no-ops, never errors.

use log::{info, warn};

use crate::model::item::{InventoryItem, ItemId};
use crate::model::shopping::{ListEntryId, ShoppingListItem, ShoppingState};

/// Cart plus workflow state.
#[derive(Debug, Default)]
pub struct ShoppingList {
    state: ShoppingState,
    entries: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds from persisted parts, repairing state/cart mismatches left
    /// by interrupted sessions.
    ///
    /// An empty cart while `Generating` is legal (generation can yield zero
    /// candidates) and survives reload; `ListReady` and `Shopping` require
    /// entries, since finalize guards against an empty list.
    pub fn from_parts(state: ShoppingState, entries: Vec<ShoppingListItem>) -> Self {
        match state {
            ShoppingState::Empty if !entries.is_empty() => {
                info!(
                    "event=shopping_load module=shopping status=repaired reason=entries_without_state dropped={}",
                    entries.len()
                );
                Self {
                    state: ShoppingState::Empty,
                    entries: Vec::new(),
                }
            }
            ShoppingState::ListReady | ShoppingState::Shopping if entries.is_empty() => {
                info!(
                    "event=shopping_load module=shopping status=repaired reason=state_without_entries state={}",
                    state.as_str()
                );
                Self::new()
            }
            _ => Self { state, entries },
        }
    }

    pub fn state(&self) -> ShoppingState {
        self.state
    }

    pub fn entries(&self) -> &[ShoppingListItem] {
        &self.entries
    }

    fn contains_item(&self, item_id: ItemId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.inventory_item_id == Some(item_id))
    }

    fn reject(&self, event: &str) {
        warn!(
            "event=shopping_{event} module=shopping status=rejected reason=invalid_state state={}",
            self.state.as_str()
        );
    }

    /// `Empty -> Generating`: rebuilds the cart from low-stock candidates,
    /// most urgent first.
    pub fn generate(&mut self, candidates: &[&InventoryItem]) -> bool {
        if self.state != ShoppingState::Empty {
            self.reject("generate");
            return false;
        }
        self.entries = candidates.iter().map(|item| ShoppingListItem::for_item(item)).collect();
        self.state = ShoppingState::Generating;
        true
    }

    /// Appends a temporary "misc" entry. Allowed while `Generating`; a
    /// first add auto-promotes `Empty -> Generating`.
    ///
    /// The caller validates the name; `name` arrives trimmed and non-empty.
    pub fn add_misc(&mut self, name: &str) -> bool {
        if !self.enter_generating("add_misc") {
            return false;
        }
        self.entries.push(ShoppingListItem::temporary(name));
        true
    }

    /// Appends a non-temporary entry for `item` unless already listed.
    /// Allowed while `Generating`; auto-promotes `Empty -> Generating`.
    pub fn add_item(&mut self, item: &InventoryItem) -> bool {
        if self.contains_item(item.id) {
            warn!(
                "event=shopping_add_item module=shopping status=skipped reason=already_listed item_id={}",
                item.id
            );
            return false;
        }
        if !self.enter_generating("add_item") {
            return false;
        }
        self.entries.push(ShoppingListItem::for_item(item));
        true
    }

    fn enter_generating(&mut self, event: &str) -> bool {
        match self.state {
            ShoppingState::Generating => true,
            ShoppingState::Empty => {
                self.state = ShoppingState::Generating;
                true
            }
            _ => {
                self.reject(event);
                false
            }
        }
    }

    /// Removes one entry while `Generating`.
    pub fn remove_entry(&mut self, entry_id: ListEntryId) -> bool {
        if self.state != ShoppingState::Generating {
            self.reject("remove_entry");
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != entry_id);
        if self.entries.len() == before {
            warn!("event=shopping_remove_entry module=shopping status=skipped reason=not_found entry_id={entry_id}");
            return false;
        }
        true
    }

    /// `Generating -> ListReady`, guarded on a non-empty cart.
    pub fn finalize(&mut self) -> bool {
        if self.state != ShoppingState::Generating {
            self.reject("finalize");
            return false;
        }
        if self.entries.is_empty() {
            warn!("event=shopping_finalize module=shopping status=rejected reason=empty_list");
            return false;
        }
        self.state = ShoppingState::ListReady;
        true
    }

    /// `ListReady -> Shopping`.
    pub fn start(&mut self) -> bool {
        if self.state != ShoppingState::ListReady {
            self.reject("start");
            return false;
        }
        self.state = ShoppingState::Shopping;
        true
    }

    /// Flips one entry's checked flag while `Shopping`.
    pub fn toggle_checked(&mut self, entry_id: ListEntryId) -> bool {
        if self.state != ShoppingState::Shopping {
            self.reject("toggle_checked");
            return false;
        }
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == entry_id) else {
            warn!("event=shopping_toggle module=shopping status=skipped reason=not_found entry_id={entry_id}");
            return false;
        };
        entry.is_checked = !entry.is_checked;
        true
    }

    /// `Shopping -> Empty`: clears the cart and returns the backing item
    /// ids of every checked, non-temporary entry for the caller to restock.
    pub fn complete(&mut self) -> Option<Vec<ItemId>> {
        if self.state != ShoppingState::Shopping {
            self.reject("complete");
            return None;
        }
        let fulfilled: Vec<ItemId> = self
            .entries
            .iter()
            .filter(|entry| entry.is_checked && !entry.is_temporary)
            .filter_map(|entry| entry.inventory_item_id)
            .collect();
        self.entries.clear();
        self.state = ShoppingState::Empty;
        Some(fulfilled)
    }

    /// `any non-Empty -> Empty`: discards the cart and progress.
    pub fn cancel(&mut self) -> bool {
        if self.state == ShoppingState::Empty {
            self.reject("cancel");
            return false;
        }
        self.entries.clear();
        self.state = ShoppingState::Empty;
        true
    }

    /// Inventory-removal cascade: strips referencing entries in any state.
    /// An emptied cart while non-Empty force-repairs to `Empty` so item
    /// deletion never leaves a dangling workflow.
    pub fn remove_backing_item(&mut self, item_id: ItemId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.inventory_item_id != Some(item_id));
        if self.entries.len() == before {
            return false;
        }
        if self.entries.is_empty() && self.state != ShoppingState::Empty {
            info!(
                "event=shopping_repair module=shopping status=forced_empty reason=last_entry_removed state={}",
                self.state.as_str()
            );
            self.state = ShoppingState::Empty;
        }
        true
    }

    /// Rename cascade: resyncs the denormalized entry name.
    pub fn sync_item_name(&mut self, item_id: ItemId, new_name: &str) -> bool {
        let mut changed = false;
        for entry in &mut self.entries {
            if entry.inventory_item_id == Some(item_id) && entry.name != new_name {
                entry.name = new_name.to_string();
                changed = true;
            }
        }
        changed
    }
}
