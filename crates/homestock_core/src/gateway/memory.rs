//! In-memory gateway for tests and ephemeral hosts.
//!
//! # Responsibility
//! - Mirror the full-overwrite gateway contract without touching disk.
//! - Optionally inject save failures so callers can exercise the engine's
//!   swallow-and-log persistence policy.

use std::cell::{Cell, RefCell};

use crate::gateway::{
    GatewayError, GatewayResult, PersistenceGateway, SubcategoryOrderMap,
};
use crate::model::activity::ActivityLogEntry;
use crate::model::item::InventoryItem;
use crate::model::shopping::{ShoppingListItem, ShoppingState};
use crate::model::subcategory::CustomSubcategory;

#[derive(Debug, Default)]
struct MemoryTables {
    inventory_items: Vec<InventoryItem>,
    shopping_list: Vec<ShoppingListItem>,
    shopping_state: ShoppingState,
    custom_subcategories: Vec<CustomSubcategory>,
    hidden_builtins: Vec<String>,
    subcategory_order: SubcategoryOrderMap,
    activity_log: Vec<ActivityLogEntry>,
}

/// Gateway backed by plain in-process collections.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: RefCell<MemoryTables>,
    fail_saves: Cell<bool>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every save returns an error without mutating the tables.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    fn check_writable(&self) -> GatewayResult<()> {
        if self.fail_saves.get() {
            return Err(GatewayError::InvalidData(
                "save failure injected".to_string(),
            ));
        }
        Ok(())
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load_inventory_items(&self) -> GatewayResult<Vec<InventoryItem>> {
        Ok(self.tables.borrow().inventory_items.clone())
    }

    fn save_inventory_items(&self, items: &[InventoryItem]) -> GatewayResult<()> {
        self.check_writable()?;
        self.tables.borrow_mut().inventory_items = items.to_vec();
        Ok(())
    }

    fn load_shopping_list(&self) -> GatewayResult<Vec<ShoppingListItem>> {
        Ok(self.tables.borrow().shopping_list.clone())
    }

    fn save_shopping_list(&self, entries: &[ShoppingListItem]) -> GatewayResult<()> {
        self.check_writable()?;
        self.tables.borrow_mut().shopping_list = entries.to_vec();
        Ok(())
    }

    fn load_shopping_state(&self) -> GatewayResult<ShoppingState> {
        Ok(self.tables.borrow().shopping_state)
    }

    fn save_shopping_state(&self, state: ShoppingState) -> GatewayResult<()> {
        self.check_writable()?;
        self.tables.borrow_mut().shopping_state = state;
        Ok(())
    }

    fn load_custom_subcategories(&self) -> GatewayResult<Vec<CustomSubcategory>> {
        Ok(self.tables.borrow().custom_subcategories.clone())
    }

    fn save_custom_subcategories(&self, subcategories: &[CustomSubcategory]) -> GatewayResult<()> {
        self.check_writable()?;
        self.tables.borrow_mut().custom_subcategories = subcategories.to_vec();
        Ok(())
    }

    fn load_hidden_builtins(&self) -> GatewayResult<Vec<String>> {
        Ok(self.tables.borrow().hidden_builtins.clone())
    }

    fn save_hidden_builtins(&self, names: &[String]) -> GatewayResult<()> {
        self.check_writable()?;
        self.tables.borrow_mut().hidden_builtins = names.to_vec();
        Ok(())
    }

    fn load_subcategory_order(&self) -> GatewayResult<SubcategoryOrderMap> {
        Ok(self.tables.borrow().subcategory_order.clone())
    }

    fn save_subcategory_order(&self, order: &SubcategoryOrderMap) -> GatewayResult<()> {
        self.check_writable()?;
        self.tables.borrow_mut().subcategory_order = order.clone();
        Ok(())
    }

    fn load_activity_log(&self) -> GatewayResult<Vec<ActivityLogEntry>> {
        Ok(self.tables.borrow().activity_log.clone())
    }

    fn save_activity_log(&self, entries: &[ActivityLogEntry]) -> GatewayResult<()> {
        self.check_writable()?;
        self.tables.borrow_mut().activity_log = entries.to_vec();
        Ok(())
    }
}
