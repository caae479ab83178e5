//! Core domain logic for Homestock, a household inventory tracker.
//! This crate is the single source of truth for business invariants.

pub mod engine;
pub mod gateway;
pub mod logging;
pub mod model;

pub use engine::ledger::{UndoOp, MAX_ENTRIES, RETENTION_DAYS};
pub use engine::transfer::TransferPayload;
pub use engine::{EngineError, InventoryEngine, Subscription};
pub use gateway::{
    GatewayError, GatewayResult, MemoryGateway, PersistenceGateway, SqliteGateway,
    SubcategoryOrderMap,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::activity::{
    ActivityAction, ActivityDetails, ActivityId, ActivityLogEntry,
};
pub use model::item::{InventoryItem, ItemId, LOW_STOCK_THRESHOLD};
pub use model::shopping::{ListEntryId, ShoppingListItem, ShoppingState};
pub use model::subcategory::{
    builtin_by_name, BuiltinSubcategory, CustomSubcategory, SubcategoryId, SubcategoryRef,
    SubcategoryStyle, BUILTIN_SUBCATEGORIES,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
