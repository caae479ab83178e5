//! Persistence gateway contract and implementations.
//!
//! # Responsibility
//! - Define the load/save contract the engine persists through, one pair per
//!   logical table.
//! - Isolate storage encoding (SQLite, JSON columns, RFC 3339 timestamps)
//!   from domain logic.
//!
//! # Invariants
//! - Every save receives the complete collection; semantics are full
//!   overwrite, never incremental.
//! - Loads return empty defaults for absent data, not errors.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::activity::ActivityLogEntry;
use crate::model::item::InventoryItem;
use crate::model::shopping::{ShoppingListItem, ShoppingState};
use crate::model::subcategory::CustomSubcategory;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

/// Explicit subcategory presentation order per category.
pub type SubcategoryOrderMap = BTreeMap<String, Vec<String>>;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Storage-layer failure surfaced by gateway implementations.
#[derive(Debug)]
pub enum GatewayError {
    Sqlite(rusqlite::Error),
    Encoding(serde_json::Error),
    InvalidData(String),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}

/// Load/save primitives the engine persists through.
///
/// Implementations are synchronous; the engine assumes single-owner,
/// serialized invocation and awaits nothing.
pub trait PersistenceGateway {
    fn load_inventory_items(&self) -> GatewayResult<Vec<InventoryItem>>;
    fn save_inventory_items(&self, items: &[InventoryItem]) -> GatewayResult<()>;

    fn load_shopping_list(&self) -> GatewayResult<Vec<ShoppingListItem>>;
    fn save_shopping_list(&self, entries: &[ShoppingListItem]) -> GatewayResult<()>;

    fn load_shopping_state(&self) -> GatewayResult<ShoppingState>;
    fn save_shopping_state(&self, state: ShoppingState) -> GatewayResult<()>;

    fn load_custom_subcategories(&self) -> GatewayResult<Vec<CustomSubcategory>>;
    fn save_custom_subcategories(&self, subcategories: &[CustomSubcategory]) -> GatewayResult<()>;

    fn load_hidden_builtins(&self) -> GatewayResult<Vec<String>>;
    fn save_hidden_builtins(&self, names: &[String]) -> GatewayResult<()>;

    fn load_subcategory_order(&self) -> GatewayResult<SubcategoryOrderMap>;
    fn save_subcategory_order(&self, order: &SubcategoryOrderMap) -> GatewayResult<()>;

    fn load_activity_log(&self) -> GatewayResult<Vec<ActivityLogEntry>>;
    fn save_activity_log(&self, entries: &[ActivityLogEntry]) -> GatewayResult<()>;
}
