//! Shopping trip model: cart entries and workflow state.
//!
//! # Invariants
//! - `inventory_item_id` is `Some` exactly when the entry is not temporary.
//! - At most one non-temporary entry references a given inventory item.
//! - `name` is a denormalized copy of the backing item name, resynced on
//!   rename by the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::item::{InventoryItem, ItemId};

/// Stable identifier for a shopping list entry.
pub type ListEntryId = Uuid;

/// Workflow state of the shopping trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingState {
    /// No active list.
    #[default]
    Empty,
    /// List is being assembled and edited.
    Generating,
    /// List is finalized and waiting for the trip to start.
    ListReady,
    /// Trip in progress; entries are being checked off.
    Shopping,
}

impl ShoppingState {
    /// Stable lowercase token used for storage and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Generating => "generating",
            Self::ListReady => "list_ready",
            Self::Shopping => "shopping",
        }
    }

    /// Parses the token produced by [`ShoppingState::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "empty" => Some(Self::Empty),
            "generating" => Some(Self::Generating),
            "list_ready" => Some(Self::ListReady),
            "shopping" => Some(Self::Shopping),
            _ => None,
        }
    }
}

/// One cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: ListEntryId,
    /// Denormalized copy of the backing item name, or the misc label.
    pub name: String,
    #[serde(default)]
    pub is_checked: bool,
    /// `true` for "misc" entries with no backing inventory item.
    #[serde(default)]
    pub is_temporary: bool,
    pub inventory_item_id: Option<ItemId>,
}

impl ShoppingListItem {
    /// Creates a non-temporary entry backed by an inventory item.
    pub fn for_item(item: &InventoryItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: item.name.clone(),
            is_checked: false,
            is_temporary: false,
            inventory_item_id: Some(item.id),
        }
    }

    /// Creates a temporary "misc" entry with no backing item.
    pub fn temporary(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_checked: false,
            is_temporary: true,
            inventory_item_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ShoppingState;

    #[test]
    fn state_tokens_roundtrip() {
        for state in [
            ShoppingState::Empty,
            ShoppingState::Generating,
            ShoppingState::ListReady,
            ShoppingState::Shopping,
        ] {
            assert_eq!(ShoppingState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ShoppingState::parse("paused"), None);
    }
}
