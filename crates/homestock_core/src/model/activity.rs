//! Activity ledger model.
//!
//! # Responsibility
//! - Define the append-only activity entry and its undo payload.
//!
//! # Invariants
//! - `details.item_snapshot` is an owned deep copy captured immediately
//!   before the mutation, never a reference into the live store.
//! - `is_undone` is set once and never cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::item::{InventoryItem, ItemId};

/// Stable identifier for a ledger entry.
pub type ActivityId = Uuid;

/// Mutation kinds the ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    AddItem,
    RemoveItem,
    UpdateQuantity,
    UpdateName,
    Restock,
    ToggleIgnore,
}

impl ActivityAction {
    /// Stable lowercase token used for storage and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddItem => "add_item",
            Self::RemoveItem => "remove_item",
            Self::UpdateQuantity => "update_quantity",
            Self::UpdateName => "update_name",
            Self::Restock => "restock",
            Self::ToggleIgnore => "toggle_ignore",
        }
    }

    /// Parses the token produced by [`ActivityAction::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "add_item" => Some(Self::AddItem),
            "remove_item" => Some(Self::RemoveItem),
            "update_quantity" => Some(Self::UpdateQuantity),
            "update_name" => Some(Self::UpdateName),
            "restock" => Some(Self::Restock),
            "toggle_ignore" => Some(Self::ToggleIgnore),
            _ => None,
        }
    }
}

/// Optional reversal payload attached to a ledger entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityDetails {
    /// Human-readable value before the mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<String>,
    /// Human-readable value after the mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Full pre-mutation copy of the item, used to reverse the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_snapshot: Option<InventoryItem>,
}

impl ActivityDetails {
    /// Details carrying only a reversal snapshot.
    pub fn snapshot(item: InventoryItem) -> Self {
        Self {
            item_snapshot: Some(item),
            ..Self::default()
        }
    }

    /// Details carrying a value transition plus the reversal snapshot.
    pub fn change(
        previous: impl Into<String>,
        new: impl Into<String>,
        snapshot: InventoryItem,
    ) -> Self {
        Self {
            previous_value: Some(previous.into()),
            new_value: Some(new.into()),
            item_snapshot: Some(snapshot),
        }
    }
}

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: ActivityId,
    pub action: ActivityAction,
    pub item_id: ItemId,
    /// Item name at record time, kept for display after removal.
    pub item_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: ActivityDetails,
    #[serde(default)]
    pub is_undone: bool,
}

impl ActivityLogEntry {
    pub fn new(
        action: ActivityAction,
        item_id: ItemId,
        item_name: impl Into<String>,
        details: ActivityDetails,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            item_id,
            item_name: item_name.into(),
            timestamp,
            details,
            is_undone: false,
        }
    }
}
