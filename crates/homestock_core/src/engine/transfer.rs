//! Export/import payload for moving a household between devices.
//!
//! # Responsibility
//! - Define the boundary payload shape (JSON at the host edge).
//! - Derive the hidden-builtin set an import should apply, since exports
//!   intentionally omit it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::gateway::SubcategoryOrderMap;
use crate::model::item::InventoryItem;
use crate::model::names_equal;
use crate::model::shopping::ShoppingListItem;
use crate::model::subcategory::{CustomSubcategory, SubcategoryRef, BUILTIN_SUBCATEGORIES};

/// Complete exportable household state. The hidden-builtins mask is
/// deliberately absent; see [`hidden_builtins_for_import`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub inventory_items: Vec<InventoryItem>,
    #[serde(default)]
    pub custom_subcategories: Vec<CustomSubcategory>,
    #[serde(default)]
    pub shopping_list: Vec<ShoppingListItem>,
    #[serde(default)]
    pub subcategory_order: SubcategoryOrderMap,
}

/// Hidden set to apply when importing a payload without one: hide every
/// builtin, then un-hide each builtin actually referenced by an imported
/// item and not shadowed by an imported custom of the same name.
///
/// The asymmetric default keeps builtin tabs the export never captured from
/// silently resurfacing empty.
pub fn hidden_builtins_for_import(
    items: &[InventoryItem],
    customs: &[CustomSubcategory],
) -> BTreeSet<String> {
    let mut hidden: BTreeSet<String> = BUILTIN_SUBCATEGORIES
        .iter()
        .map(|builtin| builtin.name.to_string())
        .collect();

    for item in items {
        let SubcategoryRef::Builtin(name) = &item.subcategory else {
            continue;
        };
        let shadowed = customs.iter().any(|custom| names_equal(&custom.name, name));
        if shadowed {
            continue;
        }
        if let Some(builtin) = BUILTIN_SUBCATEGORIES
            .iter()
            .find(|builtin| names_equal(builtin.name, name))
        {
            hidden.remove(builtin.name);
        }
    }

    hidden
}
