//! Two-tier subcategory taxonomy model.
//!
//! # Responsibility
//! - Enumerate the static built-in subcategory catalog.
//! - Define the user-owned custom subcategory record.
//! - Define the tagged reference type items use to point at a subcategory.
//!
//! # Invariants
//! - Built-in definitions are never mutated at runtime; they are only hidden
//!   from visibility or promoted into customs.
//! - A `SubcategoryRef::Custom` id is stable for the lifetime of the custom
//!   record, so custom renames never require item migration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::names_equal;

/// Stable identifier for a user-created subcategory.
pub type SubcategoryId = Uuid;

/// Reference from an inventory item to its subcategory.
///
/// Built-ins are addressed by catalog name, customs by stable id. Keeping the
/// two namespaces in one tagged type avoids stringly-typed ambiguity between
/// a built-in name and a custom id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SubcategoryRef {
    /// Catalog name of a built-in subcategory.
    Builtin(String),
    /// Stable id of a custom subcategory.
    Custom(SubcategoryId),
}

/// Statically shipped subcategory definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSubcategory {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub category: &'static str,
    /// Starter items offered when the subcategory is first populated.
    pub sample_items: &'static [&'static str],
}

/// Built-in catalog, in fixed presentation order within each category.
pub const BUILTIN_SUBCATEGORIES: &[BuiltinSubcategory] = &[
    BuiltinSubcategory {
        name: "Dairy",
        icon: "cheese",
        color: "#F6C445",
        category: "Food",
        sample_items: &["Milk", "Butter", "Yogurt", "Cheese"],
    },
    BuiltinSubcategory {
        name: "Produce",
        icon: "carrot",
        color: "#6FBF5A",
        category: "Food",
        sample_items: &["Apples", "Bananas", "Carrots", "Onions"],
    },
    BuiltinSubcategory {
        name: "Bakery",
        icon: "bread",
        color: "#C98A4B",
        category: "Food",
        sample_items: &["Bread", "Bagels"],
    },
    BuiltinSubcategory {
        name: "Meat & Seafood",
        icon: "drumstick",
        color: "#D95C5C",
        category: "Food",
        sample_items: &["Chicken", "Ground Beef", "Salmon"],
    },
    BuiltinSubcategory {
        name: "Frozen",
        icon: "snowflake",
        color: "#7EC8E3",
        category: "Food",
        sample_items: &["Frozen Peas", "Ice Cream"],
    },
    BuiltinSubcategory {
        name: "Pantry Staples",
        icon: "jar",
        color: "#B08968",
        category: "Food",
        sample_items: &["Rice", "Pasta", "Flour", "Sugar", "Olive Oil"],
    },
    BuiltinSubcategory {
        name: "Beverages",
        icon: "cup",
        color: "#5C8AD9",
        category: "Food",
        sample_items: &["Coffee", "Tea", "Orange Juice"],
    },
    BuiltinSubcategory {
        name: "Snacks",
        icon: "pretzel",
        color: "#E3A857",
        category: "Food",
        sample_items: &["Crackers", "Nuts", "Granola Bars"],
    },
    BuiltinSubcategory {
        name: "Cleaning Supplies",
        icon: "spray",
        color: "#4FB3A9",
        category: "Household",
        sample_items: &["Dish Soap", "All-Purpose Cleaner", "Sponges"],
    },
    BuiltinSubcategory {
        name: "Paper Goods",
        icon: "roll",
        color: "#9B9B9B",
        category: "Household",
        sample_items: &["Paper Towels", "Toilet Paper", "Tissues"],
    },
    BuiltinSubcategory {
        name: "Laundry",
        icon: "shirt",
        color: "#8E7CC3",
        category: "Household",
        sample_items: &["Detergent", "Fabric Softener"],
    },
    BuiltinSubcategory {
        name: "Bath & Body",
        icon: "soap",
        color: "#E58FB1",
        category: "Personal Care",
        sample_items: &["Shampoo", "Toothpaste", "Hand Soap"],
    },
    BuiltinSubcategory {
        name: "Medicine",
        icon: "pill",
        color: "#D96A6A",
        category: "Personal Care",
        sample_items: &["Pain Reliever", "Band-Aids"],
    },
];

/// Looks up a built-in definition by case-insensitive, trimmed name.
pub fn builtin_by_name(name: &str) -> Option<&'static BuiltinSubcategory> {
    BUILTIN_SUBCATEGORIES
        .iter()
        .find(|builtin| names_equal(builtin.name, name))
}

/// User-created subcategory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSubcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub category: String,
}

impl CustomSubcategory {
    /// Creates a custom subcategory with a generated stable id.
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            category: category.into(),
        }
    }
}

/// Presentation data a subcategory reference resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryStyle {
    pub icon: String,
    pub color: String,
    pub category: String,
}

impl SubcategoryStyle {
    pub fn of_builtin(builtin: &BuiltinSubcategory) -> Self {
        Self {
            icon: builtin.icon.to_string(),
            color: builtin.color.to_string(),
            category: builtin.category.to_string(),
        }
    }

    pub fn of_custom(custom: &CustomSubcategory) -> Self {
        Self {
            icon: custom.icon.clone(),
            color: custom.color.clone(),
            category: custom.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{builtin_by_name, BUILTIN_SUBCATEGORIES};
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique_case_insensitively() {
        let mut seen = HashSet::new();
        for builtin in BUILTIN_SUBCATEGORIES {
            assert!(
                seen.insert(builtin.name.to_lowercase()),
                "duplicate builtin name: {}",
                builtin.name
            );
        }
    }

    #[test]
    fn builtin_lookup_is_case_insensitive() {
        let dairy = builtin_by_name("  dAiRy ").expect("Dairy should resolve");
        assert_eq!(dairy.category, "Food");
        assert!(builtin_by_name("No Such Aisle").is_none());
    }
}
