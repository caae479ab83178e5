//! Subcategory taxonomy: built-in catalog overlaid with customs.
//!
//! # Responsibility
//! - Resolve subcategory references to presentation data.
//! - Enforce name uniqueness across the visible builtin and custom
//!   namespaces.
//! - Own the hidden-builtins mask and per-category presentation order.
//!
//! # Invariants
//! - No visible builtin and custom share a case-insensitive trimmed name.
//! - Hiding never deletes a builtin definition; stale item references still
//!   resolve through the hidden definition as a rendering fallback.

use std::collections::BTreeSet;

use log::warn;

use crate::engine::EngineError;
use crate::gateway::SubcategoryOrderMap;
use crate::model::names_equal;
use crate::model::subcategory::{
    builtin_by_name, CustomSubcategory, SubcategoryId, SubcategoryRef, SubcategoryStyle,
    BUILTIN_SUBCATEGORIES,
};

/// Outcome of promoting a builtin into a custom subcategory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Id of the newly created custom record.
    pub custom_id: SubcategoryId,
    /// Catalog name that was added to the hidden set.
    pub hidden_name: String,
    /// `false` for cosmetic promotions keeping the builtin name; member
    /// items then resolve through the custom-by-name fallback and no item
    /// migration is needed.
    pub requires_migration: bool,
}

/// Merged view over the static catalog and user-defined subcategories.
#[derive(Debug, Default)]
pub struct Taxonomy {
    customs: Vec<CustomSubcategory>,
    hidden_builtins: BTreeSet<String>,
    order: SubcategoryOrderMap,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        customs: Vec<CustomSubcategory>,
        hidden_builtins: Vec<String>,
        order: SubcategoryOrderMap,
    ) -> Self {
        Self {
            customs,
            hidden_builtins: hidden_builtins.into_iter().collect(),
            order,
        }
    }

    pub fn customs(&self) -> &[CustomSubcategory] {
        &self.customs
    }

    pub fn hidden_builtins(&self) -> Vec<String> {
        self.hidden_builtins.iter().cloned().collect()
    }

    pub fn order(&self) -> &SubcategoryOrderMap {
        &self.order
    }

    pub fn is_builtin_hidden(&self, name: &str) -> bool {
        self.hidden_builtins
            .iter()
            .any(|hidden| names_equal(hidden, name))
    }

    pub fn custom_by_id(&self, id: SubcategoryId) -> Option<&CustomSubcategory> {
        self.customs.iter().find(|custom| custom.id == id)
    }

    pub fn custom_by_name(&self, name: &str) -> Option<&CustomSubcategory> {
        self.customs
            .iter()
            .find(|custom| names_equal(&custom.name, name))
    }

    /// Resolves a reference to presentation data.
    ///
    /// Builtin names check the visible catalog first, then customs by name
    /// (covers cosmetic promotions), then the hidden catalog definition so
    /// rendering never breaks on stale references.
    pub fn resolve(&self, subcategory: &SubcategoryRef) -> Option<SubcategoryStyle> {
        match subcategory {
            SubcategoryRef::Builtin(name) => {
                if let Some(builtin) = builtin_by_name(name) {
                    if !self.is_builtin_hidden(builtin.name) {
                        return Some(SubcategoryStyle::of_builtin(builtin));
                    }
                }
                if let Some(custom) = self.custom_by_name(name) {
                    return Some(SubcategoryStyle::of_custom(custom));
                }
                builtin_by_name(name).map(SubcategoryStyle::of_builtin)
            }
            SubcategoryRef::Custom(id) => self.custom_by_id(*id).map(SubcategoryStyle::of_custom),
        }
    }

    /// Returns the human-readable `"Category > Name"` location of the
    /// subcategory colliding with `name`, if any.
    ///
    /// Checks every custom and every non-hidden builtin, minus exclusions.
    pub fn find_name_conflict(
        &self,
        name: &str,
        exclude_custom: Option<SubcategoryId>,
        exclude_builtin: Option<&str>,
    ) -> Option<String> {
        if let Some(custom) = self
            .customs
            .iter()
            .filter(|custom| Some(custom.id) != exclude_custom)
            .find(|custom| names_equal(&custom.name, name))
        {
            return Some(format!("{} > {}", custom.category, custom.name));
        }

        BUILTIN_SUBCATEGORIES
            .iter()
            .filter(|builtin| !self.is_builtin_hidden(builtin.name))
            .filter(|builtin| {
                exclude_builtin.map_or(true, |excluded| !names_equal(builtin.name, excluded))
            })
            .find(|builtin| names_equal(builtin.name, name))
            .map(|builtin| format!("{} > {}", builtin.category, builtin.name))
    }

    /// Creates a custom subcategory.
    ///
    /// # Errors
    /// - [`EngineError::BlankName`] when the trimmed name is empty.
    /// - [`EngineError::DuplicateSubcategoryName`] on a visible collision.
    pub fn add_custom(
        &mut self,
        name: &str,
        icon: &str,
        color: &str,
        category: &str,
    ) -> Result<SubcategoryId, EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BlankName);
        }
        if let Some(location) = self.find_name_conflict(trimmed, None, None) {
            return Err(EngineError::DuplicateSubcategoryName {
                name: trimmed.to_string(),
                location,
            });
        }

        let custom = CustomSubcategory::new(trimmed, icon, color, category);
        let id = custom.id;
        self.customs.push(custom);
        Ok(id)
    }

    /// Rewrites an existing custom record. Unknown ids are a logged no-op
    /// (`Ok(false)`).
    ///
    /// # Errors
    /// - [`EngineError::BlankName`] when the trimmed name is empty.
    /// - [`EngineError::DuplicateSubcategoryName`] on a collision with any
    ///   other visible subcategory.
    pub fn update_custom(
        &mut self,
        id: SubcategoryId,
        name: &str,
        icon: &str,
        color: &str,
        category: &str,
    ) -> Result<bool, EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BlankName);
        }
        if self.custom_by_id(id).is_none() {
            warn!("event=subcategory_update module=taxonomy status=skipped reason=not_found subcategory_id={id}");
            return Ok(false);
        }
        if let Some(location) = self.find_name_conflict(trimmed, Some(id), None) {
            return Err(EngineError::DuplicateSubcategoryName {
                name: trimmed.to_string(),
                location,
            });
        }

        if let Some(custom) = self.customs.iter_mut().find(|custom| custom.id == id) {
            custom.name = trimmed.to_string();
            custom.icon = icon.to_string();
            custom.color = color.to_string();
            custom.category = category.to_string();
        }
        Ok(true)
    }

    /// Promotes a builtin into a custom subcategory: hides the builtin and
    /// creates the custom record. The caller migrates member items when
    /// `requires_migration` is set and persists hidden set, customs and
    /// items as one logical transaction.
    ///
    /// # Errors
    /// - [`EngineError::UnknownBuiltin`] when no such builtin exists.
    /// - [`EngineError::BlankName`] when the trimmed new name is empty.
    /// - [`EngineError::DuplicateSubcategoryName`] when the new name
    ///   collides with anything other than the promoted builtin itself.
    pub fn promote(
        &mut self,
        builtin_name: &str,
        new_name: &str,
        icon: &str,
        color: &str,
        category: &str,
    ) -> Result<Promotion, EngineError> {
        let Some(builtin) = builtin_by_name(builtin_name) else {
            return Err(EngineError::UnknownBuiltin(builtin_name.to_string()));
        };
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BlankName);
        }
        if let Some(location) = self.find_name_conflict(trimmed, None, Some(builtin.name)) {
            return Err(EngineError::DuplicateSubcategoryName {
                name: trimmed.to_string(),
                location,
            });
        }

        self.hidden_builtins.insert(builtin.name.to_string());
        let custom = CustomSubcategory::new(trimmed, icon, color, category);
        let custom_id = custom.id;
        self.customs.push(custom);

        Ok(Promotion {
            custom_id,
            hidden_name: builtin.name.to_string(),
            requires_migration: !names_equal(trimmed, builtin.name),
        })
    }

    /// Adds a builtin to the hidden set. Returns `false` for unknown names.
    pub fn hide_builtin(&mut self, name: &str) -> bool {
        let Some(builtin) = builtin_by_name(name) else {
            warn!("event=subcategory_hide module=taxonomy status=skipped reason=unknown_builtin name={name}");
            return false;
        };
        self.hidden_builtins.insert(builtin.name.to_string())
    }

    /// Deletes a custom record. Unknown ids are a logged no-op.
    pub fn remove_custom(&mut self, id: SubcategoryId) -> Option<CustomSubcategory> {
        let index = self.customs.iter().position(|custom| custom.id == id);
        match index {
            Some(index) => Some(self.customs.remove(index)),
            None => {
                warn!("event=subcategory_remove module=taxonomy status=skipped reason=not_found subcategory_id={id}");
                None
            }
        }
    }

    /// Replaces the explicit presentation order for one category.
    pub fn set_order(&mut self, category: &str, names: Vec<String>) {
        self.order.insert(category.to_string(), names);
    }

    /// Strips a removed subcategory's name from every category's explicit
    /// order so the persisted order table never accumulates stale names.
    pub fn prune_order(&mut self, name: &str) -> bool {
        let mut changed = false;
        for names in self.order.values_mut() {
            let before = names.len();
            names.retain(|existing| !names_equal(existing, name));
            changed |= names.len() != before;
        }
        changed
    }

    /// Visible subcategory names for a category, in discovery order:
    /// catalog order for builtins, then custom insertion order.
    pub fn visible_names(&self, category: &str) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_SUBCATEGORIES
            .iter()
            .filter(|builtin| names_equal(builtin.category, category))
            .filter(|builtin| !self.is_builtin_hidden(builtin.name))
            .map(|builtin| builtin.name.to_string())
            .collect();
        names.extend(
            self.customs
                .iter()
                .filter(|custom| names_equal(&custom.category, category))
                .map(|custom| custom.name.clone()),
        );
        names
    }

    /// Visible subcategory names for a category: names present in the
    /// explicit order first (in that order), remainder appended in
    /// discovery order.
    pub fn ordered_subcategories(&self, category: &str) -> Vec<String> {
        let discovered = self.visible_names(category);
        let Some(explicit) = self.order.get(category) else {
            return discovered;
        };

        let mut ordered: Vec<String> = Vec::with_capacity(discovered.len());
        for name in explicit {
            if let Some(found) = discovered.iter().find(|candidate| names_equal(candidate, name)) {
                if !ordered.iter().any(|existing| names_equal(existing, found)) {
                    ordered.push(found.clone());
                }
            }
        }
        for name in discovered {
            if !ordered.iter().any(|existing| names_equal(existing, &name)) {
                ordered.push(name);
            }
        }
        ordered
    }

    /// Replaces the hidden set wholesale; used by import.
    pub fn set_hidden_builtins(&mut self, names: BTreeSet<String>) {
        self.hidden_builtins = names;
    }

    /// Replaces the customs wholesale; used by import.
    pub fn set_customs(&mut self, customs: Vec<CustomSubcategory>) {
        self.customs = customs;
    }

    /// Replaces the order map wholesale; used by import.
    pub fn set_order_map(&mut self, order: SubcategoryOrderMap) {
        self.order = order;
    }
}
