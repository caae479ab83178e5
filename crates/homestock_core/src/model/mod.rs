//! Canonical domain model for household inventory tracking.
//!
//! # Responsibility
//! - Define the serde data structures shared by engine and gateways.
//! - Keep presentation/storage concerns out of the domain shapes.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Name comparisons across the domain are case-insensitive and trimmed.
//! - Timestamps are `chrono::DateTime<Utc>` in memory and RFC 3339 strings on
//!   every wire.

pub mod activity;
pub mod item;
pub mod shopping;
pub mod subcategory;

/// Canonical form used for every name-uniqueness comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive, trimmed name equality.
pub fn names_equal(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

#[cfg(test)]
mod tests {
    use super::names_equal;

    #[test]
    fn names_equal_ignores_case_and_outer_whitespace() {
        assert!(names_equal("  Milk ", "milk"));
        assert!(names_equal("Käse", "KÄSE"));
        assert!(!names_equal("Milk", "Milkk"));
    }
}
