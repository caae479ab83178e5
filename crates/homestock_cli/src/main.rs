//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `homestock_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("homestock_core ping={}", homestock_core::ping());
    println!("homestock_core version={}", homestock_core::core_version());
}
