use homestock_core::{
    InventoryEngine, ItemId, MemoryGateway, ShoppingState, SubcategoryRef,
};

fn engine() -> InventoryEngine<MemoryGateway> {
    let mut engine = InventoryEngine::new(MemoryGateway::new());
    engine.load().unwrap();
    engine
}

fn pantry() -> SubcategoryRef {
    SubcategoryRef::Builtin("Pantry Staples".to_string())
}

fn add_with_quantity(
    engine: &mut InventoryEngine<MemoryGateway>,
    name: &str,
    quantity: f64,
) -> ItemId {
    let id = engine.add_item(name, pantry()).unwrap();
    engine.update_quantity(id, quantity);
    id
}

#[test]
fn generation_selects_below_threshold_excluding_ignored() {
    let mut engine = engine();
    add_with_quantity(&mut engine, "Eggs", 0.10);
    add_with_quantity(&mut engine, "Bread", 0.30);
    let rice = add_with_quantity(&mut engine, "Rice", 0.20);
    engine.toggle_item_ignored(rice);

    engine.generate_shopping_list();

    assert_eq!(engine.shopping_state(), ShoppingState::Generating);
    let names: Vec<_> = engine
        .shopping_list()
        .iter()
        .map(|entry| entry.name.clone())
        .collect();
    assert_eq!(names, vec!["Eggs"]);
}

#[test]
fn generation_orders_most_urgent_first() {
    let mut engine = engine();
    add_with_quantity(&mut engine, "Flour", 0.20);
    add_with_quantity(&mut engine, "Sugar", 0.05);
    add_with_quantity(&mut engine, "Salt", 0.10);

    engine.generate_shopping_list();

    let names: Vec<_> = engine
        .shopping_list()
        .iter()
        .map(|entry| entry.name.clone())
        .collect();
    assert_eq!(names, vec!["Sugar", "Salt", "Flour"]);
}

#[test]
fn threshold_boundary_is_strict() {
    let mut engine = engine();
    add_with_quantity(&mut engine, "Rice", 0.25);

    engine.generate_shopping_list();
    assert!(engine.shopping_list().is_empty());
    assert_eq!(engine.shopping_state(), ShoppingState::Generating);
}

#[test]
fn full_lifecycle_restocks_checked_items() {
    let mut engine = engine();
    let eggs = add_with_quantity(&mut engine, "Eggs", 0.10);

    engine.generate_shopping_list();
    engine.finalize_shopping_list();
    assert_eq!(engine.shopping_state(), ShoppingState::ListReady);
    engine.start_shopping();
    assert_eq!(engine.shopping_state(), ShoppingState::Shopping);

    let entry_id = engine.shopping_list()[0].id;
    engine.toggle_shopping_entry(entry_id);
    engine.complete_shopping();

    assert_eq!(engine.shopping_state(), ShoppingState::Empty);
    assert!(engine.shopping_list().is_empty());
    let item = engine.item(eggs).unwrap();
    assert_eq!(item.quantity, 1.0);
    assert_eq!(item.purchase_history.len(), 1);
}

#[test]
fn complete_clears_ignore_flag_of_fulfilled_items() {
    let mut engine = engine();
    let eggs = add_with_quantity(&mut engine, "Eggs", 0.10);

    engine.generate_shopping_list();
    engine.toggle_item_ignored(eggs);
    engine.finalize_shopping_list();
    engine.start_shopping();
    let entry_id = engine.shopping_list()[0].id;
    engine.toggle_shopping_entry(entry_id);
    engine.complete_shopping();

    assert!(!engine.item(eggs).unwrap().is_ignored);
}

#[test]
fn unchecked_and_temporary_entries_are_not_restocked() {
    let mut engine = engine();
    let eggs = add_with_quantity(&mut engine, "Eggs", 0.10);
    let flour = add_with_quantity(&mut engine, "Flour", 0.15);

    engine.generate_shopping_list();
    engine.add_misc_item("Birthday Candles").unwrap();
    engine.finalize_shopping_list();
    engine.start_shopping();

    let eggs_entry = engine
        .shopping_list()
        .iter()
        .find(|entry| entry.inventory_item_id == Some(eggs))
        .unwrap()
        .id;
    let candles_entry = engine
        .shopping_list()
        .iter()
        .find(|entry| entry.is_temporary)
        .unwrap()
        .id;
    engine.toggle_shopping_entry(eggs_entry);
    engine.toggle_shopping_entry(candles_entry);
    engine.complete_shopping();

    assert_eq!(engine.item(eggs).unwrap().quantity, 1.0);
    assert_eq!(engine.item(flour).unwrap().quantity, 0.15);
    assert!(engine.item(flour).unwrap().purchase_history.is_empty());
}

#[test]
fn misc_add_auto_promotes_empty_to_generating() {
    let mut engine = engine();
    assert_eq!(engine.shopping_state(), ShoppingState::Empty);

    engine.add_misc_item("Batteries").unwrap();
    assert_eq!(engine.shopping_state(), ShoppingState::Generating);
    assert!(engine.shopping_list()[0].is_temporary);

    assert!(engine.add_misc_item("   ").is_err());
    assert_eq!(engine.shopping_list().len(), 1);
}

#[test]
fn backing_item_cannot_be_listed_twice() {
    let mut engine = engine();
    let eggs = add_with_quantity(&mut engine, "Eggs", 0.10);

    engine.generate_shopping_list();
    engine.add_item_to_shopping_list(eggs);
    assert_eq!(engine.shopping_list().len(), 1);
}

#[test]
fn out_of_state_operations_are_noops() {
    let mut engine = engine();
    add_with_quantity(&mut engine, "Eggs", 0.10);

    // finalize/start/toggle/complete all require specific states.
    engine.finalize_shopping_list();
    assert_eq!(engine.shopping_state(), ShoppingState::Empty);

    engine.generate_shopping_list();
    engine.start_shopping();
    assert_eq!(engine.shopping_state(), ShoppingState::Generating);

    engine.finalize_shopping_list();
    engine.add_misc_item("Late Addition").unwrap();
    assert_eq!(engine.shopping_list().len(), 1);

    engine.complete_shopping();
    assert_eq!(engine.shopping_state(), ShoppingState::ListReady);
}

#[test]
fn finalize_rejects_an_empty_list() {
    let mut engine = engine();
    engine.add_misc_item("Batteries").unwrap();
    let entry_id = engine.shopping_list()[0].id;
    engine.remove_shopping_entry(entry_id);

    engine.finalize_shopping_list();
    assert_eq!(engine.shopping_state(), ShoppingState::Generating);
}

#[test]
fn cancel_discards_progress_from_any_active_state() {
    let mut engine = engine();
    add_with_quantity(&mut engine, "Eggs", 0.10);

    engine.generate_shopping_list();
    engine.finalize_shopping_list();
    engine.start_shopping();
    engine.cancel_shopping();

    assert_eq!(engine.shopping_state(), ShoppingState::Empty);
    assert!(engine.shopping_list().is_empty());
}

#[test]
fn removing_last_backing_item_forces_state_to_empty() {
    let mut engine = engine();
    let eggs = add_with_quantity(&mut engine, "Eggs", 0.10);

    engine.generate_shopping_list();
    engine.finalize_shopping_list();
    assert_eq!(engine.shopping_state(), ShoppingState::ListReady);

    engine.remove_item(eggs);
    assert_eq!(engine.shopping_state(), ShoppingState::Empty);
    assert!(engine.shopping_list().is_empty());
}

#[test]
fn rename_resyncs_denormalized_entry_names() {
    let mut engine = engine();
    let eggs = add_with_quantity(&mut engine, "Eggs", 0.10);

    engine.generate_shopping_list();
    engine.rename_item(eggs, "Free-Range Eggs").unwrap();

    assert_eq!(engine.shopping_list()[0].name, "Free-Range Eggs");
}
