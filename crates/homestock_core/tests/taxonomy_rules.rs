use homestock_core::{
    EngineError, InventoryEngine, MemoryGateway, PersistenceGateway, ShoppingState,
    SubcategoryRef,
};

fn engine() -> InventoryEngine<MemoryGateway> {
    let mut engine = InventoryEngine::new(MemoryGateway::new());
    engine.load().unwrap();
    engine
}

#[test]
fn custom_name_may_not_collide_with_visible_builtin() {
    let mut engine = engine();
    let err = engine
        .add_custom_subcategory(" dairy ", "cheese", "#FFFFFF", "Food")
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::DuplicateSubcategoryName {
            name: "dairy".to_string(),
            location: "Food > Dairy".to_string(),
        }
    );
}

#[test]
fn custom_name_may_not_collide_with_another_custom() {
    let mut engine = engine();
    engine
        .add_custom_subcategory("Spices", "jar", "#AA3311", "Food")
        .unwrap();
    let err = engine
        .add_custom_subcategory("SPICES", "jar", "#AA3311", "Food")
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateSubcategoryName { location, .. }
        if location == "Food > Spices"));
}

#[test]
fn custom_rename_excludes_itself_from_the_conflict_check() {
    let mut engine = engine();
    let id = engine
        .add_custom_subcategory("Spices", "jar", "#AA3311", "Food")
        .unwrap();

    engine
        .update_custom_subcategory(id, "Spices & Herbs", "jar", "#AA3311", "Food")
        .unwrap();
    engine
        .update_custom_subcategory(id, "SPICES & HERBS", "jar", "#AA3311", "Food")
        .unwrap();

    let err = engine
        .update_custom_subcategory(id, "Dairy", "jar", "#AA3311", "Food")
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateSubcategoryName { .. }));
}

#[test]
fn promotion_with_rename_migrates_member_items() {
    let mut engine = engine();
    let pantry = SubcategoryRef::Builtin("Pantry Staples".to_string());
    let rice = engine.add_item("Rice", pantry.clone()).unwrap();
    let pasta = engine.add_item("Pasta", pantry.clone()).unwrap();
    let flour = engine.add_item("Flour", pantry.clone()).unwrap();
    let milk = engine
        .add_item("Milk", SubcategoryRef::Builtin("Dairy".to_string()))
        .unwrap();

    let custom_id = engine
        .promote_builtin("Pantry Staples", "Grains", "grain", "#B08968", "Food")
        .unwrap();

    for id in [rice, pasta, flour] {
        assert_eq!(
            engine.item(id).unwrap().subcategory,
            SubcategoryRef::Custom(custom_id)
        );
    }
    assert_eq!(
        engine.item(milk).unwrap().subcategory,
        SubcategoryRef::Builtin("Dairy".to_string())
    );

    // The new custom resolves; the stale builtin name falls back to the
    // hidden catalog definition so old references still render.
    let grains = engine
        .resolve_subcategory(&SubcategoryRef::Custom(custom_id))
        .unwrap();
    assert_eq!(grains.icon, "grain");
    assert!(engine.hidden_builtins().contains(&"Pantry Staples".to_string()));
    let stale = engine
        .resolve_subcategory(&SubcategoryRef::Builtin("Pantry Staples".to_string()))
        .unwrap();
    assert_eq!(stale.icon, "jar");
}

#[test]
fn cosmetic_promotion_keeps_refs_and_resolves_through_the_custom() {
    let mut engine = engine();
    let dairy = SubcategoryRef::Builtin("Dairy".to_string());
    let milk = engine.add_item("Milk", dairy.clone()).unwrap();

    engine
        .promote_builtin("Dairy", "Dairy", "milk-bottle", "#123456", "Food")
        .unwrap();

    // No migration happened, but the builtin ref now resolves to the
    // custom override because the builtin is hidden.
    assert_eq!(engine.item(milk).unwrap().subcategory, dairy);
    let style = engine.resolve_subcategory(&dairy).unwrap();
    assert_eq!(style.icon, "milk-bottle");
}

#[test]
fn promotion_conflict_check_excludes_the_promoted_builtin() {
    let mut engine = engine();
    engine
        .promote_builtin("Dairy", "dairy", "milk-bottle", "#123456", "Food")
        .unwrap();

    let err = engine
        .promote_builtin("Frozen", "Dairy", "snowflake", "#7EC8E3", "Food")
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateSubcategoryName { .. }));

    assert_eq!(
        engine.promote_builtin("No Such Aisle", "X", "x", "#000", "Food"),
        Err(EngineError::UnknownBuiltin("No Such Aisle".to_string()))
    );
}

#[test]
fn removing_a_subcategory_cascades_into_items_and_shopping_list() {
    let mut engine = engine();
    let frozen = SubcategoryRef::Builtin("Frozen".to_string());
    let peas = engine.add_item("Frozen Peas", frozen.clone()).unwrap();
    engine.update_quantity(peas, 0.1);
    engine.generate_shopping_list();
    assert_eq!(engine.shopping_list().len(), 1);

    engine.remove_subcategory(&frozen);

    assert!(engine.item(peas).is_none());
    assert!(engine.shopping_list().is_empty());
    assert_eq!(engine.shopping_state(), ShoppingState::Empty);
    assert!(engine.hidden_builtins().contains(&"Frozen".to_string()));
    assert!(engine.ordered_subcategories("Food").iter().all(|name| name != "Frozen"));
}

#[test]
fn removing_a_custom_deletes_its_record() {
    let mut engine = engine();
    let id = engine
        .add_custom_subcategory("Spices", "jar", "#AA3311", "Food")
        .unwrap();
    let cumin = engine
        .add_item("Cumin", SubcategoryRef::Custom(id))
        .unwrap();

    engine.remove_subcategory(&SubcategoryRef::Custom(id));

    assert!(engine.item(cumin).is_none());
    assert!(engine.custom_subcategories().is_empty());
    assert!(engine
        .resolve_subcategory(&SubcategoryRef::Custom(id))
        .is_none());
}

#[test]
fn ordered_subcategories_respect_explicit_order_then_discovery() {
    let mut engine = engine();
    engine
        .add_custom_subcategory("Spices", "jar", "#AA3311", "Food")
        .unwrap();

    engine.set_subcategory_order(
        "Food",
        vec![
            "Snacks".to_string(),
            "Spices".to_string(),
            "No Longer Here".to_string(),
        ],
    );

    let ordered = engine.ordered_subcategories("Food");
    assert_eq!(ordered[0], "Snacks");
    assert_eq!(ordered[1], "Spices");
    // Unknown names in the explicit order are dropped; the remainder keeps
    // catalog discovery order.
    assert_eq!(ordered[2], "Dairy");
    assert!(ordered.iter().all(|name| name != "No Longer Here"));
    assert_eq!(ordered.len(), 9);
}

#[test]
fn removing_a_subcategory_prunes_it_from_the_explicit_order() {
    let mut engine = engine();
    let spices = engine
        .add_custom_subcategory("Spices", "jar", "#AA3311", "Food")
        .unwrap();
    engine.set_subcategory_order(
        "Food",
        vec![
            "Snacks".to_string(),
            "Spices".to_string(),
            "Dairy".to_string(),
        ],
    );

    engine.remove_subcategory(&SubcategoryRef::Builtin("Snacks".to_string()));
    engine.remove_subcategory(&SubcategoryRef::Custom(spices));

    let order = engine.gateway().load_subcategory_order().unwrap();
    assert_eq!(order.get("Food").unwrap(), &vec!["Dairy".to_string()]);
}

#[test]
fn hidden_builtins_disappear_from_ordered_listing() {
    let mut engine = engine();
    engine.remove_subcategory(&SubcategoryRef::Builtin("Snacks".to_string()));

    let ordered = engine.ordered_subcategories("Food");
    assert!(ordered.iter().all(|name| name != "Snacks"));
    assert_eq!(ordered.len(), 7);
}
