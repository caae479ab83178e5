use chrono::{TimeZone, Utc};
use homestock_core::{
    ActivityAction, ActivityDetails, ActivityLogEntry, GatewayError, InventoryEngine,
    InventoryItem, PersistenceGateway, ShoppingListItem, ShoppingState, SqliteGateway,
    SubcategoryOrderMap, SubcategoryRef,
};
use uuid::Uuid;

fn sample_item(name: &str) -> InventoryItem {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut item = InventoryItem::new(
        name,
        SubcategoryRef::Builtin("Dairy".to_string()),
        true,
        now,
    );
    item.quantity = 0.4;
    item.purchase_history.push(now);
    item.order = 0;
    item
}

#[test]
fn inventory_items_roundtrip_with_timestamps_and_refs() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    let custom_ref = SubcategoryRef::Custom(Uuid::new_v4());
    let mut cumin = sample_item("Cumin");
    cumin.subcategory = custom_ref;
    let items = vec![sample_item("Milk"), cumin];

    gateway.save_inventory_items(&items).unwrap();
    let loaded = gateway.load_inventory_items().unwrap();
    assert_eq!(loaded, items);
}

#[test]
fn saves_are_full_overwrites() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    gateway
        .save_inventory_items(&[sample_item("Milk"), sample_item("Butter")])
        .unwrap();
    gateway.save_inventory_items(&[sample_item("Yogurt")]).unwrap();

    let loaded = gateway.load_inventory_items().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Yogurt");
}

#[test]
fn shopping_list_and_state_roundtrip() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    let entries = vec![
        ShoppingListItem::for_item(&sample_item("Milk")),
        ShoppingListItem::temporary("Batteries"),
    ];

    gateway.save_shopping_list(&entries).unwrap();
    gateway.save_shopping_state(ShoppingState::ListReady).unwrap();

    assert_eq!(gateway.load_shopping_list().unwrap(), entries);
    assert_eq!(
        gateway.load_shopping_state().unwrap(),
        ShoppingState::ListReady
    );
}

#[test]
fn missing_shopping_state_defaults_to_empty() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    assert_eq!(gateway.load_shopping_state().unwrap(), ShoppingState::Empty);
}

#[test]
fn taxonomy_tables_roundtrip() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    let customs = vec![homestock_core::CustomSubcategory::new(
        "Spices", "jar", "#AA3311", "Food",
    )];
    let hidden = vec!["Dairy".to_string(), "Frozen".to_string()];
    let mut order = SubcategoryOrderMap::new();
    order.insert(
        "Food".to_string(),
        vec!["Spices".to_string(), "Dairy".to_string()],
    );

    gateway.save_custom_subcategories(&customs).unwrap();
    gateway.save_hidden_builtins(&hidden).unwrap();
    gateway.save_subcategory_order(&order).unwrap();

    assert_eq!(gateway.load_custom_subcategories().unwrap(), customs);
    assert_eq!(gateway.load_hidden_builtins().unwrap(), hidden);
    assert_eq!(gateway.load_subcategory_order().unwrap(), order);
}

#[test]
fn activity_log_roundtrips_with_snapshot_details() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    let snapshot = sample_item("Milk");
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap();
    let entries = vec![
        ActivityLogEntry::new(
            ActivityAction::UpdateQuantity,
            snapshot.id,
            "Milk",
            ActivityDetails::change("1.00", "0.40", snapshot.clone()),
            timestamp,
        ),
        ActivityLogEntry::new(
            ActivityAction::AddItem,
            Uuid::new_v4(),
            "Butter",
            ActivityDetails::default(),
            timestamp,
        ),
    ];

    gateway.save_activity_log(&entries).unwrap();
    let loaded = gateway.load_activity_log().unwrap();
    assert_eq!(loaded, entries);
    assert_eq!(
        loaded[0].details.item_snapshot.as_ref().unwrap().quantity,
        0.4
    );
}

#[test]
fn open_rejects_a_database_from_a_newer_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("future.sqlite3");
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
    }

    let err = SqliteGateway::open(&db_path).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::UnsupportedSchemaVersion {
            db_version: 99,
            latest_supported: 1,
        }
    ));
}

#[test]
fn engine_state_survives_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("homestock.sqlite3");

    {
        let gateway = SqliteGateway::open(&db_path).unwrap();
        let mut engine = InventoryEngine::new(gateway);
        engine.load().unwrap();
        let milk = engine
            .add_item("Milk", SubcategoryRef::Builtin("Dairy".to_string()))
            .unwrap();
        engine.update_quantity(milk, 0.1);
        engine.generate_shopping_list();
        engine.finalize_shopping_list();
    }

    let gateway = SqliteGateway::open(&db_path).unwrap();
    let mut engine = InventoryEngine::new(gateway);
    engine.load().unwrap();

    assert_eq!(engine.items().len(), 1);
    assert_eq!(engine.items()[0].quantity, 0.1);
    assert_eq!(engine.shopping_state(), ShoppingState::ListReady);
    assert_eq!(engine.shopping_list().len(), 1);
    assert_eq!(engine.activity_log().len(), 1);
}
