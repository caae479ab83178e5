//! SQLite-backed persistence gateway.
//!
//! # Responsibility
//! - Open and bootstrap SQLite connections (pragmas + migrations).
//! - Implement the full-overwrite gateway contract over one table per
//!   logical collection.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every save runs as a single transaction: delete-all then insert.
//! - Timestamps cross this boundary as RFC 3339 strings; structured fields
//!   (subcategory refs, purchase history, ledger details) as JSON text.

use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::gateway::{
    GatewayError, GatewayResult, PersistenceGateway, SubcategoryOrderMap,
};
use crate::model::activity::{ActivityAction, ActivityDetails, ActivityLogEntry};
use crate::model::item::InventoryItem;
use crate::model::shopping::{ShoppingListItem, ShoppingState};
use crate::model::subcategory::{CustomSubcategory, SubcategoryRef};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

fn apply_migrations(conn: &mut Connection) -> GatewayResult<()> {
    let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();

    if current > latest {
        return Err(GatewayError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

/// Gateway over a bootstrapped SQLite connection.
#[derive(Debug)]
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    /// Opens a database file and applies all pending migrations.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=gateway status=start mode=file");
        let conn = Connection::open(path)?;
        Self::bootstrap(conn, "file", started_at)
    }

    /// Opens an in-memory database and applies all pending migrations.
    pub fn open_in_memory() -> GatewayResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=gateway status=start mode=memory");
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn, "memory", started_at)
    }

    fn bootstrap(mut conn: Connection, mode: &str, started_at: Instant) -> GatewayResult<Self> {
        let result: GatewayResult<()> = (|| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            apply_migrations(&mut conn)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                info!(
                    "event=db_open module=gateway status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=db_open module=gateway status=error mode={mode} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

impl PersistenceGateway for SqliteGateway {
    fn load_inventory_items(&self) -> GatewayResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, quantity, subcategory, is_custom, is_ignored,
                    purchase_history, last_updated, sort_order
             FROM inventory_items
             ORDER BY sort_order ASC, name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn save_inventory_items(&self, items: &[InventoryItem]) -> GatewayResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM inventory_items;", [])?;
        for item in items {
            tx.execute(
                "INSERT INTO inventory_items (
                    id, name, quantity, subcategory, is_custom, is_ignored,
                    purchase_history, last_updated, sort_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    item.id.to_string(),
                    item.name.as_str(),
                    item.quantity,
                    serde_json::to_string(&item.subcategory)?,
                    bool_to_int(item.is_custom),
                    bool_to_int(item.is_ignored),
                    serde_json::to_string(&encode_timestamps(&item.purchase_history))?,
                    item.last_updated.to_rfc3339(),
                    item.order,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_shopping_list(&self) -> GatewayResult<Vec<ShoppingListItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, is_checked, is_temporary, inventory_item_id
             FROM shopping_list
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_list_row(row)?);
        }
        Ok(entries)
    }

    fn save_shopping_list(&self, entries: &[ShoppingListItem]) -> GatewayResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM shopping_list;", [])?;
        for (position, entry) in entries.iter().enumerate() {
            tx.execute(
                "INSERT INTO shopping_list (
                    id, name, is_checked, is_temporary, inventory_item_id, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    entry.id.to_string(),
                    entry.name.as_str(),
                    bool_to_int(entry.is_checked),
                    bool_to_int(entry.is_temporary),
                    entry.inventory_item_id.map(|id| id.to_string()),
                    position as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_shopping_state(&self) -> GatewayResult<ShoppingState> {
        let mut stmt = self
            .conn
            .prepare("SELECT state FROM shopping_state WHERE id = 1;")?;
        let mut rows = stmt.query([])?;
        let Some(row) = rows.next()? else {
            return Ok(ShoppingState::Empty);
        };
        let token: String = row.get("state")?;
        ShoppingState::parse(&token).ok_or_else(|| {
            GatewayError::InvalidData(format!(
                "invalid shopping state `{token}` in shopping_state.state"
            ))
        })
    }

    fn save_shopping_state(&self, state: ShoppingState) -> GatewayResult<()> {
        self.conn.execute(
            "INSERT INTO shopping_state (id, state) VALUES (1, ?1)
             ON CONFLICT (id) DO UPDATE SET state = excluded.state;",
            [state.as_str()],
        )?;
        Ok(())
    }

    fn load_custom_subcategories(&self) -> GatewayResult<Vec<CustomSubcategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, icon, color, category
             FROM custom_subcategories
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut subcategories = Vec::new();
        while let Some(row) = rows.next()? {
            subcategories.push(CustomSubcategory {
                id: parse_uuid(row.get::<_, String>("id")?, "custom_subcategories.id")?,
                name: row.get("name")?,
                icon: row.get("icon")?,
                color: row.get("color")?,
                category: row.get("category")?,
            });
        }
        Ok(subcategories)
    }

    fn save_custom_subcategories(&self, subcategories: &[CustomSubcategory]) -> GatewayResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM custom_subcategories;", [])?;
        for (position, subcategory) in subcategories.iter().enumerate() {
            tx.execute(
                "INSERT INTO custom_subcategories (
                    id, name, icon, color, category, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    subcategory.id.to_string(),
                    subcategory.name.as_str(),
                    subcategory.icon.as_str(),
                    subcategory.color.as_str(),
                    subcategory.category.as_str(),
                    position as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_hidden_builtins(&self) -> GatewayResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM hidden_builtin_subcategories ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get("name")?);
        }
        Ok(names)
    }

    fn save_hidden_builtins(&self, names: &[String]) -> GatewayResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM hidden_builtin_subcategories;", [])?;
        for name in names {
            tx.execute(
                "INSERT INTO hidden_builtin_subcategories (name) VALUES (?1);",
                [name.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_subcategory_order(&self) -> GatewayResult<SubcategoryOrderMap> {
        let mut stmt = self.conn.prepare(
            "SELECT category, name FROM subcategory_order
             ORDER BY category ASC, position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut order = SubcategoryOrderMap::new();
        while let Some(row) = rows.next()? {
            let category: String = row.get("category")?;
            let name: String = row.get("name")?;
            order.entry(category).or_default().push(name);
        }
        Ok(order)
    }

    fn save_subcategory_order(&self, order: &SubcategoryOrderMap) -> GatewayResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM subcategory_order;", [])?;
        for (category, names) in order {
            for (position, name) in names.iter().enumerate() {
                tx.execute(
                    "INSERT INTO subcategory_order (category, name, position)
                     VALUES (?1, ?2, ?3);",
                    params![category.as_str(), name.as_str(), position as i64],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_activity_log(&self) -> GatewayResult<Vec<ActivityLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, action, item_id, item_name, timestamp, details, is_undone
             FROM activity_log
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_log_row(row)?);
        }
        Ok(entries)
    }

    fn save_activity_log(&self, entries: &[ActivityLogEntry]) -> GatewayResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM activity_log;", [])?;
        for (position, entry) in entries.iter().enumerate() {
            tx.execute(
                "INSERT INTO activity_log (
                    id, action, item_id, item_name, timestamp, details, is_undone, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    entry.id.to_string(),
                    entry.action.as_str(),
                    entry.item_id.to_string(),
                    entry.item_name.as_str(),
                    entry.timestamp.to_rfc3339(),
                    serde_json::to_string(&entry.details)?,
                    bool_to_int(entry.is_undone),
                    position as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_item_row(row: &Row<'_>) -> GatewayResult<InventoryItem> {
    let subcategory_json: String = row.get("subcategory")?;
    let subcategory: SubcategoryRef = serde_json::from_str(&subcategory_json)?;

    let history_json: String = row.get("purchase_history")?;
    let history_texts: Vec<String> = serde_json::from_str(&history_json)?;
    let mut purchase_history = Vec::with_capacity(history_texts.len());
    for text in &history_texts {
        purchase_history.push(parse_timestamp(text, "inventory_items.purchase_history")?);
    }

    Ok(InventoryItem {
        id: parse_uuid(row.get::<_, String>("id")?, "inventory_items.id")?,
        name: row.get("name")?,
        quantity: row.get("quantity")?,
        subcategory,
        is_custom: int_to_bool(row.get("is_custom")?, "inventory_items.is_custom")?,
        is_ignored: int_to_bool(row.get("is_ignored")?, "inventory_items.is_ignored")?,
        purchase_history,
        last_updated: parse_timestamp(
            &row.get::<_, String>("last_updated")?,
            "inventory_items.last_updated",
        )?,
        order: row.get("sort_order")?,
    })
}

fn parse_list_row(row: &Row<'_>) -> GatewayResult<ShoppingListItem> {
    let inventory_item_id = match row.get::<_, Option<String>>("inventory_item_id")? {
        Some(text) => Some(parse_uuid(text, "shopping_list.inventory_item_id")?),
        None => None,
    };

    Ok(ShoppingListItem {
        id: parse_uuid(row.get::<_, String>("id")?, "shopping_list.id")?,
        name: row.get("name")?,
        is_checked: int_to_bool(row.get("is_checked")?, "shopping_list.is_checked")?,
        is_temporary: int_to_bool(row.get("is_temporary")?, "shopping_list.is_temporary")?,
        inventory_item_id,
    })
}

fn parse_log_row(row: &Row<'_>) -> GatewayResult<ActivityLogEntry> {
    let action_token: String = row.get("action")?;
    let action = ActivityAction::parse(&action_token).ok_or_else(|| {
        GatewayError::InvalidData(format!(
            "invalid activity action `{action_token}` in activity_log.action"
        ))
    })?;

    let details_json: String = row.get("details")?;
    let details: ActivityDetails = serde_json::from_str(&details_json)?;

    Ok(ActivityLogEntry {
        id: parse_uuid(row.get::<_, String>("id")?, "activity_log.id")?,
        action,
        item_id: parse_uuid(row.get::<_, String>("item_id")?, "activity_log.item_id")?,
        item_name: row.get("item_name")?,
        timestamp: parse_timestamp(
            &row.get::<_, String>("timestamp")?,
            "activity_log.timestamp",
        )?,
        details,
        is_undone: int_to_bool(row.get("is_undone")?, "activity_log.is_undone")?,
    })
}

fn encode_timestamps(timestamps: &[DateTime<Utc>]) -> Vec<String> {
    timestamps.iter().map(|ts| ts.to_rfc3339()).collect()
}

fn parse_timestamp(text: &str, column: &str) -> GatewayResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            GatewayError::InvalidData(format!("invalid timestamp `{text}` in {column}"))
        })
}

fn parse_uuid(text: String, column: &str) -> GatewayResult<Uuid> {
    Uuid::parse_str(&text)
        .map_err(|_| GatewayError::InvalidData(format!("invalid uuid `{text}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> GatewayResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(GatewayError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
