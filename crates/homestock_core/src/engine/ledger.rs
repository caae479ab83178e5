//! Bounded, undoable activity ledger.
//!
//! # Responsibility
//! - Record qualifying mutations newest-first with reversal payloads.
//! - Enforce the retention policy on every append.
//! - Hand the facade the inverse operation when an entry is undone.
//!
//! # Invariants
//! - At most one live entry per item: a new append drops every older entry
//!   for the same item outright.
//! - Entries older than the retention window are dropped on append even
//!   when the cap has headroom.
//! - `is_undone` is set once; a second undo of the same entry is a no-op.

use chrono::{DateTime, Duration, Utc};
use log::warn;

use crate::model::activity::{ActivityAction, ActivityDetails, ActivityId, ActivityLogEntry};
use crate::model::item::{InventoryItem, ItemId};

/// Days an untouched entry survives the retention sweep.
pub const RETENTION_DAYS: i64 = 28;
/// Hard cap on live entries; oldest beyond it are dropped.
pub const MAX_ENTRIES: usize = 100;

/// Inverse operation the facade applies when an entry is undone.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOp {
    /// Reverse of `AddItem`: remove the item, ignoring if already gone.
    Remove(ItemId),
    /// Reverse of every other action: overwrite-or-reinsert the snapshot
    /// verbatim.
    Restore(InventoryItem),
}

/// Append-only mutation log, newest first.
#[derive(Debug, Default)]
pub struct ActivityLedger {
    entries: Vec<ActivityLogEntry>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds from persisted entries, restoring newest-first order.
    pub fn from_entries(mut entries: Vec<ActivityLogEntry>) -> Self {
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self { entries }
    }

    pub fn entries(&self) -> &[ActivityLogEntry] {
        &self.entries
    }

    /// Appends an entry and runs the retention sweep: prior entries survive
    /// only if they are for a different item AND inside the retention
    /// window; the result is capped at [`MAX_ENTRIES`].
    pub fn record(
        &mut self,
        action: ActivityAction,
        item_id: ItemId,
        item_name: impl Into<String>,
        details: ActivityDetails,
        now: DateTime<Utc>,
    ) -> ActivityId {
        let entry = ActivityLogEntry::new(action, item_id, item_name, details, now);
        let id = entry.id;
        let cutoff = now - Duration::days(RETENTION_DAYS);

        self.entries
            .retain(|prior| prior.item_id != item_id && prior.timestamp >= cutoff);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
        id
    }

    /// Marks an entry undone and returns its inverse operation.
    ///
    /// Missing entries, already-undone entries, and restore-type entries
    /// without a snapshot are logged no-ops returning `None`; the last case
    /// leaves the entry eligible for a later attempt.
    pub fn undo(&mut self, id: ActivityId) -> Option<UndoOp> {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            warn!("event=ledger_undo module=ledger status=skipped reason=not_found log_id={id}");
            return None;
        };
        if entry.is_undone {
            warn!("event=ledger_undo module=ledger status=skipped reason=already_undone log_id={id}");
            return None;
        }

        let op = match entry.action {
            ActivityAction::AddItem => UndoOp::Remove(entry.item_id),
            _ => match &entry.details.item_snapshot {
                Some(snapshot) => UndoOp::Restore(snapshot.clone()),
                None => {
                    warn!(
                        "event=ledger_undo module=ledger status=skipped reason=missing_snapshot log_id={id} action={}",
                        entry.action.as_str()
                    );
                    return None;
                }
            },
        };
        entry.is_undone = true;
        Some(op)
    }

    /// Explicit "clear history".
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
