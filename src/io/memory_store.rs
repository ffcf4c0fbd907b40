use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::store::{
    ChangeEvent, ChangeFeed, ChangeKind, EventFilter, Filter, Row, Select, Store, StoreError,
    Subscription, Table, apply_patch, row_id,
};

/// An in-process store. Every write is echoed to subscribers the way a
/// hosted database's realtime stream echoes a client's own writes.
///
/// Reads and writes can be made to fail per table, and reads are counted,
/// which makes it the store of choice for exercising the hooks.
#[derive(Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<Table, Vec<Row>>>,
    feed: ChangeFeed,
    user: Option<String>,
    failing_reads: RefCell<HashSet<Table>>,
    failing_writes: RefCell<HashSet<Table>>,
    selects: RefCell<HashMap<Table, usize>>,
}

impl MemoryStore {
    pub fn new(user: Option<&str>) -> Self {
        MemoryStore {
            user: user.map(String::from),
            ..Default::default()
        }
    }

    /// Seed rows without publishing change events
    pub fn seed(&self, table: Table, rows: impl IntoIterator<Item = Row>) {
        self.tables
            .borrow_mut()
            .entry(table)
            .or_default()
            .extend(rows);
    }

    pub fn fail_reads(&self, table: Table, fail: bool) {
        toggle(&self.failing_reads, table, fail);
    }

    pub fn fail_writes(&self, table: Table, fail: bool) {
        toggle(&self.failing_writes, table, fail);
    }

    /// Number of `select` calls made against a table
    pub fn select_count(&self, table: Table) -> usize {
        self.selects.borrow().get(&table).copied().unwrap_or(0)
    }

    /// Apply a change as another client would: the row changes and an
    /// event is published, but nothing in this process issued a write.
    pub fn external_update(&self, table: Table, filter: &Filter, patch: Row) -> usize {
        let ids = self.patch_rows(table, filter, &patch);
        for id in &ids {
            self.publish(table, ChangeKind::Update, id.clone());
        }
        ids.len()
    }

    fn patch_rows(&self, table: Table, filter: &Filter, patch: &Row) -> Vec<Option<String>> {
        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(table).or_default();
        let mut ids = Vec::new();
        for r in rows.iter_mut().filter(|r| filter.matches(r)) {
            apply_patch(r, patch);
            ids.push(row_id(r).map(String::from));
        }
        ids
    }

    fn check_write(&self, table: Table) -> Result<(), StoreError> {
        if self.failing_writes.borrow().contains(&table) {
            return Err(StoreError::Write {
                table,
                reason: "write rejected".into(),
            });
        }
        Ok(())
    }

    fn publish(&self, table: Table, kind: ChangeKind, record_id: Option<String>) {
        self.feed.publish(ChangeEvent {
            table,
            kind,
            record_id,
        });
    }
}

fn toggle(set: &RefCell<HashSet<Table>>, table: Table, on: bool) {
    let mut set = set.borrow_mut();
    if on {
        set.insert(table);
    } else {
        set.remove(&table);
    }
}

impl Store for MemoryStore {
    fn select(&self, table: Table, query: &Select) -> Result<Vec<Row>, StoreError> {
        *self.selects.borrow_mut().entry(table).or_default() += 1;
        if self.failing_reads.borrow().contains(&table) {
            return Err(StoreError::Read {
                table,
                reason: "connection reset".into(),
            });
        }
        let tables = self.tables.borrow();
        Ok(tables
            .get(&table)
            .map(|rows| query.apply(rows))
            .unwrap_or_default())
    }

    fn insert(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        self.check_write(table)?;
        if row_id(&row).is_none() {
            row.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
        self.tables
            .borrow_mut()
            .entry(table)
            .or_default()
            .push(row.clone());
        self.publish(table, ChangeKind::Insert, row_id(&row).map(String::from));
        Ok(row)
    }

    fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<usize, StoreError> {
        self.check_write(table)?;
        let ids = self.patch_rows(table, filter, &patch);
        for id in &ids {
            self.publish(table, ChangeKind::Update, id.clone());
        }
        Ok(ids.len())
    }

    fn delete(&self, table: Table, filter: &Filter) -> Result<usize, StoreError> {
        self.check_write(table)?;
        let removed = {
            let mut tables = self.tables.borrow_mut();
            let rows = tables.entry(table).or_default();
            let before = rows.len();
            rows.retain(|r| !filter.matches(r));
            before - rows.len()
        };
        if removed > 0 {
            self.publish(table, ChangeKind::Delete, None);
        }
        Ok(removed)
    }

    fn subscribe(&self, table: Table, events: EventFilter) -> Result<Subscription, StoreError> {
        Ok(self.feed.subscribe(table, events))
    }

    fn current_user(&self) -> Option<String> {
        self.user.clone()
    }
}
