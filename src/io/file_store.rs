use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use super::lock::TableLock;
use super::store::{
    ChangeEvent, ChangeFeed, ChangeKind, EventFilter, Filter, Row, Select, Store, StoreError,
    Subscription, Table, apply_patch, row_id,
};
use super::watcher::{TableWatcher, table_path};

/// A store that keeps each table as a JSON array under `rota/tables/`.
///
/// Reads go to disk every time, so writes from other processes are visible
/// immediately. With a watcher attached, any change to a table file (ours
/// or another process's) is published to subscribers; without one, only
/// this process's writes are.
pub struct FileStore {
    dir: PathBuf,
    tables_dir: PathBuf,
    user: Option<String>,
    feed: ChangeFeed,
    watcher: Option<TableWatcher>,
}

impl FileStore {
    /// Open the store rooted at a workspace's `rota/` directory
    pub fn open(rota_dir: &Path, user: Option<String>) -> Result<Self, StoreError> {
        let tables_dir = rota_dir.join("tables");
        fs::create_dir_all(&tables_dir).map_err(|e| StoreError::Write {
            table: Table::Profiles,
            reason: format!("could not create {}: {}", tables_dir.display(), e),
        })?;
        Ok(FileStore {
            dir: rota_dir.to_path_buf(),
            tables_dir,
            user,
            feed: ChangeFeed::new(),
            watcher: None,
        })
    }

    /// Open and start the file watcher that drives realtime events
    pub fn open_watched(rota_dir: &Path, user: Option<String>) -> Result<Self, StoreError> {
        let mut store = Self::open(rota_dir, user)?;
        let watcher = TableWatcher::start(&store.tables_dir, store.feed.clone())
            .map_err(|e| StoreError::Watch(e.to_string()))?;
        store.watcher = Some(watcher);
        Ok(store)
    }

    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }

    fn read_table(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let path = table_path(&self.tables_dir, table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path).map_err(|e| StoreError::Read {
            table,
            reason: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Decode {
            table,
            reason: e.to_string(),
        })
    }

    fn write_table(&self, table: Table, rows: &[Row]) -> Result<(), StoreError> {
        let path = table_path(&self.tables_dir, table);
        let write_err = |reason: String| StoreError::Write { table, reason };
        let content = serde_json::to_string_pretty(rows).map_err(|e| write_err(e.to_string()))?;
        atomic_write(&path, content.as_bytes()).map_err(|e| write_err(e.to_string()))
    }

    /// Run a read-modify-write cycle on one table under the workspace lock
    fn modify<T>(
        &self,
        table: Table,
        f: impl FnOnce(&mut Vec<Row>) -> T,
    ) -> Result<T, StoreError> {
        let _lock =
            TableLock::acquire_default(&self.dir).map_err(|e| StoreError::Lock(e.to_string()))?;
        let mut rows = self.read_table(table)?;
        let out = f(&mut rows);
        self.write_table(table, &rows)?;
        Ok(out)
    }

    fn publish_local(&self, table: Table, kind: ChangeKind, record_id: Option<String>) {
        if self.watcher.is_none() {
            self.feed.publish(ChangeEvent {
                table,
                kind,
                record_id,
            });
        }
    }
}

impl Store for FileStore {
    fn select(&self, table: Table, query: &Select) -> Result<Vec<Row>, StoreError> {
        let rows = self.read_table(table)?;
        Ok(query.apply(&rows))
    }

    fn insert(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        if row_id(&row).is_none() {
            row.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
        let stored = row.clone();
        self.modify(table, move |rows| rows.push(row))?;
        tracing::debug!(%table, id = ?row_id(&stored), "insert");
        self.publish_local(table, ChangeKind::Insert, row_id(&stored).map(String::from));
        Ok(stored)
    }

    fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<usize, StoreError> {
        let changed = self.modify(table, |rows| {
            let mut ids = Vec::new();
            for r in rows.iter_mut().filter(|r| filter.matches(r)) {
                apply_patch(r, &patch);
                ids.push(row_id(r).map(String::from));
            }
            ids
        })?;
        tracing::debug!(%table, %filter, count = changed.len(), "update");
        for id in &changed {
            self.publish_local(table, ChangeKind::Update, id.clone());
        }
        Ok(changed.len())
    }

    fn delete(&self, table: Table, filter: &Filter) -> Result<usize, StoreError> {
        let removed = self.modify(table, |rows| {
            let before = rows.len();
            rows.retain(|r| !filter.matches(r));
            before - rows.len()
        })?;
        tracing::debug!(%table, %filter, count = removed, "delete");
        if removed > 0 {
            self.publish_local(table, ChangeKind::Delete, None);
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

/// Write a file atomically: temp file in the same directory, then rename
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::row;
    use serde_json::json;
    use tempfile::TempDir;

    fn open(tmp: &TempDir) -> FileStore {
        FileStore::open(&tmp.path().join("rota"), Some("u-1".into())).unwrap()
    }

    #[test]
    fn missing_table_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        assert!(store.select(Table::Teams, &Select::all()).unwrap().is_empty());
        assert_eq!(store.current_user().as_deref(), Some("u-1"));
    }

    #[test]
    fn insert_assigns_id_and_persists() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        let stored = store
            .insert(Table::Teams, row([("name", json!("Design"))]))
            .unwrap();
        assert!(row_id(&stored).is_some());

        // A second handle on the same directory sees the row
        let other = open(&tmp);
        let rows = other.select(Table::Teams, &Select::all()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&json!("Design")));
    }

    #[test]
    fn update_and_delete_report_counts() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        store
            .insert(Table::Profiles, row([("id", json!("a")), ("is_admin", json!(false))]))
            .unwrap();
        store
            .insert(Table::Profiles, row([("id", json!("b")), ("is_admin", json!(false))]))
            .unwrap();

        let n = store
            .update(Table::Profiles, &Filter::id("a"), row([("is_admin", json!(true))]))
            .unwrap();
        assert_eq!(n, 1);
        let n = store
            .update(Table::Profiles, &Filter::id("zzz"), row([("is_admin", json!(true))]))
            .unwrap();
        assert_eq!(n, 0);

        let admins = store
            .select(Table::Profiles, &Select::all().eq("is_admin", true))
            .unwrap();
        assert_eq!(admins.len(), 1);

        assert_eq!(store.delete(Table::Profiles, &Filter::id("b")).unwrap(), 1);
        assert_eq!(store.select(Table::Profiles, &Select::all()).unwrap().len(), 1);
    }

    #[test]
    fn unwatched_store_publishes_its_own_writes() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        let sub = store.subscribe(Table::Tasks, EventFilter::All).unwrap();
        store
            .insert(Table::Tasks, row([("id", json!("t1")), ("day", json!("Mon"))]))
            .unwrap();
        store
            .update(Table::Tasks, &Filter::id("t1"), row([("day", json!("Tue"))]))
            .unwrap();
        let kinds: Vec<ChangeKind> = sub.drain().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Insert, ChangeKind::Update]);
    }

    #[test]
    fn malformed_table_is_a_decode_error() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        fs::write(store.tables_dir().join("teams.json"), "{not json").unwrap();
        let err = store.select(Table::Teams, &Select::all()).unwrap_err();
        assert!(matches!(err, StoreError::Decode { table: Table::Teams, .. }));
    }
}
