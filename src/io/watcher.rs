use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::store::{ChangeEvent, ChangeFeed, ChangeKind, Table};

/// Turns file-system changes under `tables/` into realtime change events.
///
/// Table files are rewritten wholesale, so events carry no record id.
pub struct TableWatcher {
    _watcher: RecommendedWatcher,
}

impl TableWatcher {
    /// Start watching `tables_dir`, publishing into `feed` from the watcher thread.
    pub fn start(tables_dir: &Path, feed: ChangeFeed) -> Result<Self, notify::Error> {
        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "table watcher error");
                        return;
                    }
                };
                let kind = match event.kind {
                    EventKind::Create(_) => ChangeKind::Insert,
                    EventKind::Modify(_) => ChangeKind::Update,
                    EventKind::Remove(_) => ChangeKind::Delete,
                    _ => return,
                };
                let mut seen: Vec<Table> = Vec::new();
                for table in event.paths.iter().filter_map(|p| table_for_path(p)) {
                    if !seen.contains(&table) {
                        seen.push(table);
                    }
                }
                for table in seen {
                    tracing::debug!(%table, ?kind, "table file changed");
                    feed.publish(ChangeEvent {
                        table,
                        kind,
                        record_id: None,
                    });
                }
            },
            Config::default(),
        )?;
        watcher.watch(tables_dir, RecursiveMode::NonRecursive)?;
        Ok(TableWatcher { _watcher: watcher })
    }
}

/// Map `tables/<name>.json` to its table. The watch is non-recursive, so only
/// the file name matters. Temp files from atomic writes are ignored.
fn table_for_path(path: &Path) -> Option<Table> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(Table::from_name)
}

/// Path of a table's backing file
pub fn table_path(tables_dir: &Path, table: Table) -> PathBuf {
    tables_dir.join(format!("{}.json", table.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_table_files_only() {
        let dir = Path::new("/ws/rota/tables");
        assert_eq!(
            table_for_path(&dir.join("profiles.json")),
            Some(Table::Profiles)
        );
        assert_eq!(table_for_path(&dir.join("tasks.json")), Some(Table::Tasks));
        assert_eq!(table_for_path(&dir.join(".tmpA1b2C3")), None);
        assert_eq!(table_for_path(&dir.join("other.json")), None);
        assert_eq!(table_for_path(&dir.join("teams.txt")), None);
    }

    #[test]
    fn table_path_uses_json_extension() {
        let dir = Path::new("/ws/rota/tables");
        assert_eq!(table_path(dir, Table::Teams), dir.join("teams.json"));
    }
}
