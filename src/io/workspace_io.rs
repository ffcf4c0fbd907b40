use std::fs;
use std::path::{Path, PathBuf};

use crate::model::BoardConfig;

use super::store::Table;
use super::watcher::table_path;

/// Name of the workspace directory
pub const ROTA_DIR: &str = "rota";
const CONFIG_FILE: &str = "rota.toml";

/// Error type for workspace discovery and config I/O
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a rota workspace: no rota/rota.toml found")]
    NotAWorkspace,
    #[error("rota/ already exists in {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse rota.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit rota.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A discovered workspace with its parsed config
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub rota_dir: PathBuf,
    pub config: BoardConfig,
}

/// Walk up from `start` looking for `rota/rota.toml`
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let rota_dir = current.join(ROTA_DIR);
        if rota_dir.is_dir() && rota_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let rota_dir = root.join(ROTA_DIR);
    if !rota_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = load_config(&rota_dir)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        rota_dir,
        config,
    })
}

pub fn load_config(rota_dir: &Path) -> Result<BoardConfig, WorkspaceError> {
    let path = rota_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read the config as a `toml_edit` document for round-trip-safe edits
pub fn read_config_doc(rota_dir: &Path) -> Result<toml_edit::DocumentMut, WorkspaceError> {
    let path = rota_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(text.parse()?)
}

pub fn write_config_doc(rota_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    super::file_store::atomic_write(&rota_dir.join(CONFIG_FILE), doc.to_string().as_bytes())?;
    Ok(())
}

/// Set `[session] user`, keeping the rest of the file as written
pub fn set_session_user(doc: &mut toml_edit::DocumentMut, user: &str) {
    if !doc.contains_key("session") {
        doc["session"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["session"]["user"] = toml_edit::value(user);
}

/// Initial rota.toml for a new workspace
pub fn default_config_text(name: &str, user: Option<&str>) -> String {
    let mut doc = toml_edit::DocumentMut::new();
    let mut board = toml_edit::Table::new();
    board["name"] = toml_edit::value(name);
    doc["board"] = toml_edit::Item::Table(board);
    if let Some(user) = user {
        set_session_user(&mut doc, user);
    }
    let mut cache = toml_edit::Table::new();
    cache["stale_ms"] = toml_edit::value(1000_i64);
    cache["gc_secs"] = toml_edit::value(300_i64);
    doc["cache"] = toml_edit::Item::Table(cache);
    let mut log = toml_edit::Table::new();
    log["level"] = toml_edit::value("info");
    doc["log"] = toml_edit::Item::Table(log);
    doc.to_string()
}

/// Create `rota/` with a config and empty tables under `root`
pub fn init_workspace(root: &Path, name: &str, user: Option<&str>) -> Result<PathBuf, WorkspaceError> {
    let rota_dir = root.join(ROTA_DIR);
    if rota_dir.join(CONFIG_FILE).exists() {
        return Err(WorkspaceError::AlreadyExists(root.to_path_buf()));
    }
    let tables_dir = rota_dir.join("tables");
    fs::create_dir_all(&tables_dir)?;
    fs::write(rota_dir.join(CONFIG_FILE), default_config_text(name, user))?;
    for table in Table::ALL {
        let path = table_path(&tables_dir, table);
        if !path.exists() {
            fs::write(path, "[]\n")?;
        }
    }
    fs::write(rota_dir.join(".gitignore"), ".state.json\n.lock\nrota.log\n")?;
    Ok(rota_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_then_discover_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        init_workspace(tmp.path(), "Studio", Some("u1")).unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let root = discover_workspace(&nested).unwrap();
        assert_eq!(root, tmp.path());
        let ws = load_workspace(&root).unwrap();
        assert_eq!(ws.config.board.name, "Studio");
        assert_eq!(ws.config.session.user.as_deref(), Some("u1"));
        assert!(ws.rota_dir.join("tables/tasks.json").exists());
    }

    #[test]
    fn init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        init_workspace(tmp.path(), "Studio", None).unwrap();
        let err = init_workspace(tmp.path(), "Studio", None).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
    }

    #[test]
    fn discover_outside_workspace_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_workspace(tmp.path()),
            Err(WorkspaceError::NotAWorkspace)
        ));
    }

    #[test]
    fn session_user_edit_preserves_comments() {
        let tmp = TempDir::new().unwrap();
        let rota_dir = tmp.path().join(ROTA_DIR);
        fs::create_dir_all(&rota_dir).unwrap();
        fs::write(
            rota_dir.join(CONFIG_FILE),
            "# our board\n[board]\nname = \"Studio\" # display name\n",
        )
        .unwrap();

        let mut doc = read_config_doc(&rota_dir).unwrap();
        set_session_user(&mut doc, "u-42");
        write_config_doc(&rota_dir, &doc).unwrap();

        let text = fs::read_to_string(rota_dir.join(CONFIG_FILE)).unwrap();
        assert!(text.starts_with("# our board\n"));
        assert!(text.contains("# display name"));
        assert_eq!(load_config(&rota_dir).unwrap().session.user.as_deref(), Some("u-42"));
    }
}
