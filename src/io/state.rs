use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Persisted TUI state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UiState {
    /// Which view is showing ("board" or "people")
    pub view: String,
    /// Weeks away from the current week when the TUI last closed
    #[serde(default)]
    pub week_offset: i64,
    /// Expanded state per team section, in team order
    #[serde(default)]
    pub open_teams: IndexMap<String, bool>,
    /// Last board cursor position (team index, day index)
    #[serde(default)]
    pub cursor: (usize, usize),
}

/// Read .state.json from the rota directory
pub fn read_ui_state(rota_dir: &Path) -> Option<UiState> {
    let path = rota_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed .state.json");
            None
        }
    }
}

/// Write .state.json to the rota directory
pub fn write_ui_state(rota_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = rota_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    super::file_store::atomic_write(&path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut state = UiState {
            view: "people".into(),
            week_offset: -2,
            cursor: (1, 3),
            ..Default::default()
        };
        state.open_teams.insert("Design".into(), false);
        state.open_teams.insert("Development".into(), true);

        write_ui_state(dir.path(), &state).unwrap();
        let loaded = read_ui_state(dir.path()).unwrap();
        assert_eq!(loaded, state);
        let order: Vec<&str> = loaded.open_teams.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["Design", "Development"]);
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".state.json"), "not json {{{").unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_minimal_object() {
        let state: UiState = serde_json::from_str(r#"{"view":"board"}"#).unwrap();
        assert_eq!(state.view, "board");
        assert_eq!(state.week_offset, 0);
        assert!(state.open_teams.is_empty());
        assert_eq!(state.cursor, (0, 0));
    }
}
