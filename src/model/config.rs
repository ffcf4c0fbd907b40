use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from rota/rota.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Replaces the built-in project catalog when non-empty
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Profile id of the signed-in member
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cached reads older than this are refetched on next use
    #[serde(default = "default_stale_ms")]
    pub stale_ms: u64,
    /// Unused cached reads are dropped after this long
    #[serde(default = "default_gc_secs")]
    pub gc_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            stale_ms: default_stale_ms(),
            gc_secs: default_gc_secs(),
        }
    }
}

fn default_stale_ms() -> u64 {
    1000
}

fn default_gc_secs() -> u64 {
    5 * 60
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Color overrides by theme slot name, applied to both light and dark
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Kitty keyboard protocol: true = force on, false = force off, absent = on.
    /// Needed for terminals to report Ctrl+Enter.
    #[serde(default)]
    pub kitty_keyboard: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive; `ROTA_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One `[[projects]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}
