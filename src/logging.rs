use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter
pub const LOG_ENV: &str = "ROTA_LOG";

/// Build the filter: `ROTA_LOG` when set and valid, else `default`
fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to `rota/rota.log`. The terminal belongs to the UI, so nothing goes
/// to stderr while it runs.
pub fn init_tui(rota_dir: &Path, level: &str) -> Result<(), std::io::Error> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(rota_dir.join("rota.log"))?;
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    if result.is_err() {
        // a subscriber is already installed, e.g. in tests
        tracing::debug!("logging already initialized");
    }
    Ok(())
}

/// Log warnings and errors to stderr for CLI commands
pub fn init_cli() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn tui_logging_creates_log_file() {
        let tmp = TempDir::new().unwrap();
        init_tui(tmp.path(), "debug").unwrap();
        assert!(tmp.path().join("rota.log").exists());
    }
}
