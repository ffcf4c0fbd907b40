use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io::{self, ROTA_DIR};

/// Infer a board name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Profile ids end up in rota.toml and in row filters; keep them simple
fn validate_user_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("user id cannot be empty".to_string());
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!("invalid user id \"{}\": no spaces allowed", id));
    }
    Ok(())
}

pub fn cmd_init(args: InitArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };

    if let Some(user) = args.user.as_deref() {
        validate_user_id(user)?;
    }

    // Check for an enclosing workspace and warn
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        let parent_dir: PathBuf = parent_root.join(ROTA_DIR);
        eprintln!("Note: parent board found at {}/", parent_dir.display());
        eprintln!("Creating new board in ./{}/", ROTA_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    let rota_dir = workspace_io::init_workspace(&root, &name, args.user.as_deref())?;
    tracing::info!(dir = %rota_dir.display(), "workspace initialized");

    println!("Initialized rota board: {}", name);
    match args.user {
        Some(user) => {
            println!("  signed in as {}", user);
            println!("  add the profile with: rota member add \"<name>\" --id {}", user);
        }
        None => println!("  no session user; run `rota login <id>` to sign in"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("design-studio"), "Design Studio");
        assert_eq!(infer_name("rota"), "Rota");
        assert_eq!(infer_name("q4_planning"), "Q4 Planning");
        assert_eq!(infer_name("--"), "");
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("u-sarah").is_ok());
        assert!(validate_user_id("0f3c9a2e-77aa").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("sarah chen").is_err());
    }

    #[test]
    fn init_into_explicit_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_str().unwrap().to_string();
        let args = InitArgs {
            name: Some("Studio".into()),
            user: Some("u-sarah".into()),
        };
        cmd_init(args, Some(&dir)).unwrap();

        let ws = workspace_io::load_workspace(tmp.path()).unwrap();
        assert_eq!(ws.config.board.name, "Studio");
        assert_eq!(ws.config.session.user.as_deref(), Some("u-sarah"));

        let again = InitArgs {
            name: None,
            user: None,
        };
        assert!(cmd_init(again, Some(&dir)).is_err());
    }
}
