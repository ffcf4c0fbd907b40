use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use serde_json::json;

use crate::io::memory_store::MemoryStore;
use crate::io::store::{Table, row};
use crate::model::{BoardConfig, BoardInfo};
use crate::tui::app::App;

pub const TERM_W: u16 = 100;
pub const TERM_H: u16 = 30;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn test_config() -> BoardConfig {
    BoardConfig {
        board: BoardInfo {
            name: "Studio".into(),
        },
        session: Default::default(),
        cache: Default::default(),
        ui: Default::default(),
        log: Default::default(),
        projects: vec![],
    }
}

/// Two teams, three people (one deactivated) and a few tasks.
/// Signed in as Sarah.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new(Some("u-sarah"));
    store.seed(
        Table::Teams,
        [
            row([("id", json!("t-design")), ("name", json!("Design")), ("order_index", json!(0))]),
            row([("id", json!("t-eng")), ("name", json!("Engineering")), ("order_index", json!(1))]),
        ],
    );
    store.seed(
        Table::Profiles,
        [
            row([
                ("id", json!("u-sarah")),
                ("full_name", json!("Sarah Chen")),
                ("email", json!("sarah@example.com")),
                ("role", json!("Designer")),
                ("team_id", json!("t-design")),
                ("is_admin", json!(true)),
                ("status", json!("active")),
                ("order_index", json!(0)),
            ]),
            row([
                ("id", json!("u-mike")),
                ("full_name", json!("Mike Ross")),
                ("email", json!("mike@example.com")),
                ("team_id", json!("t-eng")),
                ("status", json!("active")),
                ("order_index", json!(0)),
            ]),
            row([
                ("id", json!("u-old")),
                ("full_name", json!("Olive Gone")),
                ("status", json!("deactivated")),
            ]),
        ],
    );
    store.seed(
        Table::Tasks,
        [
            row([
                ("id", json!("task-1")),
                ("title", json!("Marketing Strategy")),
                ("description", json!("Q4 plan")),
                ("assignee_id", json!("u-sarah")),
                ("assignee", json!("Sarah Chen")),
                ("day", json!("Mon")),
                ("time_block", json!("morning")),
                ("team", json!("Design")),
            ]),
            row([
                ("id", json!("task-2")),
                ("title", json!("Client Support")),
                ("assignee_id", json!("u-mike")),
                ("assignee", json!("Mike Ross")),
                ("day", json!("Wed")),
                ("team", json!("Engineering")),
            ]),
        ],
    );
    store
}

pub fn seeded_app() -> App {
    App::new(Box::new(seeded_store()), test_config(), None)
}

/// An app over `store` with no saved state
pub fn app_with(store: MemoryStore) -> App {
    App::new(Box::new(store), test_config(), None)
}
