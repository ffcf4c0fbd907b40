use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::file_store::FileStore;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::store::Store;
use crate::io::workspace_io::{discover_workspace, load_workspace};
use crate::model::{BoardConfig, Day, ProjectCatalog, Task, Team, TeamMember, ThemePreference};
use crate::ops::assignment::{AssignmentModal, AssignmentTarget};
use crate::ops::drag::{CellTarget, DragController};
use crate::ops::messaging::{MessagePayload, Opener, WindowMessage};
use crate::ops::notice::Notices;
use crate::ops::people::PeopleHook;
use crate::ops::profile::ProfileHook;
use crate::ops::query::QueryOptions;
use crate::ops::tasks::TaskHook;
use crate::ops::team_state::TeamStateHook;
use crate::ops::week::WeekCursor;

use super::input;
use super::render;
use super::theme::{self, Appearance, Theme};

/// Origin this process uses for window messages
pub const ORIGIN: &str = "rota://board";

/// Which content view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Board,
    People,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Board => "board",
            View::People => "people",
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Carrying a task (board) or member (people) to a new place
    Drag,
    /// Assignment modal open
    Modal,
}

/// Board cursor: a grid cell plus a task slot within it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCursor {
    /// Index into the team list
    pub team: usize,
    pub day: Day,
    /// Index into the cell's tasks
    pub slot: usize,
    /// Index into the team's members, used when creating a task
    pub member: usize,
}

impl Default for BoardCursor {
    fn default() -> Self {
        BoardCursor {
            team: 0,
            day: Day::Mon,
            slot: 0,
            member: 0,
        }
    }
}

/// A row in the people view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeopleRow {
    /// Team group header (`Unassigned` included)
    Group(String),
    Member { id: String, group: String },
    DeactivatedHeader,
    Deactivated { id: String },
}

/// Main application state
pub struct App {
    pub store: Box<dyn Store>,
    pub rota_dir: Option<PathBuf>,
    pub config: BoardConfig,
    pub catalog: ProjectCatalog,
    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub system_dark: bool,
    /// Local mirror of the profile preference, so it works without a profile
    pub theme_pref: ThemePreference,
    pub sidebar_expanded: bool,
    sidebar_loaded: bool,
    pub profile: ProfileHook,
    pub team_state: TeamStateHook,
    pub people: PeopleHook,
    pub tasks: TaskHook,
    pub notices: Notices,
    pub this_week: WeekCursor,
    pub week: WeekCursor,
    pub board: BoardCursor,
    pub board_drag: DragController<CellTarget>,
    /// Index into the selectable people rows
    pub people_cursor: usize,
    /// Target group while dragging a member
    pub people_target: usize,
    pub people_drag: DragController<String>,
    pub modal: AssignmentModal,
    messages: mpsc::Receiver<WindowMessage>,
    pub show_help: bool,
}

impl App {
    pub fn new(store: Box<dyn Store>, config: BoardConfig, rota_dir: Option<PathBuf>) -> Self {
        let options = QueryOptions::from(&config.cache);
        let catalog = ProjectCatalog::from_config(&config.projects);
        let system_dark = theme::terminal_is_dark();

        let (tx, messages) = mpsc::channel();
        let mut modal = AssignmentModal::new(catalog.clone(), ORIGIN);
        modal.attach_opener(Opener::new(tx, ORIGIN));

        let this_week = WeekCursor::current();
        let mut app = App {
            profile: ProfileHook::new(store.as_ref(), options),
            team_state: TeamStateHook::new(store.as_ref(), options),
            people: PeopleHook::new(store.as_ref(), options),
            tasks: TaskHook::new(store.as_ref(), options),
            store,
            rota_dir,
            theme: Theme::for_appearance(
                theme::resolve(ThemePreference::System, system_dark),
                &config.ui,
            ),
            config,
            catalog,
            view: View::Board,
            mode: Mode::Navigate,
            should_quit: false,
            system_dark,
            theme_pref: ThemePreference::System,
            sidebar_expanded: true,
            sidebar_loaded: false,
            notices: Notices::new(),
            this_week,
            week: this_week,
            board: BoardCursor::default(),
            board_drag: DragController::new(),
            people_cursor: 0,
            people_target: 0,
            people_drag: DragController::new(),
            modal,
            messages,
            show_help: false,
        };
        app.tick(Instant::now());
        app
    }

    /// One turn of the sync loop: apply realtime events, refresh stale
    /// queries, drop unused ones and handle window messages.
    pub fn tick(&mut self, now: Instant) {
        let store = self.store.as_ref();

        self.team_state.sync(store, now);
        self.team_state.refresh(store, now);
        let teams = self.team_state.teams().to_vec();

        self.profile.sync(store, &teams, now);
        self.profile.refresh(store, &teams, now);

        if self.view == View::People {
            self.people.sync(store, &teams, now);
            self.people.refresh(store, &teams, now);
        } else {
            self.people.collect_garbage(now);
        }

        self.tasks.sync(store, &self.catalog, now);
        self.tasks.refresh(store, &self.catalog, now);

        self.apply_profile();
        self.drain_messages();
        self.clamp_cursors();
    }

    fn apply_profile(&mut self) {
        let Some(profile) = self.profile.profile() else {
            return;
        };
        if !self.sidebar_loaded {
            self.sidebar_expanded = profile.sidebar_expanded;
            self.sidebar_loaded = true;
        }
        if profile.theme_preference != self.theme_pref {
            self.theme_pref = profile.theme_preference;
            self.apply_theme();
        }
    }

    pub fn appearance(&self) -> Appearance {
        theme::resolve(self.theme_pref, self.system_dark)
    }

    pub fn apply_theme(&mut self) {
        self.theme = Theme::for_appearance(self.appearance(), &self.config.ui);
    }

    fn drain_messages(&mut self) {
        let pending: Vec<WindowMessage> = self.messages.try_iter().collect();
        for msg in pending {
            if let Some(MessagePayload::TaskSaved) = self.modal.receive_message(msg) {
                self.tasks.invalidate();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Board
    // -----------------------------------------------------------------------

    pub fn teams(&self) -> &[Team] {
        self.team_state.teams()
    }

    pub fn current_team(&self) -> Option<&Team> {
        self.teams().get(self.board.team)
    }

    /// Tasks in the cursor cell
    pub fn cell_tasks(&self) -> Vec<&Task> {
        match self.current_team() {
            Some(team) => self.tasks.tasks_in(&team.name, self.board.day),
            None => Vec::new(),
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let team = self.current_team()?;
        if !self.team_state.is_open(&team.name) {
            return None;
        }
        self.cell_tasks().get(self.board.slot).copied()
    }

    pub fn team_members(&self) -> Vec<&TeamMember> {
        match self.current_team() {
            Some(team) => self.team_state.members_of(&team.name),
            None => Vec::new(),
        }
    }

    pub fn selected_member(&self) -> Option<&TeamMember> {
        self.team_members().get(self.board.member).copied()
    }

    /// Target for a new assignment in the cursor cell. `None` when the
    /// cursor team has no member to assign to.
    pub fn create_target(&self) -> Option<AssignmentTarget> {
        let team = self.current_team()?;
        let member = self.selected_member()?;
        Some(AssignmentTarget {
            day: self.board.day,
            date_label: self.week.date_label(self.board.day),
            member_id: Some(member.id.clone()),
            member_name: member.name.clone(),
            team: team.name.clone(),
        })
    }

    /// Target describing an existing task
    pub fn edit_target(&self, task: &Task) -> AssignmentTarget {
        AssignmentTarget {
            day: task.day,
            date_label: self.week.date_label(task.day),
            member_id: task.assignee_id.clone(),
            member_name: task.assignee.clone(),
            team: task.team.clone(),
        }
    }

    /// Keep cursors inside the current data after a refetch
    pub fn clamp_cursors(&mut self) {
        let teams = self.teams().len();
        self.board.team = self.board.team.min(teams.saturating_sub(1));
        let tasks = self.cell_tasks().len();
        self.board.slot = self.board.slot.min(tasks.saturating_sub(1));
        let members = self.team_members().len();
        self.board.member = self.board.member.min(members.saturating_sub(1));
        let rows = self.people_selectable().len();
        self.people_cursor = self.people_cursor.min(rows.saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // People
    // -----------------------------------------------------------------------

    /// Every row of the people view, headers included
    pub fn people_rows(&self) -> Vec<PeopleRow> {
        let mut rows = Vec::new();
        for group in self.people.grouped(self.teams()) {
            rows.push(PeopleRow::Group(group.team.clone()));
            for m in group.members {
                rows.push(PeopleRow::Member {
                    id: m.id.clone(),
                    group: group.team.clone(),
                });
            }
        }
        let deactivated = self.people.deactivated();
        if !deactivated.is_empty() {
            rows.push(PeopleRow::DeactivatedHeader);
            for m in deactivated {
                rows.push(PeopleRow::Deactivated { id: m.id.clone() });
            }
        }
        rows
    }

    /// Rows the cursor can land on
    pub fn people_selectable(&self) -> Vec<PeopleRow> {
        self.people_rows()
            .into_iter()
            .filter(|r| matches!(r, PeopleRow::Member { .. } | PeopleRow::Deactivated { .. }))
            .collect()
    }

    pub fn selected_person(&self) -> Option<&TeamMember> {
        let rows = self.people_selectable();
        match rows.get(self.people_cursor)? {
            PeopleRow::Member { id, .. } | PeopleRow::Deactivated { id } => self.people.find(id),
            _ => None,
        }
    }

    /// Names of the drop groups in the people view
    pub fn people_groups(&self) -> Vec<String> {
        self.people
            .grouped(self.teams())
            .into_iter()
            .map(|g| g.team)
            .collect()
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            tracing::debug!(view = view.as_str(), "switch view");
            self.view = view;
            self.tick(Instant::now());
        }
    }

    // -----------------------------------------------------------------------
    // UI state
    // -----------------------------------------------------------------------

    pub fn ui_state(&self) -> UiState {
        UiState {
            view: self.view.as_str().to_string(),
            week_offset: self.week.offset_from(self.this_week),
            open_teams: self.team_state.open_teams().clone(),
            cursor: (self.board.team, self.board.day.offset()),
        }
    }

    pub fn restore_ui_state(&mut self, state: &UiState) {
        if state.view == "people" {
            self.view = View::People;
        }
        self.week = self.this_week.shift(state.week_offset);
        self.team_state.restore_open_teams(&state.open_teams);
        self.board.team = state.cursor.0;
        self.board.day = Day::from_offset(state.cursor.1).unwrap_or(Day::Mon);
        self.tick(Instant::now());
    }
}

fn save_ui_state(app: &App) {
    let Some(dir) = app.rota_dir.as_deref() else {
        return;
    };
    if let Err(e) = write_ui_state(dir, &app.ui_state()) {
        tracing::warn!(error = %e, "could not save UI state");
    }
}

/// Run the TUI against the workspace containing `start_dir` (or the cwd)
pub fn run(start_dir: Option<&Path>, user: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = match start_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let root = discover_workspace(&cwd)?;
    let workspace = load_workspace(&root)?;
    crate::logging::init_tui(&workspace.rota_dir, &workspace.config.log.level)?;

    let user = user.or_else(|| workspace.config.session.user.clone());
    tracing::info!(board = %workspace.config.board.name, user = ?user, "starting");
    let store = FileStore::open_watched(&workspace.rota_dir, user)?;
    let kitty = workspace.config.ui.kitty_keyboard.unwrap_or(true);

    let mut app = App::new(Box::new(store), workspace.config, Some(workspace.rota_dir.clone()));
    if let Some(state) = read_ui_state(&workspace.rota_dir) {
        app.restore_ui_state(&state);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if kitty {
        // lets terminals report Ctrl+Enter; unsupported terminals ignore it
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        );
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    save_ui_state(&app);

    if kitty {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    tracing::info!("exiting");

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced state save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                save_ui_state(app);
                save_counter = 0;
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
