//! The task assignment modal: pick a project, a time block and an optional
//! description for one member on one day.

use crate::model::{Day, Project, ProjectCatalog, Task, TimeBlock};
use crate::util::unicode::pop_grapheme;

use super::messaging::{MessagePayload, Opener, WindowMessage, accept};

/// Title shown when an edited task has no usable title
pub const UNTITLED_TASK: &str = "Untitled task";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    OpenForCreate,
    OpenForEdit { task_id: String },
}

/// The cell the modal was opened for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTarget {
    pub day: Day,
    /// e.g. "Wed 14 Oct"
    pub date_label: String,
    pub member_id: Option<String>,
    pub member_name: String,
    pub team: String,
}

/// Which control has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalField {
    #[default]
    Filter,
    Projects,
    TimeBlock,
    Description,
}

impl ModalField {
    pub fn next(self) -> ModalField {
        match self {
            ModalField::Filter => ModalField::Projects,
            ModalField::Projects => ModalField::TimeBlock,
            ModalField::TimeBlock => ModalField::Description,
            ModalField::Description => ModalField::Filter,
        }
    }

    pub fn prev(self) -> ModalField {
        match self {
            ModalField::Filter => ModalField::Description,
            ModalField::Projects => ModalField::Filter,
            ModalField::TimeBlock => ModalField::Projects,
            ModalField::Description => ModalField::TimeBlock,
        }
    }
}

/// What a successful save hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub project: Project,
    pub time_block: TimeBlock,
    /// `None` when left empty
    pub description: Option<String>,
    /// The edited task, `None` for a new assignment
    pub task_id: Option<String>,
    pub target: AssignmentTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    Closed,
}

pub struct AssignmentModal {
    catalog: ProjectCatalog,
    origin: String,
    opener: Option<Opener>,
    state: ModalState,
    target: Option<AssignmentTarget>,
    project: Option<Project>,
    fallback_title: Option<String>,
    time_block: TimeBlock,
    description: String,
    filter: String,
    focus: ModalField,
    cursor: usize,
}

impl AssignmentModal {
    /// `origin` identifies this window for cross-window messages
    pub fn new(catalog: ProjectCatalog, origin: &str) -> Self {
        AssignmentModal {
            catalog,
            origin: origin.to_string(),
            opener: None,
            state: ModalState::Closed,
            target: None,
            project: None,
            fallback_title: None,
            time_block: TimeBlock::WholeDay,
            description: String::new(),
            filter: String::new(),
            focus: ModalField::Filter,
            cursor: 0,
        }
    }

    pub fn open_create(&mut self, target: AssignmentTarget) {
        self.reset();
        tracing::debug!(member = %target.member_name, day = %target.day, "open create");
        self.target = Some(target);
        self.state = ModalState::OpenForCreate;
    }

    /// Open on an existing task. A title that names no project opens the
    /// modal without a selection; the user has to pick one to save.
    pub fn open_edit(&mut self, target: AssignmentTarget, task: &Task) {
        self.reset();
        match self.catalog.lookup_by_title(&task.title) {
            Some(project) => {
                self.project = Some(project.clone());
                self.time_block = task.time_block;
                self.description = task.description.clone().unwrap_or_default();
                self.cursor = self
                    .catalog
                    .projects()
                    .iter()
                    .position(|p| p.name == project.name)
                    .unwrap_or(0);
            }
            None => {
                tracing::warn!(task = %task.id, title = %task.title, "task title matches no project");
                let title = task.title.trim();
                self.fallback_title = Some(if title.is_empty() {
                    UNTITLED_TASK.to_string()
                } else {
                    title.to_string()
                });
            }
        }
        self.target = Some(target);
        self.state = ModalState::OpenForEdit {
            task_id: task.id.clone(),
        };
    }

    pub fn is_open(&self) -> bool {
        self.state != ModalState::Closed
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn target(&self) -> Option<&AssignmentTarget> {
        self.target.as_ref()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Title of an edited task that is not in the catalog
    pub fn fallback_title(&self) -> Option<&str> {
        self.fallback_title.as_deref()
    }

    pub fn time_block(&self) -> TimeBlock {
        self.time_block
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn focus(&self) -> ModalField {
        self.focus
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Header line, e.g. "Wed 14 Oct - Sarah Chen"
    pub fn heading(&self) -> String {
        match &self.target {
            Some(t) => format!("{} - {}", t.date_label, t.member_name),
            None => String::new(),
        }
    }

    pub fn filtered_projects(&self) -> Vec<&Project> {
        self.catalog.filter(&self.filter)
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
        self.cursor = 0;
    }

    pub fn select_project(&mut self, project: &Project) {
        self.project = Some(project.clone());
        self.fallback_title = None;
    }

    /// Select the project under the list cursor
    pub fn select_at_cursor(&mut self) -> bool {
        let Some(project) = self.filtered_projects().get(self.cursor).map(|p| (*p).clone()) else {
            return false;
        };
        self.select_project(&project);
        true
    }

    pub fn cursor_down(&mut self) {
        let len = self.filtered_projects().len();
        if len > 0 {
            self.cursor = (self.cursor + 1).min(len - 1);
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn set_time_block(&mut self, block: TimeBlock) {
        self.time_block = block;
    }

    pub fn set_description(&mut self, text: &str) {
        self.description = text.to_string();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Type a character into the focused text field
    pub fn type_char(&mut self, c: char) {
        match self.focus {
            ModalField::Filter => {
                self.filter.push(c);
                self.cursor = 0;
            }
            ModalField::Description => self.description.push(c),
            ModalField::Projects | ModalField::TimeBlock => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            ModalField::Filter => {
                pop_grapheme(&mut self.filter);
                self.cursor = 0;
            }
            ModalField::Description => pop_grapheme(&mut self.description),
            ModalField::Projects | ModalField::TimeBlock => {}
        }
    }

    pub fn can_save(&self) -> bool {
        self.is_open() && self.project.is_some()
    }

    /// Emit the draft, notify an attached opener and reset. Without a
    /// selected project nothing happens and the modal stays as it is.
    pub fn save(&mut self) -> Option<AssignmentDraft> {
        if !self.is_open() {
            return None;
        }
        let project = self.project.clone()?;
        let target = self.target.clone()?;
        if let Some(opener) = &self.opener {
            match opener.post(MessagePayload::TaskSaved) {
                Ok(()) => tracing::debug!(origin = opener.origin(), "posted taskSaved"),
                Err(e) => tracing::warn!(error = %e, "could not notify opener"),
            }
        }
        let task_id = match &self.state {
            ModalState::OpenForEdit { task_id } => Some(task_id.clone()),
            _ => None,
        };
        let description = self.description.trim();
        let draft = AssignmentDraft {
            project,
            time_block: self.time_block,
            description: (!description.is_empty()).then(|| description.to_string()),
            task_id,
            target,
        };
        tracing::info!(project = %draft.project.name, "assignment saved");
        self.close();
        Some(draft)
    }

    /// Reset every field and close
    pub fn close(&mut self) -> ModalEvent {
        self.reset();
        ModalEvent::Closed
    }

    pub fn attach_opener(&mut self, opener: Opener) {
        self.opener = Some(opener);
    }

    /// Handle an incoming cross-window message. Messages from any other
    /// origin are dropped.
    pub fn receive_message(&self, msg: WindowMessage) -> Option<MessagePayload> {
        match accept(&self.origin, msg) {
            Ok(payload) => {
                tracing::debug!(?payload, "message received");
                Some(payload)
            }
            Err(e) => {
                tracing::debug!(error = %e, "message rejected");
                None
            }
        }
    }

    fn reset(&mut self) {
        self.state = ModalState::Closed;
        self.target = None;
        self.project = None;
        self.fallback_title = None;
        self.time_block = TimeBlock::WholeDay;
        self.description.clear();
        self.filter.clear();
        self.focus = ModalField::Filter;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn target() -> AssignmentTarget {
        AssignmentTarget {
            day: Day::Wed,
            date_label: "Wed 14 Oct".into(),
            member_id: Some("m1".into()),
            member_name: "Sarah Chen".into(),
            team: "Design".into(),
        }
    }

    fn task(title: &str) -> Task {
        Task {
            id: "t1".into(),
            title: title.into(),
            description: Some("Round 2".into()),
            assignee_id: Some("m1".into()),
            assignee: "Sarah Chen".into(),
            day: Day::Wed,
            time_block: TimeBlock::Afternoon,
            team: "Design".into(),
            color: "#000000".into(),
        }
    }

    fn modal() -> AssignmentModal {
        AssignmentModal::new(ProjectCatalog::default(), "rota://board")
    }

    fn assert_reset(m: &AssignmentModal) {
        assert!(m.project().is_none());
        assert_eq!(m.time_block(), TimeBlock::WholeDay);
        assert_eq!(m.description(), "");
        assert_eq!(m.filter(), "");
        assert_eq!(m.state(), &ModalState::Closed);
    }

    #[test]
    fn filter_market_matches_marketing_only() {
        let mut m = modal();
        m.open_create(target());
        m.set_filter("market");
        let names: Vec<&str> = m.filtered_projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Marketing Strategy"]);
    }

    #[test]
    fn save_without_project_is_a_no_op() {
        let mut m = modal();
        m.open_create(target());
        m.set_time_block(TimeBlock::Morning);
        m.set_description("notes");
        assert!(m.save().is_none());
        assert!(m.is_open());
        assert_eq!(m.time_block(), TimeBlock::Morning);
        assert_eq!(m.description(), "notes");
    }

    #[test]
    fn close_resets_after_failed_save() {
        let mut m = modal();
        m.open_create(target());
        m.set_filter("client");
        m.set_time_block(TimeBlock::Afternoon);
        m.set_description("x");
        assert!(m.save().is_none());
        assert_eq!(m.close(), ModalEvent::Closed);
        assert_reset(&m);
    }

    #[test]
    fn save_emits_draft_and_resets() {
        let mut m = modal();
        m.open_create(target());
        m.set_filter("support");
        assert!(m.select_at_cursor());
        m.set_time_block(TimeBlock::Morning);
        m.set_description("  ");
        let draft = m.save().unwrap();
        assert_eq!(draft.project.name, "Client Support");
        assert_eq!(draft.time_block, TimeBlock::Morning);
        assert_eq!(draft.description, None);
        assert_eq!(draft.task_id, None);
        assert_eq!(draft.target.team, "Design");
        assert_reset(&m);
    }

    #[test]
    fn edit_preloads_known_project() {
        let mut m = modal();
        m.open_edit(target(), &task("User Testing"));
        assert_eq!(m.project().unwrap().name, "User Testing");
        assert_eq!(m.time_block(), TimeBlock::Afternoon);
        assert_eq!(m.description(), "Round 2");
        assert_eq!(m.cursor(), 7);
        let draft = m.save().unwrap();
        assert_eq!(draft.task_id.as_deref(), Some("t1"));
    }

    #[test]
    fn edit_unknown_project_degrades() {
        let mut m = modal();
        m.open_edit(target(), &task("Design Review"));
        assert!(m.is_open());
        assert!(m.project().is_none());
        assert_eq!(m.fallback_title(), Some("Design Review"));
        assert_eq!(m.time_block(), TimeBlock::WholeDay);
        assert!(m.save().is_none());

        m.open_edit(target(), &task(""));
        assert_eq!(m.fallback_title(), Some(UNTITLED_TASK));
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut m = modal();
        m.open_create(target());
        for c in "mark".chars() {
            m.type_char(c);
        }
        m.backspace();
        assert_eq!(m.filter(), "mar");
        m.focus_next();
        m.focus_next();
        m.focus_next();
        assert_eq!(m.focus(), ModalField::Description);
        m.type_char('a');
        assert_eq!(m.description(), "a");
        m.focus_next();
        assert_eq!(m.focus(), ModalField::Filter);
    }

    #[test]
    fn save_notifies_opener() {
        let (tx, rx) = mpsc::channel();
        let mut m = modal();
        m.attach_opener(Opener::new(tx, "rota://board"));
        m.open_create(target());
        assert!(m.select_at_cursor());
        assert!(m.save().is_some());
        let msg = rx.try_recv().unwrap();
        assert_eq!(m.receive_message(msg), Some(MessagePayload::TaskSaved));
    }

    #[test]
    fn foreign_messages_are_ignored() {
        let m = modal();
        let msg = WindowMessage {
            origin: "https://evil.example".into(),
            payload: MessagePayload::TaskSaved,
        };
        assert_eq!(m.receive_message(msg), None);
    }

    #[test]
    fn cursor_stays_in_filtered_range() {
        let mut m = modal();
        m.open_create(target());
        m.set_filter("client");
        m.cursor_down();
        m.cursor_down();
        m.cursor_down();
        assert_eq!(m.cursor(), 1);
        m.cursor_up();
        m.cursor_up();
        assert_eq!(m.cursor(), 0);
    }
}
