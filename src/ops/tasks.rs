use std::time::Instant;

use serde_json::json;

use crate::io::store::{Filter, Row, Select, Store, StoreError, Table, row_id};
use crate::model::mappers::{map_rows, task_from_row, task_row};
use crate::model::{Day, ProjectCatalog, Task, TimeBlock};

use super::notice::Notices;
use super::query::{Query, QueryKey, QueryOptions};
use super::{Live, finish_write};

/// Mutation produced by a drop: move a task to a grid cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTask {
    pub task_id: String,
    pub day: Day,
    pub team: String,
}

/// Apply a move to a task in place. Applying the same move twice is the
/// same as applying it once.
pub fn apply_move(task: &mut Task, mv: &MoveTask) {
    task.day = mv.day;
    task.team = mv.team.clone();
}

/// Partial edit of a task. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Project name; also updates the stored color
    pub project: Option<String>,
    pub time_block: Option<TimeBlock>,
    /// `Some("")` clears the description
    pub description: Option<String>,
    pub day: Option<Day>,
    pub team: Option<String>,
    pub assignee_id: Option<String>,
    pub assignee: Option<String>,
}

impl TaskPatch {
    pub fn into_row(self, catalog: &ProjectCatalog) -> Row {
        let mut r = Row::new();
        if let Some(p) = self.project {
            r.insert("color".into(), json!(catalog.color_for(&p)));
            r.insert("title".into(), json!(p));
        }
        if let Some(b) = self.time_block {
            r.insert("time_block".into(), json!(b));
        }
        if let Some(d) = self.description {
            let d = Some(d).filter(|s| !s.trim().is_empty());
            r.insert("description".into(), json!(d));
        }
        if let Some(d) = self.day {
            r.insert("day".into(), json!(d));
        }
        if let Some(t) = self.team {
            r.insert("team".into(), json!(t));
        }
        if let Some(a) = self.assignee_id {
            r.insert("assignee_id".into(), json!(a));
        }
        if let Some(a) = self.assignee {
            r.insert("assignee".into(), json!(a));
        }
        r
    }
}

/// Fields for a new assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub project: String,
    pub time_block: TimeBlock,
    pub description: Option<String>,
    pub day: Day,
    pub team: String,
    pub assignee_id: Option<String>,
    pub assignee: String,
}

impl NewTask {
    fn into_task(self, catalog: &ProjectCatalog) -> Task {
        Task {
            id: String::new(),
            color: catalog.color_for(&self.project).to_string(),
            title: self.project,
            description: self.description.filter(|d| !d.trim().is_empty()),
            assignee_id: self.assignee_id,
            assignee: self.assignee,
            day: self.day,
            time_block: self.time_block,
            team: self.team,
        }
    }
}

/// Task assignments on the board
pub struct TaskHook {
    tasks: Query<Vec<Task>>,
    live: Live,
}

impl TaskHook {
    pub fn new(store: &dyn Store, options: QueryOptions) -> Self {
        TaskHook {
            tasks: Query::new(QueryKey::Tasks, options),
            live: Live::subscribe(store, Table::Tasks),
        }
    }

    pub fn refresh(&mut self, store: &dyn Store, catalog: &ProjectCatalog, now: Instant) {
        self.tasks.refresh(now, || fetch_tasks(store, catalog));
    }

    pub fn sync(&mut self, store: &dyn Store, catalog: &ProjectCatalog, now: Instant) -> bool {
        if self.live.pending() == 0 {
            return false;
        }
        self.tasks.invalidate();
        self.refresh(store, catalog, now);
        true
    }

    pub fn query(&self) -> &Query<Vec<Task>> {
        &self.tasks
    }

    pub fn invalidate(&mut self) {
        self.tasks.invalidate();
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.data().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tasks in one grid cell
    pub fn tasks_in(&self, team: &str, day: Day) -> Vec<&Task> {
        self.tasks()
            .iter()
            .filter(|t| t.is_in_cell(team, day))
            .collect()
    }

    /// Tasks for one member on one day
    pub fn tasks_for(&self, member_id: &str, day: Day) -> Vec<&Task> {
        self.tasks()
            .iter()
            .filter(|t| t.day == day && t.assignee_id.as_deref() == Some(member_id))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    /// Insert a new task. Returns the stored id.
    pub fn create(
        &mut self,
        store: &dyn Store,
        catalog: &ProjectCatalog,
        notices: &mut Notices,
        new: NewTask,
    ) -> Option<String> {
        let task = new.into_task(catalog);
        self.insert(store, notices, &task, "Task created", "Failed to create task")
    }

    /// Copy a task into the same cell. Returns the copy's id.
    pub fn duplicate(&mut self, store: &dyn Store, notices: &mut Notices, id: &str) -> Option<String> {
        let Some(task) = self.find(id).cloned() else {
            tracing::warn!(task = id, "duplicate of unknown task");
            notices.error("Error", "Failed to duplicate task");
            return None;
        };
        self.insert(store, notices, &task, "Task duplicated", "Failed to duplicate task")
    }

    pub fn update(
        &mut self,
        store: &dyn Store,
        catalog: &ProjectCatalog,
        notices: &mut Notices,
        id: &str,
        patch: TaskPatch,
    ) -> bool {
        self.write(
            store,
            notices,
            id,
            patch.into_row(catalog),
            "Task updated".to_string(),
            "Failed to update task",
        )
    }

    /// Persist a drop. Moving onto the current cell is a valid no-op move.
    pub fn move_task(&mut self, store: &dyn Store, notices: &mut Notices, mv: &MoveTask) -> bool {
        let mut patch = Row::new();
        patch.insert("day".into(), json!(mv.day));
        patch.insert("team".into(), json!(mv.team));
        let ok = self.write(
            store,
            notices,
            &mv.task_id,
            patch,
            format!("Task moved to {} {}", mv.team, mv.day),
            "Failed to move task",
        );
        if ok {
            tracing::info!(task = %mv.task_id, day = %mv.day, team = %mv.team, "task moved");
        }
        ok
    }

    pub fn delete(&mut self, store: &dyn Store, notices: &mut Notices, id: &str) -> bool {
        let filter = Filter::id(id);
        let ok = finish_write(
            store.delete(Table::Tasks, &filter),
            Table::Tasks,
            &filter,
            notices,
            "Task deleted".to_string(),
            "Failed to delete task",
        );
        if ok {
            self.tasks.invalidate();
        }
        ok
    }

    fn insert(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        task: &Task,
        success: &str,
        failure: &str,
    ) -> Option<String> {
        match store.insert(Table::Tasks, task_row(task)) {
            Ok(stored) => {
                let id = row_id(&stored).map(String::from);
                tracing::info!(task = ?id, title = %task.title, "{}", success);
                notices.info("Success", success);
                self.tasks.invalidate();
                id
            }
            Err(e) => {
                tracing::error!(error = %e, "{}", failure);
                notices.error("Error", failure);
                None
            }
        }
    }

    fn write(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        id: &str,
        patch: Row,
        success: String,
        failure: &str,
    ) -> bool {
        let filter = Filter::id(id);
        let ok = finish_write(
            store.update(Table::Tasks, &filter, patch),
            Table::Tasks,
            &filter,
            notices,
            success,
            failure,
        );
        if ok {
            self.tasks.invalidate();
        }
        ok
    }
}

fn fetch_tasks(store: &dyn Store, catalog: &ProjectCatalog) -> Result<Vec<Task>, StoreError> {
    tracing::info!("fetching tasks");
    let rows = store.select(Table::Tasks, &Select::all().order("day").order("time_block"))?;
    let mut tasks = map_rows(&rows, |r| task_from_row(r, catalog));
    // column order is lexical; cells want weekday then whole-day, am, pm
    tasks.sort_by_key(|t| (t.day, t.time_block));
    Ok(tasks)
}
