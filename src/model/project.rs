use serde::{Deserialize, Serialize};

use super::config::ProjectEntry;

/// Color used when a task's project is not in the catalog
pub const DEFAULT_PROJECT_COLOR: &str = "#8E8E93";

/// A bookable project. The catalog is fixed per workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Hex color, e.g. `#34C759`
    pub color: String,
}

impl Project {
    fn new(id: &str, name: &str, color: &str) -> Self {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// The reference catalog of projects tasks can be booked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCatalog {
    projects: Vec<Project>,
}

impl Default for ProjectCatalog {
    fn default() -> Self {
        ProjectCatalog {
            projects: vec![
                Project::new("1", "Company Internal", "#34C759"),
                Project::new("2", "Client Platform 5", "#FF9500"),
                Project::new("3", "Marketing Strategy", "#AF52DE"),
                Project::new("4", "Product Development", "#5856D6"),
                Project::new("5", "Client Support", "#FF2D55"),
                Project::new("6", "Platform Upgrade", "#5AC8FA"),
                Project::new("7", "Internal Training", "#FFCC00"),
                Project::new("8", "User Testing", "#FF3B30"),
            ],
        }
    }
}

impl ProjectCatalog {
    /// Build the catalog from `[[projects]]` config entries.
    /// An empty list keeps the built-in catalog.
    pub fn from_config(entries: &[ProjectEntry]) -> Self {
        if entries.is_empty() {
            return ProjectCatalog::default();
        }
        let projects = entries
            .iter()
            .enumerate()
            .map(|(i, e)| Project {
                id: e.id.clone().unwrap_or_else(|| (i + 1).to_string()),
                name: e.name.clone(),
                color: e
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
            })
            .collect();
        ProjectCatalog { projects }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Look up a project by exact name. Tasks store the project name as
    /// their title, so this is how an existing task finds its project.
    pub fn lookup_by_title(&self, title: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == title)
    }

    /// Case-insensitive substring match on project name. An empty query
    /// returns the whole catalog.
    pub fn filter(&self, query: &str) -> Vec<&Project> {
        let needle = query.trim().to_lowercase();
        self.projects
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Color for a project title, falling back to the default color
    pub fn color_for(&self, title: &str) -> &str {
        self.lookup_by_title(title)
            .map(|p| p.color.as_str())
            .unwrap_or(DEFAULT_PROJECT_COLOR)
    }
}
