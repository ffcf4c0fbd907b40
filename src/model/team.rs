use serde::{Deserialize, Serialize};

/// Name of the synthetic group for members without a team
pub const UNASSIGNED: &str = "Unassigned";

/// A team, as read from the `teams` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Render order only; no gap or compaction guarantee
    #[serde(default)]
    pub order_index: i64,
}

/// Find a team by its display name
pub fn find_team_by_name<'a>(teams: &'a [Team], name: &str) -> Option<&'a Team> {
    teams.iter().find(|t| t.name == name)
}

/// Find a team by its id
pub fn find_team_by_id<'a>(teams: &'a [Team], id: &str) -> Option<&'a Team> {
    teams.iter().find(|t| t.id == id)
}
