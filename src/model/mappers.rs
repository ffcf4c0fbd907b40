//! Translation between raw store rows and board view-models.
//!
//! Rows come from a loosely typed store: most columns are nullable and a few
//! are free text. The mappers normalize all of that in one place so the rest
//! of the crate only sees the closed types in [`crate::model`].

use serde::Deserialize;
use serde_json::{Value, json};

use crate::io::store::{Row, StoreError, Table};

use super::member::{MemberStatus, Profile, TeamMember, ThemePreference};
use super::project::ProjectCatalog;
use super::task::{Day, Task, TimeBlock};
use super::team::{Team, find_team_by_id};

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    team_id: Option<String>,
    /// Legacy free-text team column, used when `team_id` does not resolve
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    is_admin: Option<bool>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    order_index: Option<i64>,
    #[serde(default)]
    theme_preference: Option<String>,
    #[serde(default)]
    sidebar_expanded: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    id: String,
    name: String,
    #[serde(default)]
    order_index: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    assignee_id: Option<String>,
    #[serde(default)]
    assignee: Option<String>,
    day: String,
    #[serde(default)]
    time_block: Option<String>,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(table: Table, row: &Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row.clone())).map_err(|e| StoreError::Decode {
        table,
        reason: e.to_string(),
    })
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

fn parse_status(raw: Option<&str>, id: &str) -> MemberStatus {
    match raw {
        None | Some("active") => MemberStatus::Active,
        Some("deactivated") => MemberStatus::Deactivated,
        Some(other) => {
            tracing::warn!(member = id, status = other, "unknown member status, treating as active");
            MemberStatus::Active
        }
    }
}

fn member_from_profile_row(r: ProfileRow, teams: &[Team]) -> TeamMember {
    let team_id = non_empty(r.team_id);
    let team = team_id
        .as_deref()
        .and_then(|id| find_team_by_id(teams, id))
        .map(|t| t.name.clone())
        .or_else(|| non_empty(r.team));
    let role = non_empty(r.role);
    let title = match (&role, &team) {
        (Some(role), _) => role.clone(),
        (None, Some(team)) => format!("{} Team Member", team),
        (None, None) => "Team Member".to_string(),
    };
    let status = parse_status(r.status.as_deref(), &r.id);
    TeamMember {
        name: r.full_name.unwrap_or_default(),
        title,
        avatar: r.avatar_url.unwrap_or_default(),
        email: non_empty(r.email),
        team,
        team_id,
        role,
        is_admin: r.is_admin.unwrap_or(false),
        status,
        order_index: r.order_index.unwrap_or(0),
        id: r.id,
    }
}

/// Map a `profiles` row to a member. `teams` resolves `team_id` to a name.
pub fn member_from_row(row: &Row, teams: &[Team]) -> Result<TeamMember, StoreError> {
    let r: ProfileRow = decode(Table::Profiles, row)?;
    Ok(member_from_profile_row(r, teams))
}

/// Map a `profiles` row to the signed-in profile, preferences included
pub fn profile_from_row(row: &Row, teams: &[Team]) -> Result<Profile, StoreError> {
    let mut r: ProfileRow = decode(Table::Profiles, row)?;
    let theme_preference = match r.theme_preference.take() {
        None => ThemePreference::default(),
        Some(raw) => raw.parse::<ThemePreference>().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring theme preference");
            ThemePreference::default()
        }),
    };
    let sidebar_expanded = r.sidebar_expanded.take().unwrap_or(true);
    Ok(Profile {
        member: member_from_profile_row(r, teams),
        theme_preference,
        sidebar_expanded,
    })
}

pub fn team_from_row(row: &Row) -> Result<Team, StoreError> {
    let r: TeamRow = decode(Table::Teams, row)?;
    Ok(Team {
        id: r.id,
        name: r.name,
        order_index: r.order_index.unwrap_or(0),
    })
}

/// Map a `tasks` row. The color comes from the catalog when the title names
/// a known project, else from the stored column.
pub fn task_from_row(row: &Row, catalog: &ProjectCatalog) -> Result<Task, StoreError> {
    let r: TaskRow = decode(Table::Tasks, row)?;
    let decode_err = |reason: String| StoreError::Decode {
        table: Table::Tasks,
        reason,
    };
    let day: Day = r.day.parse().map_err(decode_err)?;
    let time_block = match r.time_block.as_deref() {
        None | Some("") => TimeBlock::default(),
        Some(raw) => raw.parse().map_err(decode_err)?,
    };
    let color = catalog
        .lookup_by_title(&r.title)
        .map(|p| p.color.clone())
        .or_else(|| non_empty(r.color))
        .unwrap_or_else(|| catalog.color_for(&r.title).to_string());
    Ok(Task {
        id: r.id,
        title: r.title,
        description: non_empty(r.description),
        assignee_id: non_empty(r.assignee_id),
        assignee: r.assignee.unwrap_or_default(),
        day,
        time_block,
        team: r.team.unwrap_or_default(),
        color,
    })
}

/// Map every row, skipping the ones that do not decode
pub fn map_rows<T>(rows: &[Row], f: impl Fn(&Row) -> Result<T, StoreError>) -> Vec<T> {
    rows.iter()
        .filter_map(|r| match f(r) {
            Ok(mapped) => Some(mapped),
            Err(e) => {
                let id = r.get("id").and_then(Value::as_str).unwrap_or("<no id>");
                tracing::warn!(id, error = %e, "skipping malformed row");
                None
            }
        })
        .collect()
}

/// Row for inserting a task (no `id`; the store assigns one)
pub fn task_row(task: &Task) -> Row {
    let mut row = Row::new();
    row.insert("title".into(), json!(task.title));
    row.insert("description".into(), json!(task.description));
    row.insert("assignee_id".into(), json!(task.assignee_id));
    row.insert("assignee".into(), json!(task.assignee));
    row.insert("day".into(), json!(task.day));
    row.insert("time_block".into(), json!(task.time_block));
    row.insert("team".into(), json!(task.team));
    row.insert("color".into(), json!(task.color));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::row;
    use pretty_assertions::assert_eq;

    fn teams() -> Vec<Team> {
        vec![Team {
            id: "t-design".into(),
            name: "Design".into(),
            order_index: 0,
        }]
    }

    #[test]
    fn member_normalizes_nullable_fields() {
        let r = row([
            ("id", json!("1")),
            ("full_name", Value::Null),
            ("avatar_url", Value::Null),
            ("team_id", json!("t-design")),
            ("status", json!("active")),
        ]);
        let m = member_from_row(&r, &teams()).unwrap();
        assert_eq!(m.name, "");
        assert_eq!(m.avatar, "");
        assert_eq!(m.team.as_deref(), Some("Design"));
        assert_eq!(m.title, "Design Team Member");
        assert!(!m.is_admin);
        assert_eq!(m.status, MemberStatus::Active);
    }

    #[test]
    fn member_role_wins_over_team_title() {
        let r = row([
            ("id", json!("1")),
            ("full_name", json!("Sarah Chen")),
            ("role", json!("Lead Designer")),
            ("team", json!("Design")),
            ("is_admin", json!(true)),
            ("status", json!("deactivated")),
        ]);
        let m = member_from_row(&r, &[]).unwrap();
        assert_eq!(m.title, "Lead Designer");
        assert_eq!(m.team.as_deref(), Some("Design"));
        assert!(m.is_admin);
        assert_eq!(m.status, MemberStatus::Deactivated);
    }

    #[test]
    fn unassigned_member_has_generic_title() {
        let r = row([("id", json!("1")), ("full_name", json!("Emma Davis"))]);
        let m = member_from_row(&r, &teams()).unwrap();
        assert_eq!(m.team, None);
        assert_eq!(m.title, "Team Member");
    }

    #[test]
    fn profile_reads_preferences_with_defaults() {
        let r = row([("id", json!("1")), ("theme_preference", json!("dark"))]);
        let p = profile_from_row(&r, &[]).unwrap();
        assert_eq!(p.theme_preference, ThemePreference::Dark);
        assert!(p.sidebar_expanded);

        let r = row([("id", json!("1")), ("theme_preference", json!("neon"))]);
        let p = profile_from_row(&r, &[]).unwrap();
        assert_eq!(p.theme_preference, ThemePreference::System);
    }

    #[test]
    fn task_color_comes_from_catalog() {
        let catalog = ProjectCatalog::default();
        let r = row([
            ("id", json!("t1")),
            ("title", json!("Client Support")),
            ("day", json!("Wed")),
            ("team", json!("Design")),
            ("color", json!("#000000")),
        ]);
        let t = task_from_row(&r, &catalog).unwrap();
        assert_eq!(t.color, "#FF2D55");
        assert_eq!(t.time_block, TimeBlock::WholeDay);
        assert_eq!(t.day, Day::Wed);
    }

    #[test]
    fn task_with_bad_day_is_a_decode_error() {
        let catalog = ProjectCatalog::default();
        let r = row([("id", json!("t1")), ("title", json!("X")), ("day", json!("Sun"))]);
        let err = task_from_row(&r, &catalog).unwrap_err();
        assert!(matches!(err, StoreError::Decode { table: Table::Tasks, .. }));
    }

    #[test]
    fn map_rows_keeps_the_rows_that_decode() {
        let rows = vec![
            row([("id", json!("t1")), ("name", json!("Design"))]),
            row([("id", json!("t2")), ("name", json!(null))]),
            row([("name", json!("No Id"))]),
            row([("id", json!("t3")), ("name", json!("Engineering"))]),
        ];
        let names: Vec<String> = map_rows(&rows, team_from_row)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Design", "Engineering"]);
    }

    #[test]
    fn task_row_maps_back() {
        let catalog = ProjectCatalog::default();
        let task = Task {
            id: String::new(),
            title: "User Testing".into(),
            description: Some("Round 2".into()),
            assignee_id: Some("m1".into()),
            assignee: "Mike Johnson".into(),
            day: Day::Thu,
            time_block: TimeBlock::Morning,
            team: "Development".into(),
            color: "#FF3B30".into(),
        };
        let mut r = task_row(&task);
        assert_eq!(r.get("time_block"), Some(&json!("morning")));
        r.insert("id".into(), json!("new"));
        let back = task_from_row(&r, &catalog).unwrap();
        assert_eq!(back.day, Day::Thu);
        assert_eq!(back.description.as_deref(), Some("Round 2"));
        assert_eq!(back.id, "new");
    }
}
