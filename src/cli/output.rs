use serde::Serialize;

use crate::model::{Project, Task, Team, TeamMember};
use crate::util::unicode::fit_to_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TeamJson {
    pub id: String,
    pub name: String,
    pub order_index: i64,
    pub members: usize,
}

#[derive(Serialize)]
pub struct MemberJson {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub is_admin: bool,
    pub status: String,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub day: String,
    pub time_block: String,
    pub team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    pub assignee: String,
    pub color: String,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Result of a write command
#[derive(Serialize)]
pub struct WriteJson {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn team_to_json(team: &Team, members: usize) -> TeamJson {
    TeamJson {
        id: team.id.clone(),
        name: team.name.clone(),
        order_index: team.order_index,
        members,
    }
}

pub fn member_to_json(member: &TeamMember) -> MemberJson {
    MemberJson {
        id: member.id.clone(),
        name: member.name.clone(),
        title: member.title.clone(),
        email: member.email.clone(),
        team: member.team.clone(),
        is_admin: member.is_admin,
        status: member.status.to_string(),
    }
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        day: task.day.to_string(),
        time_block: task.time_block.to_string(),
        team: task.team.clone(),
        assignee_id: task.assignee_id.clone(),
        assignee: task.assignee.clone(),
        color: task.color.clone(),
    }
}

pub fn project_to_json(project: &Project) -> ProjectJson {
    ProjectJson {
        id: project.id.clone(),
        name: project.name.clone(),
        color: project.color.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Short id for display: first 8 characters
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

pub fn format_team_line(team: &Team, members: usize) -> String {
    let noun = if members == 1 { "member" } else { "members" };
    format!("{}  {} ({} {})", short_id(&team.id), team.name, members, noun)
}

pub fn format_member_line(member: &TeamMember) -> String {
    let mut line = format!(
        "{}  {}{}{}",
        fit_to_width(short_id(&member.id), 8),
        fit_to_width(&member.name, 20),
        fit_to_width(&member.title, 24),
        member.team.as_deref().unwrap_or("-"),
    );
    if member.is_admin {
        line.push_str("  [admin]");
    }
    if !member.is_active() {
        line.push_str("  [deactivated]");
    }
    line.trim_end().to_string()
}

pub fn format_task_line(task: &Task) -> String {
    let block = task.time_block.marker();
    let mut line = format!(
        "{}  {}  {}{}{}",
        fit_to_width(short_id(&task.id), 8),
        task.day,
        fit_to_width(&task.team, 14),
        fit_to_width(&task.assignee, 18),
        task.title,
    );
    if !block.is_empty() {
        line.push_str(&format!(" ({})", block));
    }
    if let Some(sub) = task.subtitle() {
        line.push_str(&format!(": {}", sub));
    }
    line
}

pub fn format_project_line(project: &Project) -> String {
    format!("{}  {}", project.color, project.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Day, MemberStatus, TimeBlock};
    use insta::assert_json_snapshot;

    fn task() -> Task {
        Task {
            id: "0f3c9a2e-77aa-4f1b-9d55-1234567890ab".into(),
            title: "Client Support".into(),
            description: Some("ticket triage".into()),
            assignee_id: Some("u-mike".into()),
            assignee: "Mike Ross".into(),
            day: Day::Wed,
            time_block: TimeBlock::Afternoon,
            team: "Engineering".into(),
            color: "#FF2D55".into(),
        }
    }

    #[test]
    fn task_line() {
        let line = format_task_line(&task());
        assert!(line.starts_with("0f3c9a2e  Wed  Engineering"));
        assert!(line.ends_with("Client Support (pm): ticket triage"));
    }

    #[test]
    fn member_line_flags() {
        let member = TeamMember {
            id: "u-olive".into(),
            name: "Olive Gone".into(),
            title: "Team Member".into(),
            avatar: String::new(),
            email: None,
            team: None,
            team_id: None,
            role: None,
            is_admin: true,
            status: MemberStatus::Deactivated,
            order_index: 0,
        };
        let line = format_member_line(&member);
        assert!(line.contains("Olive Gone"));
        assert!(line.ends_with("-  [admin]  [deactivated]"));
    }

    #[test]
    fn short_id_keeps_short_ids() {
        assert_eq!(short_id("t-eng"), "t-eng");
        assert_eq!(short_id("0123456789"), "01234567");
    }

    #[test]
    fn task_json_shape() {
        assert_json_snapshot!(task_to_json(&task()), @r###"
        {
          "id": "0f3c9a2e-77aa-4f1b-9d55-1234567890ab",
          "title": "Client Support",
          "description": "ticket triage",
          "day": "Wed",
          "time_block": "afternoon",
          "team": "Engineering",
          "assignee_id": "u-mike",
          "assignee": "Mike Ross",
          "color": "#FF2D55"
        }
        "###);
    }
}
