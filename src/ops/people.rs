use std::time::Instant;

use serde_json::{Value, json};

use crate::io::store::{Filter, Row, Select, Store, StoreError, Table, row};
use crate::model::mappers::{map_rows, member_from_row};
use crate::model::{MemberStatus, Team, TeamMember, UNASSIGNED};

use super::notice::Notices;
use super::query::{Query, QueryKey, QueryOptions};
use super::{Live, finish_write};

/// Partial update of a member row. `None` leaves the column alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberPatch {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub status: Option<MemberStatus>,
    /// `Some(None)` clears the team
    pub team_id: Option<Option<String>>,
}

impl MemberPatch {
    pub fn into_row(self) -> Row {
        let mut r = Row::new();
        if let Some(v) = self.full_name {
            r.insert("full_name".into(), json!(v));
        }
        if let Some(v) = self.role {
            r.insert("role".into(), json!(v));
        }
        if let Some(v) = self.email {
            r.insert("email".into(), json!(v));
        }
        if let Some(v) = self.is_admin {
            r.insert("is_admin".into(), json!(v));
        }
        if let Some(v) = self.status {
            r.insert("status".into(), json!(v));
        }
        if let Some(v) = self.team_id {
            r.insert("team_id".into(), v.map(Value::String).unwrap_or(Value::Null));
        }
        r
    }

    pub fn is_empty(&self) -> bool {
        *self == MemberPatch::default()
    }
}

/// A team group in the people view
#[derive(Debug, Clone, PartialEq)]
pub struct PeopleGroup<'a> {
    pub team: String,
    pub members: Vec<&'a TeamMember>,
}

/// Every profile, for member management
pub struct PeopleHook {
    profiles: Query<Vec<TeamMember>>,
    live: Live,
}

impl PeopleHook {
    pub fn new(store: &dyn Store, options: QueryOptions) -> Self {
        PeopleHook {
            profiles: Query::new(QueryKey::Profiles, options),
            live: Live::subscribe(store, Table::Profiles),
        }
    }

    pub fn refresh(&mut self, store: &dyn Store, teams: &[Team], now: Instant) {
        self.profiles.refresh(now, || fetch_profiles(store, teams));
    }

    /// Invalidate and refetch once if any realtime events are pending
    pub fn sync(&mut self, store: &dyn Store, teams: &[Team], now: Instant) -> bool {
        if self.live.pending() == 0 {
            return false;
        }
        self.profiles.invalidate();
        self.refresh(store, teams, now);
        true
    }

    /// Force a refetch on the next refresh, e.g. after the team list changed
    pub fn invalidate(&mut self) {
        self.profiles.invalidate();
    }

    pub fn query(&self) -> &Query<Vec<TeamMember>> {
        &self.profiles
    }

    /// Drop the cached list once it has gone unused for the gc window
    pub fn collect_garbage(&mut self, now: Instant) -> bool {
        self.profiles.collect_garbage(now)
    }

    pub fn members(&self) -> &[TeamMember] {
        self.profiles.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, id: &str) -> Option<&TeamMember> {
        self.members().iter().find(|m| m.id == id)
    }

    pub fn active(&self) -> Vec<&TeamMember> {
        self.members().iter().filter(|m| m.is_active()).collect()
    }

    pub fn deactivated(&self) -> Vec<&TeamMember> {
        self.members().iter().filter(|m| !m.is_active()).collect()
    }

    /// Active members grouped by team in team order, then `Unassigned`.
    /// Members whose team is not in `teams` land in `Unassigned`.
    pub fn grouped(&self, teams: &[Team]) -> Vec<PeopleGroup<'_>> {
        let active = self.active();
        let mut groups: Vec<PeopleGroup<'_>> = teams
            .iter()
            .map(|t| PeopleGroup {
                team: t.name.clone(),
                members: active
                    .iter()
                    .copied()
                    .filter(|m| m.team.as_deref() == Some(t.name.as_str()))
                    .collect(),
            })
            .collect();
        let unassigned = active
            .iter()
            .copied()
            .filter(|m| {
                m.team
                    .as_deref()
                    .is_none_or(|name| !teams.iter().any(|t| t.name == name))
            })
            .collect();
        groups.push(PeopleGroup {
            team: UNASSIGNED.to_string(),
            members: unassigned,
        });
        groups
    }

    pub fn update(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        member_id: &str,
        patch: MemberPatch,
    ) -> bool {
        self.write(
            store,
            notices,
            member_id,
            patch,
            "Member updated".to_string(),
            "Failed to update member",
        )
    }

    /// Flip admin rights based on the caller's view of the current value
    pub fn toggle_admin(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        member_id: &str,
        current: bool,
    ) -> bool {
        let granted = !current;
        let patch = MemberPatch {
            is_admin: Some(granted),
            ..Default::default()
        };
        let msg = if granted { "Admin rights granted" } else { "Admin rights revoked" };
        self.write(
            store,
            notices,
            member_id,
            patch,
            msg.to_string(),
            "Failed to update admin status",
        )
    }

    pub fn deactivate(&mut self, store: &dyn Store, notices: &mut Notices, member_id: &str) -> bool {
        let patch = MemberPatch {
            status: Some(MemberStatus::Deactivated),
            ..Default::default()
        };
        self.write(
            store,
            notices,
            member_id,
            patch,
            "Member deactivated".to_string(),
            "Failed to deactivate member",
        )
    }

    /// Reactivate, writing back the member's current team id
    pub fn reactivate(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        member_id: &str,
        team_id: Option<String>,
    ) -> bool {
        let patch = MemberPatch {
            status: Some(MemberStatus::Active),
            team_id: Some(team_id),
            ..Default::default()
        };
        self.write(
            store,
            notices,
            member_id,
            patch,
            "Member reactivated".to_string(),
            "Failed to reactivate member",
        )
    }

    /// Move a member to the team named `team`, or to no team for
    /// `Unassigned`. A name that matches no team also clears the team.
    pub fn reassign_team(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        member_id: &str,
        team: &str,
    ) -> bool {
        const FAILURE: &str = "Failed to update team assignment";
        let team_id = if team == UNASSIGNED {
            None
        } else {
            match resolve_team_id(store, team) {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(team, error = %e, "team lookup failed");
                    notices.error("Error", FAILURE);
                    return false;
                }
            }
        };
        if team != UNASSIGNED && team_id.is_none() {
            tracing::warn!(team, "no team with that name, clearing team");
        }
        let patch = MemberPatch {
            team_id: Some(team_id),
            ..Default::default()
        };
        self.write(
            store,
            notices,
            member_id,
            patch,
            "Team assignment updated".to_string(),
            FAILURE,
        )
    }

    fn write(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        member_id: &str,
        patch: MemberPatch,
        success: String,
        failure: &str,
    ) -> bool {
        let filter = Filter::id(member_id);
        let ok = finish_write(
            store.update(Table::Profiles, &filter, patch.into_row()),
            Table::Profiles,
            &filter,
            notices,
            success,
            failure,
        );
        if ok {
            self.profiles.invalidate();
        }
        ok
    }
}

/// First team id with this name
pub fn resolve_team_id(store: &dyn Store, name: &str) -> Result<Option<String>, StoreError> {
    let rows = store.select(Table::Teams, &Select::all().eq("name", name).limit(1))?;
    Ok(rows
        .first()
        .and_then(|r| r.get("id"))
        .and_then(Value::as_str)
        .map(String::from))
}

fn fetch_profiles(store: &dyn Store, teams: &[Team]) -> Result<Vec<TeamMember>, StoreError> {
    tracing::info!("fetching profiles");
    let rows = store.select(Table::Profiles, &Select::all().order("role").order("order_index"))?;
    Ok(map_rows(&rows, |r| member_from_row(r, teams)))
}

/// Seed row for a new profile
pub fn new_member_row(name: &str, email: Option<&str>, role: Option<&str>, team_id: Option<&str>) -> Row {
    row([
        ("full_name", json!(name)),
        ("email", json!(email)),
        ("role", json!(role)),
        ("team_id", json!(team_id)),
        ("is_admin", json!(false)),
        ("status", json!("active")),
        ("order_index", json!(0)),
    ])
}
