use std::time::Instant;

use indexmap::IndexMap;

use crate::io::store::{Select, Store, StoreError, Table};
use crate::model::mappers::{map_rows, member_from_row, team_from_row};
use crate::model::{Team, TeamMember};

use super::Live;
use super::query::{Query, QueryKey, QueryOptions};

/// Teams and their active members for the board, plus which team sections
/// are expanded.
pub struct TeamStateHook {
    teams: Query<Vec<Team>>,
    members: Query<Vec<TeamMember>>,
    teams_live: Live,
    members_live: Live,
    open_teams: IndexMap<String, bool>,
}

impl TeamStateHook {
    pub fn new(store: &dyn Store, options: QueryOptions) -> Self {
        TeamStateHook {
            teams: Query::new(QueryKey::Teams, options),
            members: Query::new(QueryKey::Members, options),
            teams_live: Live::subscribe(store, Table::Teams),
            members_live: Live::subscribe(store, Table::Profiles),
            open_teams: IndexMap::new(),
        }
    }

    pub fn refresh(&mut self, store: &dyn Store, now: Instant) {
        let before = self.teams.fetch_count();
        self.teams.refresh(now, || fetch_teams(store));
        if self.teams.fetch_count() != before {
            self.sync_open_teams();
        }
        let teams = self.teams.data().cloned().unwrap_or_default();
        self.members.refresh(now, || fetch_members(store, &teams));
    }

    /// Apply pending realtime events for teams and profiles. Returns true
    /// when anything arrived.
    pub fn sync(&mut self, store: &dyn Store, now: Instant) -> bool {
        let teams_changed = self.teams_live.pending() > 0;
        let members_changed = self.members_live.pending() > 0;
        if teams_changed {
            self.teams.invalidate();
            // member team names resolve through the team list
            self.members.invalidate();
        }
        if members_changed {
            self.members.invalidate();
        }
        if teams_changed || members_changed {
            self.refresh(store, now);
        }
        teams_changed || members_changed
    }

    pub fn teams(&self) -> &[Team] {
        self.teams.data().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Active members, in render order
    pub fn members(&self) -> &[TeamMember] {
        self.members.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn members_of(&self, team: &str) -> Vec<&TeamMember> {
        self.members()
            .iter()
            .filter(|m| m.team.as_deref() == Some(team))
            .collect()
    }

    pub fn teams_query(&self) -> &Query<Vec<Team>> {
        &self.teams
    }

    pub fn members_query(&self) -> &Query<Vec<TeamMember>> {
        &self.members
    }

    pub fn open_teams(&self) -> &IndexMap<String, bool> {
        &self.open_teams
    }

    /// Whether a team section is expanded. Unknown teams are expanded.
    pub fn is_open(&self, team: &str) -> bool {
        self.open_teams.get(team).copied().unwrap_or(true)
    }

    pub fn toggle_team(&mut self, team: &str) {
        let open = self.is_open(team);
        self.open_teams.insert(team.to_string(), !open);
        tracing::debug!(team, open = !open, "toggle team");
    }

    /// Restore saved section state, e.g. from `.state.json`
    pub fn restore_open_teams(&mut self, saved: &IndexMap<String, bool>) {
        for (name, open) in saved {
            self.open_teams.insert(name.clone(), *open);
        }
    }

    /// New teams start expanded; known teams keep their state
    fn sync_open_teams(&mut self) {
        let names: Vec<String> = self.teams().iter().map(|t| t.name.clone()).collect();
        for name in names {
            self.open_teams.entry(name).or_insert(true);
        }
    }
}

fn fetch_teams(store: &dyn Store) -> Result<Vec<Team>, StoreError> {
    tracing::info!("fetching teams");
    let rows = store.select(Table::Teams, &Select::all().order("order_index"))?;
    Ok(map_rows(&rows, team_from_row))
}

fn fetch_members(store: &dyn Store, teams: &[Team]) -> Result<Vec<TeamMember>, StoreError> {
    tracing::info!("fetching team members");
    let rows = store.select(
        Table::Profiles,
        &Select::all().order("team_id").order("order_index"),
    )?;
    let members = map_rows(&rows, |r| member_from_row(r, teams));
    Ok(members.into_iter().filter(TeamMember::is_active).collect())
}
