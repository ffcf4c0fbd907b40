use std::time::Instant;

use serde_json::json;

use crate::io::store::{Filter, Row, Select, Store, StoreError, Table, row};
use crate::model::mappers::profile_from_row;
use crate::model::{Profile, Team, ThemePreference};

use super::notice::Notices;
use super::query::{Query, QueryKey, QueryOptions};
use super::{Live, finish_write};

/// The signed-in member's profile and UI preferences.
///
/// Disabled (no query, no fetches) when the store has no current user.
pub struct ProfileHook {
    user: Option<String>,
    query: Option<Query<Profile>>,
    live: Live,
}

impl ProfileHook {
    pub fn new(store: &dyn Store, options: QueryOptions) -> Self {
        let user = store.current_user();
        let query = user
            .as_ref()
            .map(|id| Query::new(QueryKey::Profile(id.clone()), options));
        if user.is_none() {
            tracing::info!("no signed-in user, profile disabled");
        }
        ProfileHook {
            user,
            query,
            live: Live::subscribe(store, Table::Profiles),
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.query.as_ref().and_then(|q| q.data())
    }

    pub fn query(&self) -> Option<&Query<Profile>> {
        self.query.as_ref()
    }

    pub fn refresh(&mut self, store: &dyn Store, teams: &[Team], now: Instant) -> Option<&Profile> {
        let (Some(user), Some(query)) = (self.user.as_deref(), self.query.as_mut()) else {
            return None;
        };
        query.refresh(now, || fetch_profile(store, user, teams))
    }

    /// Apply pending realtime events: one invalidation and refetch no matter
    /// how many arrived. Returns true when anything arrived.
    pub fn sync(&mut self, store: &dyn Store, teams: &[Team], now: Instant) -> bool {
        if self.live.pending() == 0 {
            return false;
        }
        if let Some(q) = self.query.as_mut() {
            q.invalidate();
        }
        self.refresh(store, teams, now);
        true
    }

    pub fn sidebar_expanded(&self) -> bool {
        self.profile().is_none_or(|p| p.sidebar_expanded)
    }

    pub fn theme(&self) -> ThemePreference {
        self.profile()
            .map(|p| p.theme_preference)
            .unwrap_or_default()
    }

    pub fn set_sidebar_expanded(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        expanded: bool,
    ) -> bool {
        let state = if expanded { "expanded" } else { "collapsed" };
        self.write(
            store,
            notices,
            row([("sidebar_expanded", json!(expanded))]),
            format!("Sidebar {}", state),
            "Failed to save sidebar state",
        )
    }

    pub fn set_theme(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        theme: ThemePreference,
    ) -> bool {
        self.write(
            store,
            notices,
            row([("theme_preference", json!(theme))]),
            format!("Theme set to {}", theme),
            "Failed to save theme preference",
        )
    }

    /// light -> dark -> system -> light
    pub fn cycle_theme(&mut self, store: &dyn Store, notices: &mut Notices) -> bool {
        let next = self.theme().cycle();
        self.set_theme(store, notices, next)
    }

    fn write(
        &mut self,
        store: &dyn Store,
        notices: &mut Notices,
        patch: Row,
        success: String,
        failure: &str,
    ) -> bool {
        let Some(user) = self.user.clone() else {
            tracing::error!("profile write without a signed-in user");
            notices.error("Error", failure);
            return false;
        };
        let filter = Filter::id(&user);
        let ok = finish_write(
            store.update(Table::Profiles, &filter, patch),
            Table::Profiles,
            &filter,
            notices,
            success,
            failure,
        );
        if ok && let Some(q) = self.query.as_mut() {
            q.invalidate();
        }
        ok
    }
}

fn fetch_profile(store: &dyn Store, user: &str, teams: &[Team]) -> Result<Profile, StoreError> {
    tracing::info!(user, "fetching profile");
    let rows = store.select(Table::Profiles, &Select::all().eq("id", user).limit(1))?;
    let first = rows.first().ok_or_else(|| StoreError::NotFound {
        table: Table::Profiles,
        filter: Filter::id(user).to_string(),
    })?;
    profile_from_row(first, teams)
}
