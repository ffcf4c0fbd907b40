pub mod assignment;
pub mod drag;
pub mod messaging;
pub mod notice;
pub mod people;
pub mod profile;
pub mod query;
pub mod tasks;
pub mod team_state;
pub mod week;

use crate::io::store::{EventFilter, Filter, Store, StoreError, Subscription, Table};
use notice::Notices;

/// Realtime invalidation source for one table.
///
/// Event payloads are never applied; a hook only asks whether anything
/// arrived since it last looked.
#[derive(Debug)]
pub struct Live {
    sub: Option<Subscription>,
}

impl Live {
    /// Subscribe to every change on `table`. A failed subscription is logged
    /// and leaves the hook working without realtime updates.
    pub fn subscribe(store: &dyn Store, table: Table) -> Self {
        match store.subscribe(table, EventFilter::All) {
            Ok(sub) => Live { sub: Some(sub) },
            Err(e) => {
                tracing::warn!(%table, error = %e, "realtime unavailable");
                Live { sub: None }
            }
        }
    }

    /// Drain pending events, returning how many arrived
    pub fn pending(&self) -> usize {
        let events = self.sub.as_ref().map(|s| s.drain()).unwrap_or_default();
        if !events.is_empty() {
            tracing::debug!(count = events.len(), "realtime events");
        }
        events.len()
    }

    pub fn is_connected(&self) -> bool {
        self.sub.is_some()
    }
}

/// Turn a single-row update result into the hook write contract: a success
/// notice, or one error notice plus a logged diagnostic. Zero affected rows
/// counts as a failure.
pub(crate) fn finish_write(
    result: Result<usize, StoreError>,
    table: Table,
    filter: &Filter,
    notices: &mut Notices,
    success: String,
    failure: &str,
) -> bool {
    let result = result.and_then(|n| {
        if n == 0 {
            Err(StoreError::NotFound {
                table,
                filter: filter.to_string(),
            })
        } else {
            Ok(n)
        }
    });
    match result {
        Ok(_) => {
            tracing::info!(%table, %filter, "{}", success);
            notices.info("Success", success);
            true
        }
        Err(e) => {
            tracing::error!(%table, %filter, error = %e, "{}", failure);
            notices.error("Error", failure);
            false
        }
    }
}
