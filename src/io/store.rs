use std::cmp::Ordering;
use std::fmt;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

/// A raw store row: column name to JSON value
pub type Row = Map<String, Value>;

/// Tables the board reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Teams,
    Tasks,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Profiles, Table::Teams, Table::Tasks];

    pub fn name(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Teams => "teams",
            Table::Tasks => "tasks",
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {table}: {reason}")]
    Read { table: Table, reason: String },
    #[error("could not write {table}: {reason}")]
    Write { table: Table, reason: String },
    #[error("no {table} row matches {filter}")]
    NotFound { table: Table, filter: String },
    #[error("malformed {table} row: {reason}")]
    Decode { table: Table, reason: String },
    #[error("store is locked: {0}")]
    Lock(String),
    #[error("realtime subscription failed: {0}")]
    Watch(String),
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Conjunction of column equality clauses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Match every row
    pub fn all() -> Self {
        Filter::default()
    }

    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::all().and_eq(column, value)
    }

    /// Shorthand for the common single-row `id = ?` filter
    pub fn id(id: &str) -> Self {
        Filter::eq("id", id)
    }

    pub fn and_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((column.to_string(), value.into()));
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.clauses
            .iter()
            .all(|(col, val)| row.get(col).unwrap_or(&Value::Null) == val)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("*");
        }
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|(c, v)| format!("{}={}", c, v))
            .collect();
        f.write_str(&parts.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A read query: filter, ordering and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub filter: Filter,
    pub order: Vec<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn all() -> Self {
        Select::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter = self.filter.and_eq(column, value);
        self
    }

    pub fn order(mut self, column: &str) -> Self {
        self.order.push((column.to_string(), Direction::Ascending));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push((column.to_string(), Direction::Descending));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Apply this query to an in-memory table
    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        let mut out: Vec<Row> = rows
            .iter()
            .filter(|r| self.filter.matches(r))
            .cloned()
            .collect();
        if !self.order.is_empty() {
            out.sort_by(|a, b| {
                for (col, dir) in &self.order {
                    let ord = compare_values(
                        a.get(col).unwrap_or(&Value::Null),
                        b.get(col).unwrap_or(&Value::Null),
                    );
                    let ord = match dir {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(n) = self.limit {
            out.truncate(n);
        }
        out
    }
}

/// Column ordering: numbers numerically, strings lexically, nulls last
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Merge `patch` columns into `row`
pub fn apply_patch(row: &mut Row, patch: &Row) {
    for (k, v) in patch {
        row.insert(k.clone(), v.clone());
    }
}

/// The `id` column of a row, if it is a string
pub fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

// ---------------------------------------------------------------------------
// Realtime
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Which change kinds a subscription wants (`*` = all)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Only(ChangeKind),
}

impl EventFilter {
    fn accepts(self, kind: ChangeKind) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(k) => k == kind,
        }
    }
}

/// A change notification. Handlers only use it as an invalidation signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    /// Affected row id when the store knows it
    pub record_id: Option<String>,
}

struct Subscriber {
    id: u64,
    table: Table,
    filter: EventFilter,
    tx: mpsc::Sender<ChangeEvent>,
}

#[derive(Default)]
struct FeedInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Fan-out of change events to subscriptions. Cloning shares the feed.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        ChangeFeed::default()
    }

    pub fn subscribe(&self, table: Table, filter: EventFilter) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push(Subscriber {
            id,
            table,
            filter,
            tx,
        });
        tracing::debug!(%table, id, "realtime subscribe");
        Subscription {
            id,
            table,
            rx,
            feed: self.clone(),
        }
    }

    /// Deliver an event to every matching subscription
    pub fn publish(&self, event: ChangeEvent) {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        for sub in &inner.subscribers {
            if sub.table == event.table && sub.filter.accepts(event.kind) {
                let _ = sub.tx.send(event.clone());
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.len()
    }

    fn remove(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.retain(|s| s.id != id);
    }
}

/// A live realtime subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    table: Table,
    rx: mpsc::Receiver<ChangeEvent>,
    feed: ChangeFeed,
}

impl Subscription {
    pub fn table(&self) -> Table {
        self.table
    }

    /// Take every pending event without blocking
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.rx.try_iter().collect()
    }

    /// Explicit unsubscribe; equivalent to dropping the handle
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::debug!(table = %self.table, id = self.id, "realtime unsubscribe");
        self.feed.remove(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("table", &self.table)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Row-level access to the backing store
pub trait Store {
    fn select(&self, table: Table, query: &Select) -> Result<Vec<Row>, StoreError>;

    /// Insert a row, assigning an `id` when missing. Returns the stored row.
    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Merge `patch` into every row matching `filter`. Returns the number of rows changed.
    fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<usize, StoreError>;

    fn delete(&self, table: Table, filter: &Filter) -> Result<usize, StoreError>;

    /// Open a realtime subscription for one table
    fn subscribe(&self, table: Table, events: EventFilter) -> Result<Subscription, StoreError>;

    /// Identity of the signed-in member, if any
    fn current_user(&self) -> Option<String>;
}

/// Build a row from `(column, value)` pairs
pub fn row<I, K, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Row> {
        vec![
            row([("id", json!("a")), ("team", json!("Design")), ("order_index", json!(2))]),
            row([("id", json!("b")), ("team", json!("Design")), ("order_index", json!(1))]),
            row([("id", json!("c")), ("team", Value::Null), ("order_index", json!(0))]),
            row([("id", json!("d")), ("team", json!("Alpha")), ("order_index", json!(5))]),
        ]
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().filter_map(row_id).collect()
    }

    #[test]
    fn filter_eq_and_missing_columns() {
        let rows = sample();
        let q = Select::all().eq("team", "Design");
        assert_eq!(ids(&q.apply(&rows)), vec!["a", "b"]);

        let q = Select::all().eq("team", Value::Null);
        assert_eq!(ids(&q.apply(&rows)), vec!["c"]);

        let q = Select::all().eq("nope", "x");
        assert!(q.apply(&rows).is_empty());
    }

    #[test]
    fn ordering_is_multi_key_with_nulls_last() {
        let rows = sample();
        let q = Select::all().order("team").order("order_index");
        assert_eq!(ids(&q.apply(&rows)), vec!["d", "b", "a", "c"]);

        let q = Select::all().order_desc("order_index").limit(2);
        assert_eq!(ids(&q.apply(&rows)), vec!["d", "a"]);
    }

    #[test]
    fn feed_delivers_to_matching_table_and_kind() {
        let feed = ChangeFeed::new();
        let all = feed.subscribe(Table::Profiles, EventFilter::All);
        let inserts = feed.subscribe(Table::Profiles, EventFilter::Only(ChangeKind::Insert));
        let teams = feed.subscribe(Table::Teams, EventFilter::All);

        feed.publish(ChangeEvent {
            table: Table::Profiles,
            kind: ChangeKind::Update,
            record_id: Some("a".into()),
        });

        assert_eq!(all.drain().len(), 1);
        assert!(inserts.drain().is_empty());
        assert!(teams.drain().is_empty());
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe(Table::Tasks, EventFilter::All);
        let other = feed.subscribe(Table::Tasks, EventFilter::All);
        assert_eq!(feed.subscriber_count(), 2);
        drop(sub);
        assert_eq!(feed.subscriber_count(), 1);
        other.unsubscribe();
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn patch_merges_columns() {
        let mut r = row([("id", json!("a")), ("is_admin", json!(false))]);
        apply_patch(&mut r, &row([("is_admin", json!(true))]));
        assert_eq!(r.get("is_admin"), Some(&json!(true)));
        assert_eq!(row_id(&r), Some("a"));
    }

    #[test]
    fn filter_display() {
        assert_eq!(Filter::all().to_string(), "*");
        assert_eq!(Filter::id("x").to_string(), "id=\"x\"");
    }
}
