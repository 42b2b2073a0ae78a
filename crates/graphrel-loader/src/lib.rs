//! Request-scoped batched relationship resolution.
//!
//! Every relationship field resolved during a request goes through a loader
//! built over that relationship's compiled [`RelationPlan`]. Loaders exist to
//! turn N concurrent key lookups into one statement execution and to hand
//! back cached rows for repeated keys — the N+1 anti-pattern is the thing
//! this crate exists to prevent.
//!
//! # Design Philosophy
//!
//! - **Explicit batch boundaries**: callers [`queue`](SingularLoader::queue)
//!   keys as resolution requests arrive and [`flush`](SingularLoader::flush)
//!   once per logical batch. Dispatching per call would defeat the layer and
//!   is treated as a correctness bug, not a missed optimization.
//! - **Request-local state**: all mutable state lives behind `&mut self` in
//!   values owned by one request; nothing is shared, so nothing is locked.
//!   Drop the loader when the request ends.
//! - **Order preservation**: results always come back in the caller's key
//!   order, duplicates included.
//! - **One query per distinct cache key**: within a request, a (relationship,
//!   key set) or (relationship, key, arguments) combination is executed at
//!   most once.
//!
//! # Example
//!
//! ```ignore
//! let mut loader = SingularLoader::new(plan.clone());
//! loader.queue(Value::from("a"));
//! loader.queue(Value::from("b"));
//! loader.queue(Value::from("a"));
//! loader.flush(&cx, &executor).await?;   // exactly one statement
//! let first = loader.get(&Value::from("a"));
//! ```

pub mod connection;

pub use connection::{Connection, Edge, PageInfo};

use asupersync::{Cx, Outcome};
use graphrel_core::error::Error;
use graphrel_core::executor::Executor;
use graphrel_core::row::Row;
use graphrel_core::value::Value;
use graphrel_query::page::{ConnectionArgs, paginate};
use graphrel_query::path::RelationPlan;
use graphrel_query::render::render_query;
use std::collections::HashMap;
use std::sync::Arc;

/// Batched loader for a singular (to-one) relationship field.
///
/// Keys accumulate via [`queue`](Self::queue) and are coalesced into a single
/// statement by [`flush`](Self::flush); [`get`](Self::get) then serves each
/// key from the request-scoped cache.
#[derive(Debug)]
pub struct SingularLoader {
    plan: Arc<RelationPlan>,
    pending: Vec<Value>,
    cache: HashMap<Value, Option<Row>>,
    statements_issued: usize,
}

impl SingularLoader {
    /// Create a loader over a compiled plan.
    #[must_use]
    pub fn new(plan: Arc<RelationPlan>) -> Self {
        Self {
            plan,
            pending: Vec::new(),
            cache: HashMap::new(),
            statements_issued: 0,
        }
    }

    /// The plan this loader resolves.
    #[must_use]
    pub fn plan(&self) -> &RelationPlan {
        &self.plan
    }

    /// Number of statements this loader has executed so far.
    #[must_use]
    pub fn statements_issued(&self) -> usize {
        self.statements_issued
    }

    /// Record one key for the next batch dispatch.
    pub fn queue(&mut self, key: Value) {
        self.pending.push(key);
    }

    /// Dispatch the pending batch: one statement for every distinct,
    /// not-yet-cached key queued so far.
    ///
    /// NULL keys resolve to absence without touching the executor. On an
    /// executor failure the pending set is restored so the batch is not
    /// half-applied; unrelated loaders are unaffected.
    #[tracing::instrument(level = "debug", skip(self, cx, executor), fields(field = %self.plan.field_name))]
    pub async fn flush<E: Executor>(&mut self, cx: &Cx, executor: &E) -> Outcome<(), Error> {
        let pending = std::mem::take(&mut self.pending);

        let mut keys: Vec<Value> = Vec::new();
        for key in &pending {
            if key.is_null() {
                self.cache.entry(Value::Null).or_insert(None);
            } else if !self.cache.contains_key(key) && !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        if keys.is_empty() {
            return Outcome::Ok(());
        }

        tracing::debug!(keys = keys.len(), "dispatching batched lookup");

        if self.plan.key_on_result_table() {
            let params = vec![Value::Array(keys.clone())];
            let rows = match executor.query(cx, &self.plan.sql, &params).await {
                Outcome::Ok(rows) => rows,
                Outcome::Err(e) => {
                    self.pending = pending;
                    return Outcome::Err(e);
                }
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            self.statements_issued += 1;

            // Group by the resolved key column; the first match wins for a
            // to-one field.
            let key_column = self.plan.query.key_column.column.clone();
            let mut grouped: HashMap<Value, Row> = HashMap::new();
            for row in rows {
                if let Some(key) = row.get(&key_column) {
                    grouped.entry(key.clone()).or_insert(row.clone());
                }
            }
            for key in keys {
                let row = grouped.remove(&key);
                self.cache.insert(key, row);
            }
        } else {
            // The key column is not part of the selected row (multi-hop
            // plan), so whole-set results cannot be regrouped. Execute per
            // distinct key; memoization still guarantees one statement per
            // key per request.
            for key in keys {
                let params = vec![Value::Array(vec![key.clone()])];
                let rows = match executor.query(cx, &self.plan.sql, &params).await {
                    Outcome::Ok(rows) => rows,
                    Outcome::Err(e) => {
                        self.pending = pending;
                        return Outcome::Err(e);
                    }
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                };
                self.statements_issued += 1;
                self.cache.insert(key, rows.into_iter().next());
            }
        }

        Outcome::Ok(())
    }

    /// Read a flushed key's result. Keys never queued — or not yet flushed —
    /// read as absent.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<Row> {
        self.cache.get(key).and_then(Clone::clone)
    }

    /// Whether a key has been resolved in this request.
    #[must_use]
    pub fn is_cached(&self, key: &Value) -> bool {
        self.cache.contains_key(key)
    }

    /// Queue all keys, flush once, and collect results in input order.
    ///
    /// Duplicate keys each resolve independently to the same cached row.
    pub async fn load_many<E: Executor>(
        &mut self,
        cx: &Cx,
        executor: &E,
        keys: &[Value],
    ) -> Outcome<Vec<Option<Row>>, Error> {
        for key in keys {
            self.queue(key.clone());
        }
        match self.flush(cx, executor).await {
            Outcome::Ok(()) => {}
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
        Outcome::Ok(keys.iter().map(|key| self.get(key)).collect())
    }
}

/// Cache key for one connection load.
type ConnectionKey = (Value, ConnectionArgs);

/// Loader for a plural (connection-shaped) relationship field.
///
/// Pagination arguments can differ per call, so each distinct (key,
/// arguments) pair compiles and executes independently; repeats within the
/// request are served from cache without re-querying.
#[derive(Debug)]
pub struct ConnectionLoader {
    plan: Arc<RelationPlan>,
    cache: HashMap<ConnectionKey, Connection>,
    // Unpaginated rows per (key, order column), scan-ascending; totals and
    // page flags derive from here.
    base_cache: HashMap<(Value, String), Vec<Row>>,
    statements_issued: usize,
}

impl ConnectionLoader {
    /// Create a loader over a compiled plan.
    #[must_use]
    pub fn new(plan: Arc<RelationPlan>) -> Self {
        Self {
            plan,
            cache: HashMap::new(),
            base_cache: HashMap::new(),
            statements_issued: 0,
        }
    }

    /// The plan this loader resolves.
    #[must_use]
    pub fn plan(&self) -> &RelationPlan {
        &self.plan
    }

    /// Number of statements this loader has executed so far.
    #[must_use]
    pub fn statements_issued(&self) -> usize {
        self.statements_issued
    }

    /// Resolve one (key, arguments) pair into a connection page.
    #[tracing::instrument(level = "debug", skip(self, cx, executor, args), fields(field = %self.plan.field_name))]
    pub async fn load<E: Executor>(
        &mut self,
        cx: &Cx,
        executor: &E,
        key: &Value,
        args: &ConnectionArgs,
    ) -> Outcome<Connection, Error> {
        if let Err(e) = args.validate() {
            return Outcome::Err(e);
        }
        let cache_key = (key.clone(), args.clone());
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("serving connection from request cache");
            return Outcome::Ok(cached.clone());
        }

        // One unpaginated execution per (key, order) backs the totals.
        let order_args = ConnectionArgs {
            order_by: args.order_by.clone(),
            ..ConnectionArgs::default()
        };
        let base = match self.base_rows(cx, executor, key, &order_args).await {
            Outcome::Ok(base) => base,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let edges = if args.is_empty() {
            base.iter().map(edge_for).collect::<Vec<_>>()
        } else {
            let paged = match paginate(&self.plan.query, args) {
                Ok(paged) => paged,
                Err(e) => return Outcome::Err(e),
            };
            let sql = render_query(&paged);
            let mut params = vec![Value::Array(vec![key.clone()])];
            if let Some(cursor) = args.after.as_ref().or(args.before.as_ref()) {
                params.push(Value::Text(cursor.clone()));
            }
            let rows = match executor.query(cx, &sql, &params).await {
                Outcome::Ok(rows) => rows,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            self.statements_issued += 1;
            rows.iter().map(edge_for).collect()
        };

        let connection = Connection {
            page_info: page_info(&base, &edges),
            count: edges.len(),
            total_count: base.len(),
            edges,
        };
        self.cache.insert(cache_key, connection.clone());
        Outcome::Ok(connection)
    }

    /// Fetch (or reuse) the scan-ascending unpaginated rows for a key.
    async fn base_rows<E: Executor>(
        &mut self,
        cx: &Cx,
        executor: &E,
        key: &Value,
        order_args: &ConnectionArgs,
    ) -> Outcome<Vec<Row>, Error> {
        let order_column = order_args
            .order_by
            .clone()
            .unwrap_or_else(|| "seq".to_string());
        let base_key = (key.clone(), order_column);
        if let Some(rows) = self.base_cache.get(&base_key) {
            return Outcome::Ok(rows.clone());
        }

        let base_query = match paginate(&self.plan.query, order_args) {
            Ok(query) => query,
            Err(e) => return Outcome::Err(e),
        };
        let sql = render_query(&base_query);
        let params = vec![Value::Array(vec![key.clone()])];
        let rows = match executor.query(cx, &sql, &params).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        self.statements_issued += 1;
        self.base_cache.insert(base_key, rows.clone());
        Outcome::Ok(rows)
    }
}

/// Wrap a row into an edge; the cursor is the row's identifier.
fn edge_for(row: &Row) -> Edge {
    Edge {
        node: row.clone(),
        cursor: row.get("id").map(Value::to_cursor).unwrap_or_default(),
    }
}

/// Derive page flags from edge positions within the scan-ascending base.
fn page_info(base: &[Row], edges: &[Edge]) -> PageInfo {
    let positions: Vec<usize> = edges
        .iter()
        .filter_map(|edge| {
            base.iter().position(|row| {
                row.get("id").map(Value::to_cursor).as_deref() == Some(edge.cursor.as_str())
            })
        })
        .collect();
    let (Some(&min), Some(&max)) = (positions.iter().min(), positions.iter().max()) else {
        return PageInfo::default();
    };
    PageInfo {
        has_previous_page: min > 0,
        has_next_page: max + 1 < base.len(),
    }
}
