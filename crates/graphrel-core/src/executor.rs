//! The statement-executor seam.
//!
//! Connection acquisition, parameter binding, row decoding, pooling, and
//! retries all live on the other side of this trait. The core only ever asks
//! for `execute(sql, params) -> rows` and propagates whatever the executor
//! reports; driver failures arrive as [`Error::Executor`] and are never
//! interpreted or retried here.
//!
//! [`Error::Executor`]: crate::error::Error::Executor

use crate::error::Error;
use crate::row::Row;
use crate::value::Value;
use asupersync::{Cx, Outcome};

/// An opaque parameterized-statement executor.
///
/// Parameters bind positionally to `$1`, `$2`, … placeholders in the
/// statement text; a [`Value::Array`] parameter binds the key set of an
/// `= ANY($n)` condition.
pub trait Executor {
    /// Execute a statement and return the decoded rows.
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = Outcome<Vec<Row>, Error>> + Send;
}

impl<E: Executor> Executor for &E {
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = Outcome<Vec<Row>, Error>> + Send {
        (*self).query(cx, sql, params)
    }
}
