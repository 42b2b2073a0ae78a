//! The query intermediate representation.
//!
//! A [`Query`] is ephemeral: it is rebuilt whenever pagination arguments
//! change the order, bounds, or limit, and rendering never mutates it.
//! Placeholder numbering lives on the conditions themselves — the renderer
//! prints whatever the conditions encode, so the binding order of parameters
//! is fixed at construction time.

use serde::Serialize;
use std::fmt;

/// A `table.column` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Create a column reference.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// One join: bring `table` into the query via an equality between a column
/// on it (`left`) and a column on an already-reached table (`right`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    /// The table being joined.
    pub table: String,
    /// Equality operand on the joined table.
    pub left: ColumnRef,
    /// Equality operand on the previously reached chain.
    pub right: ColumnRef,
}

impl Join {
    /// Create a join.
    #[must_use]
    pub fn new(table: impl Into<String>, left: ColumnRef, right: ColumnRef) -> Self {
        Self {
            table: table.into(),
            left,
            right,
        }
    }
}

/// Condition operators used by relationship traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    /// Equality (also used for `= ANY($n)` batch conditions).
    Eq,
    /// Strictly greater; the `after` cursor bound.
    Gt,
    /// Strictly less; the `before` cursor bound.
    Lt,
}

impl Operator {
    /// SQL spelling.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
        }
    }
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValueExpr {
    /// A batched key set: renders `ANY($n)`.
    BatchParam(usize),
    /// A scalar placeholder: renders `$n`.
    Param(usize),
    /// A correlated subquery resolving a cursor row's order-column value:
    /// renders `(SELECT <column> FROM <table> WHERE id = $n)`.
    CursorSubquery {
        /// Table the cursor row lives in.
        table: String,
        /// Order column resolved for the cursor row.
        column: String,
        /// Placeholder bound to the cursor identifier.
        param: usize,
    },
}

impl ValueExpr {
    /// The placeholder index this expression binds.
    #[must_use]
    pub fn param(&self) -> usize {
        match self {
            ValueExpr::BatchParam(n) | ValueExpr::Param(n) => *n,
            ValueExpr::CursorSubquery { param, .. } => *param,
        }
    }
}

/// One WHERE condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Left-hand column.
    pub column: ColumnRef,
    /// Comparison operator.
    pub operator: Operator,
    /// Right-hand value expression.
    pub value: ValueExpr,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderDirection {
    /// Ascending; the forward-paging scan order.
    Ascending,
    /// Descending; the backward-paging scan order.
    Descending,
}

impl OrderDirection {
    /// SQL spelling.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASC",
            OrderDirection::Descending => "DESC",
        }
    }
}

/// An ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Sort column.
    pub column: ColumnRef,
    /// Sort direction.
    pub direction: OrderDirection,
}

/// A compiled relationship-traversal query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// The result table; rows are selected as `<table>.*`.
    pub table: String,
    /// Joins in render order.
    pub joins: Vec<Join>,
    /// Conditions in placeholder order.
    pub conditions: Vec<Condition>,
    /// Optional LIMIT.
    pub limit: Option<u64>,
    /// Optional ORDER BY.
    pub order: Option<Order>,
    /// Always true for relationship traversal: keys arrive as a set.
    pub batched: bool,
    /// The column the batched key set compares against.
    pub key_column: ColumnRef,
}

impl Query {
    /// The next free placeholder index.
    #[must_use]
    pub fn next_param(&self) -> usize {
        self.conditions
            .iter()
            .map(|c| c.value.param())
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref_display() {
        assert_eq!(ColumnRef::new("posts", "id").to_string(), "posts.id");
    }

    #[test]
    fn test_next_param_counts_existing_placeholders() {
        let query = Query {
            table: "posts".to_string(),
            joins: vec![],
            conditions: vec![Condition {
                column: ColumnRef::new("posts", "wrote_in_id"),
                operator: Operator::Eq,
                value: ValueExpr::BatchParam(1),
            }],
            limit: None,
            order: None,
            batched: true,
            key_column: ColumnRef::new("posts", "wrote_in_id"),
        };
        assert_eq!(query.next_param(), 2);
    }
}
