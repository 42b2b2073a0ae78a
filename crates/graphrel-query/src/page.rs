//! Cursor-based pagination over a compiled query.
//!
//! Connection arguments come in two mutually exclusive groups: forward
//! (`first`/`after`) and backward (`last`/`before`). Supplying both groups
//! is a usage error caught before any SQL is generated. The extension never
//! mutates its input — it derives a new query with the ordering, cursor
//! bound, and limit applied.

use crate::ir::{ColumnRef, Condition, Operator, Order, OrderDirection, Query, ValueExpr};
use graphrel_core::error::{Error, Result};
use graphrel_core::naming::snake_case;
use graphrel_schema::compiler::SEQ_COLUMN;

/// Pagination arguments for a plural (connection-shaped) field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConnectionArgs {
    /// Page size when paging forward.
    pub first: Option<u64>,
    /// Page size when paging backward.
    pub last: Option<u64>,
    /// Exclusive lower cursor (forward paging).
    pub after: Option<String>,
    /// Exclusive upper cursor (backward paging).
    pub before: Option<String>,
    /// Explicit order field; defaults to the insertion-ordered `seq` column.
    pub order_by: Option<String>,
}

impl ConnectionArgs {
    /// Whether any argument is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
            && self.last.is_none()
            && self.after.is_none()
            && self.before.is_none()
            && self.order_by.is_none()
    }

    /// Whether the backward group (`last`/`before`) is in effect.
    #[must_use]
    pub fn is_backward(&self) -> bool {
        self.last.is_some() || self.before.is_some()
    }

    /// Reject combined forward and backward groups.
    pub fn validate(&self) -> Result<()> {
        let forward = self.first.is_some() || self.after.is_some();
        if forward && self.is_backward() {
            return Err(Error::config(
                "cannot combine forward (`first`/`after`) and backward (`last`/`before`) pagination arguments",
            ));
        }
        Ok(())
    }

    /// The cursor in effect, if any.
    fn cursor(&self) -> Option<&str> {
        self.after.as_deref().or(self.before.as_deref())
    }

    /// The page size in effect, if any.
    fn page_size(&self) -> Option<u64> {
        self.first.or(self.last)
    }
}

/// Derive a paginated query from a compiled base query.
///
/// Backward pages scan — and are returned — in descending order: "last N"
/// means the N rows nearest the end, nearest-first.
pub fn paginate(query: &Query, args: &ConnectionArgs) -> Result<Query> {
    args.validate()?;

    let mut paged = query.clone();
    let order_column = args
        .order_by
        .as_deref()
        .map_or_else(|| SEQ_COLUMN.to_string(), snake_case);
    let direction = if args.is_backward() {
        OrderDirection::Descending
    } else {
        OrderDirection::Ascending
    };

    if args.cursor().is_some() {
        let operator = if args.before.is_some() {
            Operator::Lt
        } else {
            Operator::Gt
        };
        let param = paged.next_param();
        paged.conditions.push(Condition {
            column: ColumnRef::new(&paged.table, &order_column),
            operator,
            value: ValueExpr::CursorSubquery {
                table: paged.table.clone(),
                column: order_column.clone(),
                param,
            },
        });
    }

    paged.order = Some(Order {
        column: ColumnRef::new(&paged.table, &order_column),
        direction,
    });
    paged.limit = args.page_size();
    Ok(paged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_query;

    fn base_query() -> Query {
        Query {
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
        }
    }

    #[test]
    fn test_forward_page_with_cursor() {
        let args = ConnectionArgs {
            first: Some(5),
            after: Some("cursor-id".to_string()),
            ..ConnectionArgs::default()
        };
        let paged = paginate(&base_query(), &args).unwrap();
        assert_eq!(
            render_query(&paged),
            "SELECT posts.* FROM posts \
             WHERE posts.wrote_in_id = ANY($1) \
             AND posts.seq > (SELECT seq FROM posts WHERE id = $2) \
             ORDER BY posts.seq ASC LIMIT 5"
        );
    }

    #[test]
    fn test_backward_page_scans_descending() {
        let args = ConnectionArgs {
            last: Some(3),
            before: Some("cursor-id".to_string()),
            ..ConnectionArgs::default()
        };
        let paged = paginate(&base_query(), &args).unwrap();
        assert_eq!(
            render_query(&paged),
            "SELECT posts.* FROM posts \
             WHERE posts.wrote_in_id = ANY($1) \
             AND posts.seq < (SELECT seq FROM posts WHERE id = $2) \
             ORDER BY posts.seq DESC LIMIT 3"
        );
    }

    #[test]
    fn test_combined_groups_fail_before_sql() {
        let args = ConnectionArgs {
            first: Some(5),
            last: Some(3),
            ..ConnectionArgs::default()
        };
        assert!(paginate(&base_query(), &args).unwrap_err().is_config());

        let args = ConnectionArgs {
            after: Some("a".to_string()),
            before: Some("b".to_string()),
            ..ConnectionArgs::default()
        };
        assert!(paginate(&base_query(), &args).unwrap_err().is_config());
    }

    #[test]
    fn test_explicit_order_field() {
        let args = ConnectionArgs {
            first: Some(10),
            order_by: Some("publishedAt".to_string()),
            ..ConnectionArgs::default()
        };
        let paged = paginate(&base_query(), &args).unwrap();
        assert_eq!(
            render_query(&paged),
            "SELECT posts.* FROM posts \
             WHERE posts.wrote_in_id = ANY($1) \
             ORDER BY posts.published_at ASC LIMIT 10"
        );
    }

    #[test]
    fn test_inputs_are_never_mutated() {
        let query = base_query();
        let args = ConnectionArgs {
            first: Some(5),
            after: Some("c".to_string()),
            ..ConnectionArgs::default()
        };
        let _ = paginate(&query, &args).unwrap();
        assert_eq!(query, base_query());
        assert_eq!(query.limit, None);
        assert_eq!(query.conditions.len(), 1);
    }

    #[test]
    fn test_empty_args_add_default_order_only() {
        let paged = paginate(&base_query(), &ConnectionArgs::default()).unwrap();
        assert_eq!(
            render_query(&paged),
            "SELECT posts.* FROM posts \
             WHERE posts.wrote_in_id = ANY($1) \
             ORDER BY posts.seq ASC"
        );
        assert_eq!(paged.limit, None);
    }
}
