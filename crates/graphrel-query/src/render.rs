//! The SQL renderer: a pure function from query IR to statement text.
//!
//! The output is a bit-exact contract — other tooling may depend on the
//! shape of these statements — so rendering is deterministic and introduces
//! nothing of its own: joins print in list order, conditions print in the
//! order their placeholders are numbered, and the only placeholders emitted
//! are the ones the conditions already encode.

use crate::ir::{Condition, Query, ValueExpr};

/// Render a query as parameterized SQL.
#[must_use]
pub fn render_query(query: &Query) -> String {
    let mut sql = format!("SELECT {table}.* FROM {table}", table = query.table);

    for join in &query.joins {
        sql.push_str(&format!(
            " JOIN {} ON {} = {}",
            join.table, join.left, join.right
        ));
    }

    if !query.conditions.is_empty() {
        let conditions: Vec<String> = query.conditions.iter().map(render_condition).collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    if let Some(order) = &query.order {
        sql.push_str(&format!(
            " ORDER BY {} {}",
            order.column,
            order.direction.as_sql()
        ));
    }

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    sql
}

fn render_condition(condition: &Condition) -> String {
    format!(
        "{} {} {}",
        condition.column,
        condition.operator.as_sql(),
        render_value(&condition.value)
    )
}

fn render_value(value: &ValueExpr) -> String {
    match value {
        ValueExpr::BatchParam(n) => format!("ANY(${n})"),
        ValueExpr::Param(n) => format!("${n}"),
        ValueExpr::CursorSubquery {
            table,
            column,
            param,
        } => format!("(SELECT {column} FROM {table} WHERE id = ${param})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ColumnRef, Join, Operator, Order, OrderDirection};

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
    fn test_minimal_batched_select() {
        assert_eq!(
            render_query(&base_query()),
            "SELECT posts.* FROM posts WHERE posts.wrote_in_id = ANY($1)"
        );
    }

    #[test]
    fn test_joins_render_in_list_order() {
        let mut query = base_query();
        query.table = "tags".to_string();
        query.joins = vec![
            Join::new(
                "posts_has_tag_tags",
                ColumnRef::new("posts_has_tag_tags", "tag_id"),
                ColumnRef::new("tags", "id"),
            ),
            Join::new(
                "posts",
                ColumnRef::new("posts", "id"),
                ColumnRef::new("posts_has_tag_tags", "post_id"),
            ),
        ];
        query.conditions[0].column = ColumnRef::new("posts", "wrote_in_id");
        assert_eq!(
            render_query(&query),
            "SELECT tags.* FROM tags \
             JOIN posts_has_tag_tags ON posts_has_tag_tags.tag_id = tags.id \
             JOIN posts ON posts.id = posts_has_tag_tags.post_id \
             WHERE posts.wrote_in_id = ANY($1)"
        );
    }

    #[test]
    fn test_order_limit_and_cursor_condition() {
        let mut query = base_query();
        query.conditions.push(Condition {
            column: ColumnRef::new("posts", "seq"),
            operator: Operator::Gt,
            value: ValueExpr::CursorSubquery {
                table: "posts".to_string(),
                column: "seq".to_string(),
                param: 2,
            },
        });
        query.order = Some(Order {
            column: ColumnRef::new("posts", "seq"),
            direction: OrderDirection::Ascending,
        });
        query.limit = Some(10);
        assert_eq!(
            render_query(&query),
            "SELECT posts.* FROM posts \
             WHERE posts.wrote_in_id = ANY($1) \
             AND posts.seq > (SELECT seq FROM posts WHERE id = $2) \
             ORDER BY posts.seq ASC LIMIT 10"
        );
    }

    #[test]
    fn test_rendering_is_pure() {
        let query = base_query();
        assert_eq!(render_query(&query), render_query(&query));
    }
}
