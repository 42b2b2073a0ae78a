//! Path compilation: a relationship's hop list becomes a join plan.
//!
//! The path is walked from the far end backward. The first hop anchors the
//! WHERE clause — it carries the batched input keys — while every later hop
//! becomes one or two JOINs bringing the traversal back toward the terminal
//! type. Foreign-key hops join the owning table to the referenced table on
//! `id = fk_column`; association-table hops join the association table to
//! the near endpoint and, beyond the first hop, the far endpoint as well.
//!
//! After the walk, adjacent joins that pivot through the same bridging
//! column are compacted into one join connecting the non-adjacent tables.

use crate::ir::{ColumnRef, Condition, Join, Operator, Query, ValueExpr};
use crate::render::render_query;
use graphrel_core::entity::{Cardinality, Direction, Relationship};
use graphrel_core::error::{Error, Result};
use graphrel_core::naming::table_name;
use graphrel_schema::compiler::ID_COLUMN;
use graphrel_schema::storage::SegmentDescription;
use std::collections::BTreeMap;

/// A compiled, reusable statement for one relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationPlan {
    /// The exposed field name.
    pub field_name: String,
    /// Cardinality of the exposed field.
    pub cardinality: Cardinality,
    /// The base query IR; pagination re-derives from this per request.
    pub query: Query,
    /// The rendered base statement.
    pub sql: String,
    /// The parent-row column whose values feed the batched key set: `id`,
    /// unless the first hop's key is embedded on the parent table.
    pub source_column: String,
}

/// Compile one relationship's path into its plan.
#[tracing::instrument(level = "debug", skip_all, fields(field = %relationship.field_name))]
pub fn compile_path(
    relationship: &Relationship,
    descriptions: &BTreeMap<String, SegmentDescription>,
) -> Result<RelationPlan> {
    relationship.validate()?;
    let terminal = relationship
        .path
        .last()
        .expect("validate rejects empty paths");
    let result_table = table_name(&terminal.to_type);

    let mut joins: Vec<Join> = Vec::new();
    let mut anchor: Option<(ColumnRef, String)> = None;

    for (position, hop) in relationship.path.iter().enumerate().rev() {
        let is_first = position == 0;
        let signature = hop.pairing_signature();
        let description = descriptions.get(&signature).ok_or_else(|| {
            Error::invariant(format!(
                "no storage decision for relationship segment `{signature}`"
            ))
        })?;
        let parent_table = table_name(&hop.from_type);
        let child_table = table_name(&hop.to_type);

        match description {
            SegmentDescription::ForeignKey(fk) => {
                // The key's stored direction matches the traversal direction
                // exactly when the parent side owns the column.
                let parent_owns = hop.direction == fk.direction;
                if is_first {
                    anchor = Some(if parent_owns {
                        // Keys are the parent rows' embedded key values.
                        (ColumnRef::new(&child_table, ID_COLUMN), fk.column.clone())
                    } else {
                        (
                            ColumnRef::new(&child_table, &fk.column),
                            ID_COLUMN.to_string(),
                        )
                    });
                } else if parent_owns {
                    joins.push(Join::new(
                        &parent_table,
                        ColumnRef::new(&parent_table, &fk.column),
                        ColumnRef::new(&child_table, ID_COLUMN),
                    ));
                } else {
                    joins.push(Join::new(
                        &parent_table,
                        ColumnRef::new(&parent_table, ID_COLUMN),
                        ColumnRef::new(&child_table, &fk.column),
                    ));
                }
            }
            SegmentDescription::JoinTable(jt) => {
                let (parent_column, child_column) = match hop.direction {
                    Direction::Out => (&jt.left_column, &jt.right_column),
                    Direction::In => (&jt.right_column, &jt.left_column),
                };
                joins.push(Join::new(
                    &jt.table,
                    ColumnRef::new(&jt.table, child_column),
                    ColumnRef::new(&child_table, ID_COLUMN),
                ));
                if is_first {
                    anchor = Some((
                        ColumnRef::new(&jt.table, parent_column),
                        ID_COLUMN.to_string(),
                    ));
                } else {
                    joins.push(Join::new(
                        &parent_table,
                        ColumnRef::new(&parent_table, ID_COLUMN),
                        ColumnRef::new(&jt.table, parent_column),
                    ));
                }
            }
        }
    }

    let (key_column, source_column) =
        anchor.expect("validate guarantees at least one hop");
    let joins = compact_joins(joins);

    let query = Query {
        table: result_table,
        joins,
        conditions: vec![Condition {
            column: key_column.clone(),
            operator: Operator::Eq,
            value: ValueExpr::BatchParam(1),
        }],
        limit: None,
        order: None,
        batched: true,
        key_column,
    };
    let sql = render_query(&query);
    tracing::debug!(field = %relationship.field_name, sql = %sql, "compiled relationship");

    Ok(RelationPlan {
        field_name: relationship.field_name.clone(),
        cardinality: relationship.cardinality,
        query,
        sql,
        source_column,
    })
}

impl RelationPlan {
    /// Whether one batched statement can be regrouped by key: the key column
    /// must be part of the selected result row.
    #[must_use]
    pub fn key_on_result_table(&self) -> bool {
        self.query.key_column.table == self.query.table
    }
}

/// Collapse redundant bridge hops out of a join list.
///
/// When one join's `left` endpoint is the next join's `right` endpoint (same
/// table and column), the later join only pivots through the earlier one's
/// table; the pair merges into a single join connecting the two non-adjacent
/// tables. Compacting an already-compacted list is a no-op.
#[must_use]
pub fn compact_joins(joins: Vec<Join>) -> Vec<Join> {
    let mut joins = joins;
    let mut index = 0;
    while index + 1 < joins.len() {
        if joins[index].left == joins[index + 1].right {
            let merged = Join::new(
                joins[index + 1].table.clone(),
                joins[index + 1].left.clone(),
                joins[index].right.clone(),
            );
            joins.splice(index..=index + 1, [merged]);
            index = index.saturating_sub(1);
        } else {
            index += 1;
        }
    }
    joins
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphrel_core::entity::RelationshipSegment;
    use graphrel_schema::storage::resolve_segments;

    fn seg(
        from: &str,
        to: &str,
        label: &str,
        dir: Direction,
        card: Cardinality,
    ) -> RelationshipSegment {
        RelationshipSegment::new(from, to, label, dir, card)
    }

    /// Author <--wrote-- Post (FK on posts), Author --memberOf--> Team.
    fn blog_relationships() -> Vec<Relationship> {
        vec![
            Relationship::new(
                "posts",
                Cardinality::Plural,
                vec![seg("Author", "Post", "wrote", Direction::Out, Cardinality::Plural)],
            ),
            Relationship::new(
                "author",
                Cardinality::Singular,
                vec![seg("Post", "Author", "wrote", Direction::In, Cardinality::Singular)],
            ),
            Relationship::new(
                "team",
                Cardinality::Singular,
                vec![seg("Author", "Team", "memberOf", Direction::Out, Cardinality::Singular)],
            ),
            Relationship::new(
                "authorTeam",
                Cardinality::Singular,
                vec![
                    seg("Post", "Author", "wrote", Direction::In, Cardinality::Singular),
                    seg("Author", "Team", "memberOf", Direction::Out, Cardinality::Singular),
                ],
            ),
        ]
    }

    fn plan_for(field: &str) -> RelationPlan {
        let relationships = blog_relationships();
        let descriptions = resolve_segments(&relationships).unwrap();
        let relationship = relationships
            .iter()
            .find(|r| r.field_name == field)
            .unwrap();
        compile_path(relationship, &descriptions).unwrap()
    }

    #[test]
    fn test_single_hop_with_key_on_target() {
        let plan = plan_for("posts");
        assert_eq!(
            plan.sql,
            "SELECT posts.* FROM posts WHERE posts.wrote_in_id = ANY($1)"
        );
        assert_eq!(plan.source_column, "id");
        assert!(plan.key_on_result_table());
    }

    #[test]
    fn test_single_hop_with_key_on_parent() {
        let plan = plan_for("author");
        assert_eq!(
            plan.sql,
            "SELECT authors.* FROM authors WHERE authors.id = ANY($1)"
        );
        assert_eq!(plan.source_column, "wrote_in_id");
        assert!(plan.key_on_result_table());
    }

    #[test]
    fn test_two_hop_foreign_key_path() {
        let plan = plan_for("authorTeam");
        assert_eq!(
            plan.sql,
            "SELECT teams.* FROM teams \
             JOIN authors ON authors.member_of_out_id = teams.id \
             WHERE authors.id = ANY($1)"
        );
        assert_eq!(plan.source_column, "wrote_in_id");
        assert!(!plan.key_on_result_table());
    }

    #[test]
    fn test_missing_description_is_invariant_violation() {
        let relationship = Relationship::new(
            "posts",
            Cardinality::Plural,
            vec![seg("Author", "Post", "wrote", Direction::Out, Cardinality::Plural)],
        );
        let err = compile_path(&relationship, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::Invariant(_)));
    }

    #[test]
    fn test_compaction_collapses_bridge_hop() {
        let joins = vec![
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
            Join::new(
                "authors_wrote_posts",
                ColumnRef::new("authors_wrote_posts", "post_id"),
                ColumnRef::new("posts", "id"),
            ),
        ];
        let compacted = compact_joins(joins);
        assert_eq!(
            compacted,
            vec![
                Join::new(
                    "posts_has_tag_tags",
                    ColumnRef::new("posts_has_tag_tags", "tag_id"),
                    ColumnRef::new("tags", "id"),
                ),
                Join::new(
                    "authors_wrote_posts",
                    ColumnRef::new("authors_wrote_posts", "post_id"),
                    ColumnRef::new("posts_has_tag_tags", "post_id"),
                ),
            ]
        );
    }

    #[test]
    fn test_compaction_is_idempotent() {
        let joins = vec![
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
            Join::new(
                "authors_wrote_posts",
                ColumnRef::new("authors_wrote_posts", "post_id"),
                ColumnRef::new("posts", "id"),
            ),
        ];
        let once = compact_joins(joins);
        let twice = compact_joins(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_compaction_leaves_unrelated_joins_alone() {
        let joins = vec![
            Join::new(
                "authors",
                ColumnRef::new("authors", "member_of_out_id"),
                ColumnRef::new("teams", "id"),
            ),
            Join::new(
                "posts",
                ColumnRef::new("posts", "wrote_in_id"),
                ColumnRef::new("authors", "id"),
            ),
        ];
        assert_eq!(compact_joins(joins.clone()), joins);
    }
}
