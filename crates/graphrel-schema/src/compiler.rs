//! The schema compiler: entities + resolved storage decisions in,
//! tables/columns/indexes out.
//!
//! Emission order does not affect correctness — table and column identity is
//! keyed by name — but it is kept deterministic (entities in declaration
//! order, then descriptions in signature order) so DDL output is stable.
//! Any name collision that would silently overwrite an existing definition
//! fails fast as a configuration error instead.

use crate::storage::SegmentDescription;
use crate::table::{Column, ColumnType, Index, Table};
use graphrel_core::entity::{EntityDef, FieldType, validate_identifier};
use graphrel_core::error::{Error, Result};
use graphrel_core::naming::{snake_case, table_name};
use std::collections::BTreeMap;

/// The reserved ordering column implicitly added to every entity table.
pub const SEQ_COLUMN: &str = "seq";

/// The identifier column relationships and cursors resolve against.
pub const ID_COLUMN: &str = "id";

/// The compiled relational layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTables {
    /// All tables: one per entity, plus one per association-table decision.
    pub tables: Vec<Table>,
    /// All indexes, including uniqueness constraints.
    pub indexes: Vec<Index>,
}

impl CompiledTables {
    /// Look up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Compile entity definitions and resolved segment descriptions into the
/// relational layout.
#[tracing::instrument(level = "debug", skip_all, fields(entities = entities.len()))]
pub fn compile_tables(
    entities: &[EntityDef],
    descriptions: &BTreeMap<String, SegmentDescription>,
) -> Result<CompiledTables> {
    let mut tables: Vec<Table> = Vec::new();
    let mut indexes: Vec<Index> = Vec::new();

    for entity in entities {
        let table = compile_entity(entity, &mut indexes)?;
        if tables.iter().any(|t| t.name == table.name) {
            return Err(Error::config(format!(
                "duplicate table name `{}` (entity `{}`)",
                table.name, entity.name
            )));
        }
        tracing::debug!(entity = %entity.name, table = %table.name, "compiled entity table");
        tables.push(table);
    }

    for (signature, description) in descriptions {
        match description {
            SegmentDescription::JoinTable(jt) => {
                require_identifier_table(&tables, &jt.left_table, signature)?;
                require_identifier_table(&tables, &jt.right_table, signature)?;

                let mut table = Table::new(jt.table.clone());
                table.columns.push(
                    Column::new(jt.left_column.clone(), ColumnType::Identifier)
                        .not_null(true)
                        .references(jt.left_table.clone(), ID_COLUMN),
                );
                table.columns.push(
                    Column::new(jt.right_column.clone(), ColumnType::Identifier)
                        .not_null(true)
                        .references(jt.right_table.clone(), ID_COLUMN),
                );
                // No duplicate association rows; the reverse index supports
                // traversal from the target side.
                indexes.push(Index::new(
                    jt.table.clone(),
                    vec![jt.left_column.clone(), jt.right_column.clone()],
                    true,
                ));
                indexes.push(Index::new(
                    jt.table.clone(),
                    vec![jt.right_column.clone()],
                    false,
                ));
                tracing::debug!(table = %jt.table, "compiled association table");
                tables.push(table);
            }
            SegmentDescription::ForeignKey(fk) => {
                require_identifier_table(&tables, &fk.referenced_table, signature)?;

                let column = Column::new(fk.column.clone(), ColumnType::Identifier)
                    .not_null(fk.not_null)
                    .references(fk.referenced_table.clone(), ID_COLUMN);

                let owner = tables
                    .iter_mut()
                    .find(|t| t.name == fk.table)
                    .ok_or_else(|| {
                        Error::config(format!(
                            "relationship `{signature}` owns a key on unknown table `{}`",
                            fk.table
                        ))
                    })?;
                if let Some(existing) = owner.column(&fk.column) {
                    if *existing != column {
                        return Err(Error::config(format!(
                            "conflicting definitions for column `{}.{}` (relationship `{signature}`)",
                            fk.table, fk.column
                        )));
                    }
                } else {
                    owner.columns.push(column);
                    indexes.push(Index::new(fk.table.clone(), vec![fk.column.clone()], false));
                }
            }
        }
    }

    Ok(CompiledTables { tables, indexes })
}

/// Compile one entity into its base table, accumulating field indexes.
fn compile_entity(entity: &EntityDef, indexes: &mut Vec<Index>) -> Result<Table> {
    validate_identifier("entity", &entity.name)?;
    let name = table_name(&entity.name);
    let mut table = Table::new(name.clone());

    // The implicit insertion-order ordinal; authors cannot declare it.
    table
        .columns
        .push(Column::new(SEQ_COLUMN, ColumnType::Serial).not_null(true));

    for field in &entity.fields {
        validate_identifier("field", &field.name)?;
        let column_name = snake_case(&field.name);
        if column_name == SEQ_COLUMN {
            return Err(Error::config(format!(
                "entity `{}` declares reserved field `{SEQ_COLUMN}`",
                entity.name
            )));
        }
        if !field.is_column() {
            continue;
        }
        if table.column(&column_name).is_some() {
            return Err(Error::config(format!(
                "entity `{}` declares column `{column_name}` twice",
                entity.name
            )));
        }

        let mut column = Column::new(column_name.clone(), ColumnType::from_field_type(field.field_type))
            .not_null(!field.nullable);
        if field.field_type == FieldType::Identifier {
            column = column.default_expr("gen_random_uuid()");
            if column_name == ID_COLUMN {
                column = column.primary_key();
            }
        }
        if field.unique {
            column = column.unique();
            indexes.push(Index::new(name.clone(), vec![column_name.clone()], true));
        } else if field.indexed {
            indexes.push(Index::new(name.clone(), vec![column_name.clone()], false));
        }
        table.columns.push(column);
    }

    Ok(table)
}

/// A relationship endpoint must already exist and expose an identifier.
fn require_identifier_table(tables: &[Table], name: &str, signature: &str) -> Result<()> {
    let Some(table) = tables.iter().find(|t| t.name == name) else {
        return Err(Error::config(format!(
            "relationship `{signature}` references unknown table `{name}`"
        )));
    };
    if table.column(ID_COLUMN).is_none() {
        return Err(Error::config(format!(
            "relationship `{signature}` references table `{name}` which has no `{ID_COLUMN}` column"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::resolve_segments;
    use graphrel_core::entity::{
        Cardinality, Direction, FieldDef, Relationship, RelationshipSegment,
    };

    fn author() -> EntityDef {
        EntityDef::new("Author")
            .field(FieldDef::new("id", FieldType::Identifier))
            .field(FieldDef::new("name", FieldType::Text))
            .field(FieldDef::new("email", FieldType::Text).unique())
    }

    fn post() -> EntityDef {
        EntityDef::new("Post")
            .field(FieldDef::new("id", FieldType::Identifier))
            .field(FieldDef::new("title", FieldType::Text).indexed())
            .field(FieldDef::new("metadata", FieldType::Json).nullable())
    }

    fn tag() -> EntityDef {
        EntityDef::new("Tag")
            .field(FieldDef::new("id", FieldType::Identifier))
            .field(FieldDef::new("name", FieldType::Text))
    }

    #[test]
    fn test_entity_table_layout() {
        let compiled = compile_tables(&[author()], &BTreeMap::new()).unwrap();
        let table = compiled.table("authors").unwrap();

        assert_eq!(table.columns[0].name, SEQ_COLUMN);
        assert_eq!(table.columns[0].column_type, ColumnType::Serial);

        let id = table.column("id").unwrap();
        assert!(id.primary_key);
        assert_eq!(id.default.as_deref(), Some("gen_random_uuid()"));

        let email = table.column("email").unwrap();
        assert!(email.unique);
        assert_eq!(
            compiled.indexes,
            vec![Index::new("authors", vec!["email".to_string()], true)]
        );
    }

    #[test]
    fn test_reserved_seq_field_is_fatal() {
        let entity = EntityDef::new("Broken")
            .field(FieldDef::new("id", FieldType::Identifier))
            .field(FieldDef::new("seq", FieldType::Integer));
        let err = compile_tables(&[entity], &BTreeMap::new()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_virtual_and_relationship_fields_are_not_columns() {
        let entity = EntityDef::new("Post")
            .field(FieldDef::new("id", FieldType::Identifier))
            .field(FieldDef::new("excerpt", FieldType::Text).virtual_field())
            .field(FieldDef::new("author", FieldType::Text).relationship());
        let compiled = compile_tables(&[entity], &BTreeMap::new()).unwrap();
        let table = compiled.table("posts").unwrap();
        assert!(table.column("excerpt").is_none());
        assert!(table.column("author").is_none());
    }

    #[test]
    fn test_foreign_key_appends_column_and_index() {
        let descriptions = resolve_segments(&[Relationship::new(
            "author",
            Cardinality::Singular,
            vec![
                RelationshipSegment::new(
                    "Post",
                    "Author",
                    "wrote",
                    Direction::In,
                    Cardinality::Singular,
                )
                .not_null(),
            ],
        )])
        .unwrap();
        let compiled = compile_tables(&[author(), post()], &descriptions).unwrap();

        let posts = compiled.table("posts").unwrap();
        let fk = posts.column("wrote_in_id").unwrap();
        assert!(fk.not_null);
        assert_eq!(fk.references.as_ref().unwrap().table, "authors");
        assert!(
            compiled
                .indexes
                .contains(&Index::new("posts", vec!["wrote_in_id".to_string()], false))
        );
    }

    #[test]
    fn test_join_table_emission() {
        let descriptions = resolve_segments(&[Relationship::new(
            "tags",
            Cardinality::Plural,
            vec![RelationshipSegment::new(
                "Post",
                "Tag",
                "hasTag",
                Direction::Out,
                Cardinality::Plural,
            )],
        )])
        .unwrap();
        let compiled = compile_tables(&[post(), tag()], &descriptions).unwrap();

        let jt = compiled.table("posts_has_tag_tags").unwrap();
        assert_eq!(jt.columns.len(), 2);
        assert!(jt.columns.iter().all(|c| c.not_null));
        assert!(compiled.indexes.iter().any(|i| {
            i.table == "posts_has_tag_tags"
                && i.unique
                && i.columns == ["post_id".to_string(), "tag_id".to_string()]
        }));
        assert!(compiled.indexes.iter().any(|i| {
            i.table == "posts_has_tag_tags" && !i.unique && i.columns == ["tag_id".to_string()]
        }));
    }

    #[test]
    fn test_unknown_endpoint_is_fatal() {
        let descriptions = resolve_segments(&[Relationship::new(
            "author",
            Cardinality::Singular,
            vec![RelationshipSegment::new(
                "Post",
                "Ghost",
                "wrote",
                Direction::In,
                Cardinality::Singular,
            )],
        )])
        .unwrap();
        let err = compile_tables(&[post()], &descriptions).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_conflicting_foreign_key_columns_fail_fast() {
        // Two resolved relationships that compute the same column name on the
        // same owning table with different referenced tables.
        let descriptions = resolve_segments(&[
            Relationship::new(
                "author",
                Cardinality::Singular,
                vec![RelationshipSegment::new(
                    "Post",
                    "Author",
                    "owner",
                    Direction::In,
                    Cardinality::Singular,
                )],
            ),
            Relationship::new(
                "tag",
                Cardinality::Singular,
                vec![RelationshipSegment::new(
                    "Post",
                    "Tag",
                    "owner",
                    Direction::In,
                    Cardinality::Singular,
                )],
            ),
        ])
        .unwrap();
        let err = compile_tables(&[author(), post(), tag()], &descriptions).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("posts.owner_in_id"));
    }
}
