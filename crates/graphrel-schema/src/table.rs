//! Relational layout types: tables, columns, indexes.
//!
//! These are the compiler's output and the DDL generator's input. They are
//! computed once at schema-compilation time and held immutable for the
//! process lifetime.

use graphrel_core::entity::FieldType;
use serde::Serialize;

/// Logical column types, one per supported relational representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// Entity identifier (UUID with a generated default).
    Identifier,
    /// Free text.
    Text,
    /// Integer.
    Integer,
    /// Floating point.
    Float,
    /// Point in time.
    Timestamp,
    /// Monetary amount.
    Money,
    /// Opaque structured payload; the explicit "any shape" variant.
    Json,
    /// Monotonically increasing ordinal (the implicit `seq` column).
    Serial,
}

impl ColumnType {
    /// The SQL type name used in DDL.
    #[must_use]
    pub const fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Identifier => "uuid",
            ColumnType::Text => "text",
            ColumnType::Integer => "bigint",
            ColumnType::Float => "double precision",
            ColumnType::Timestamp => "timestamptz",
            ColumnType::Money => "numeric(20,4)",
            ColumnType::Json => "jsonb",
            ColumnType::Serial => "bigserial",
        }
    }

    /// Map a declared field type onto its column type.
    #[must_use]
    pub const fn from_field_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Identifier => ColumnType::Identifier,
            FieldType::Text => ColumnType::Text,
            FieldType::Integer => ColumnType::Integer,
            FieldType::Float => ColumnType::Float,
            FieldType::Timestamp => ColumnType::Timestamp,
            FieldType::Money => ColumnType::Money,
            FieldType::Json => ColumnType::Json,
        }
    }
}

/// A foreign-key reference to another table's column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReference {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
}

/// One column of a compiled table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Logical type.
    pub column_type: ColumnType,
    /// Primary-key flag.
    pub primary_key: bool,
    /// NOT NULL flag.
    pub not_null: bool,
    /// Unique-constraint flag.
    pub unique: bool,
    /// Default-value SQL expression.
    pub default: Option<String>,
    /// Foreign-key reference, when this column embeds one.
    pub references: Option<ColumnReference>,
}

impl Column {
    /// Create a nullable column with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            not_null: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    /// Mark as primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark NOT NULL.
    #[must_use]
    pub fn not_null(mut self, value: bool) -> Self {
        self.not_null = value;
        self
    }

    /// Add a unique constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the default-value expression.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Set the foreign-key reference.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ColumnReference {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// One compiled table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns in emission order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table with no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// One compiled index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    /// Indexed table.
    pub table: String,
    /// Ordered column list.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl Index {
    /// Create an index over the given columns.
    #[must_use]
    pub fn new(table: impl Into<String>, columns: Vec<String>, unique: bool) -> Self {
        Self {
            table: table.into(),
            columns,
            unique,
        }
    }

    /// Derived index name: `idx_` / `uk_` prefix plus table and columns.
    #[must_use]
    pub fn name(&self) -> String {
        let prefix = if self.unique { "uk" } else { "idx" };
        format!("{}_{}_{}", prefix, self.table, self.columns.join("_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builder_chain() {
        let column = Column::new("wrote_in_id", ColumnType::Identifier)
            .not_null(true)
            .references("authors", "id");
        assert_eq!(column.name, "wrote_in_id");
        assert!(column.not_null);
        assert_eq!(
            column.references,
            Some(ColumnReference {
                table: "authors".to_string(),
                column: "id".to_string()
            })
        );
    }

    #[test]
    fn test_index_name() {
        let index = Index::new("posts", vec!["wrote_in_id".to_string()], false);
        assert_eq!(index.name(), "idx_posts_wrote_in_id");
        let unique = Index::new(
            "posts_has_tag_tags",
            vec!["post_id".to_string(), "tag_id".to_string()],
            true,
        );
        assert_eq!(unique.name(), "uk_posts_has_tag_tags_post_id_tag_id");
    }

    #[test]
    fn test_sql_names() {
        assert_eq!(ColumnType::Identifier.sql_name(), "uuid");
        assert_eq!(ColumnType::Serial.sql_name(), "bigserial");
        assert_eq!(ColumnType::Json.sql_name(), "jsonb");
    }
}
