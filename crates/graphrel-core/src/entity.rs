//! Schema input declarations.
//!
//! These types model what the schema-definition front end hands us: entities
//! with typed fields, and relationship declarations between entity types.
//! They are plain data — all resolution logic (storage decisions, table
//! layout, query compilation) lives in the downstream crates.
//!
//! # Example
//!
//! ```ignore
//! let author = EntityDef::new("Author")
//!     .field(FieldDef::new("id", FieldType::Identifier))
//!     .field(FieldDef::new("name", FieldType::Text));
//!
//! // Author --out:wrote--> Post, declared from the Author side.
//! let posts = Relationship::new(
//!     "posts",
//!     Cardinality::Plural,
//!     vec![RelationshipSegment::new(
//!         "Author", "Post", "wrote", Direction::Out, Cardinality::Plural,
//!     )],
//! );
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Pattern every entity name, field name, and relationship label must match.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static pattern compiles"))
}

/// Validate a schema-author-supplied identifier.
pub fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(Error::config(format!(
            "{kind} `{name}` is not a valid identifier"
        )))
    }
}

/// Logical field types supported by the schema front end.
///
/// Types that don't map onto a fixed relational type are declared as `Json`
/// and stored in an opaque structured column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Entity identifier; stored as a UUID with a generated default.
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
    /// Opaque structured payload ("any shape" storage).
    Json,
}

/// One declared field on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name as declared.
    pub name: String,
    /// Logical type.
    pub field_type: FieldType,
    /// Whether the column admits NULL.
    pub nullable: bool,
    /// `@unique` directive.
    pub unique: bool,
    /// `@indexed` directive.
    pub indexed: bool,
    /// `@virtual` directive — resolved at the API layer, never stored.
    pub is_virtual: bool,
    /// `@relationship` directive — storage comes from the matching
    /// relationship declaration, not from this field.
    pub is_relationship: bool,
}

impl FieldDef {
    /// Create a non-null, unadorned field.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            unique: false,
            indexed: false,
            is_virtual: false,
            is_relationship: false,
        }
    }

    /// Mark the field nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Add a unique constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Request an index.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Mark the field virtual (not stored).
    #[must_use]
    pub fn virtual_field(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Mark the field as a relationship field.
    #[must_use]
    pub fn relationship(mut self) -> Self {
        self.is_relationship = true;
        self
    }

    /// Whether this field becomes a database column.
    #[must_use]
    pub fn is_column(&self) -> bool {
        !self.is_virtual && !self.is_relationship
    }
}

/// One declared entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    /// Entity type name as declared (`Author`, `BlogPost`).
    pub name: String,
    /// Ordered field declarations.
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    /// Create an entity with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field declaration.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// Direction of a relationship declaration relative to its declaring entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The edge points into the declaring entity.
    In,
    /// The edge points out of the declaring entity.
    Out,
}

impl Direction {
    /// The lowercase wire form used in signatures and derived column names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// Cardinality of a relationship field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// To-one.
    Singular,
    /// To-many.
    Plural,
}

impl Cardinality {
    /// Whether this is the plural (to-many) cardinality.
    #[must_use]
    pub fn is_plural(&self) -> bool {
        matches!(self, Cardinality::Plural)
    }
}

/// One directed hop of a relationship between two entity types.
///
/// A hop is declared from one endpoint; the same underlying edge may be
/// declared again from the other endpoint with the opposite direction. The
/// two signatures below capture both identities:
///
/// - [`identity_signature`](Self::identity_signature) distinguishes
///   otherwise-identical hops declared with different nullability;
/// - [`pairing_signature`](Self::pairing_signature) is direction-normalized
///   and names the single underlying relationship no matter which endpoint
///   declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipSegment {
    /// The declaring entity type.
    pub from_type: String,
    /// The entity type on the other end of the hop.
    pub to_type: String,
    /// Relationship label shared by both declarations.
    pub label: String,
    /// Direction of the edge relative to the declaring entity.
    pub direction: Direction,
    /// Cardinality of the field at the declaring entity.
    pub cardinality: Cardinality,
    /// Whether the declaring field is non-null.
    pub not_null: bool,
}

impl RelationshipSegment {
    /// Create a nullable segment.
    #[must_use]
    pub fn new(
        from_type: impl Into<String>,
        to_type: impl Into<String>,
        label: impl Into<String>,
        direction: Direction,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            from_type: from_type.into(),
            to_type: to_type.into(),
            label: label.into(),
            direction,
            cardinality,
            not_null: false,
        }
    }

    /// Mark the declaring field non-null.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Full identity of this declaration, nullability excluded.
    ///
    /// Two declarations with the same identity signature describe the same
    /// hop from the same endpoint; when they disagree on nullability the
    /// non-null variant wins during deduplication.
    #[must_use]
    pub fn identity_signature(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.from_type,
            self.to_type,
            self.label,
            self.direction.as_str()
        )
    }

    /// Direction-normalized identity of the underlying relationship.
    ///
    /// Canonical form is outbound: `source|label|target`. An inbound
    /// declaration contributes the same signature as the matching outbound
    /// declaration on the other endpoint.
    #[must_use]
    pub fn pairing_signature(&self) -> String {
        match self.direction {
            Direction::Out => format!("{}|{}|{}", self.from_type, self.label, self.to_type),
            Direction::In => format!("{}|{}|{}", self.to_type, self.label, self.from_type),
        }
    }

    /// The canonical source entity type (the `out` side).
    #[must_use]
    pub fn source_type(&self) -> &str {
        match self.direction {
            Direction::Out => &self.from_type,
            Direction::In => &self.to_type,
        }
    }

    /// The canonical target entity type (the `in` side).
    #[must_use]
    pub fn target_type(&self) -> &str {
        match self.direction {
            Direction::Out => &self.to_type,
            Direction::In => &self.from_type,
        }
    }
}

/// A declared relationship field: one hop for direct relationships, several
/// for transitive ones. Immutable once the schema is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// The exposed field name.
    pub field_name: String,
    /// Cardinality of the exposed field.
    pub cardinality: Cardinality,
    /// Ordered hops from the declaring entity to the terminal entity.
    pub path: Vec<RelationshipSegment>,
}

impl Relationship {
    /// Create a relationship from its path.
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        cardinality: Cardinality,
        path: Vec<RelationshipSegment>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            cardinality,
            path,
        }
    }

    /// The entity type the path terminates at.
    #[must_use]
    pub fn terminal_type(&self) -> Option<&str> {
        self.path.last().map(|seg| seg.to_type.as_str())
    }

    /// Validate the declaration's identifiers and path shape.
    pub fn validate(&self) -> Result<()> {
        validate_identifier("relationship field", &self.field_name)?;
        if self.path.is_empty() {
            return Err(Error::config(format!(
                "relationship `{}` has an empty path",
                self.field_name
            )));
        }
        for seg in &self.path {
            validate_identifier("entity", &seg.from_type)?;
            validate_identifier("entity", &seg.to_type)?;
            validate_identifier("relationship label", &seg.label)?;
        }
        // Hops must chain: each hop starts where the previous one ended.
        for pair in self.path.windows(2) {
            if pair[0].to_type != pair[1].from_type {
                return Err(Error::config(format!(
                    "relationship `{}` path is not contiguous: hop to `{}` is followed by hop from `{}`",
                    self.field_name, pair[0].to_type, pair[1].from_type
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(from: &str, to: &str, label: &str, dir: Direction) -> RelationshipSegment {
        RelationshipSegment::new(from, to, label, dir, Cardinality::Singular)
    }

    #[test]
    fn test_identity_signature_includes_direction() {
        let out = seg("Author", "Post", "wrote", Direction::Out);
        let inbound = seg("Author", "Post", "wrote", Direction::In);
        assert_ne!(out.identity_signature(), inbound.identity_signature());
        assert_eq!(out.identity_signature(), "Author|Post|wrote|out");
    }

    #[test]
    fn test_pairing_signature_is_direction_normalized() {
        let declared_at_author = seg("Author", "Post", "wrote", Direction::Out);
        let declared_at_post = seg("Post", "Author", "wrote", Direction::In);
        assert_eq!(
            declared_at_author.pairing_signature(),
            declared_at_post.pairing_signature()
        );
        assert_eq!(declared_at_author.pairing_signature(), "Author|wrote|Post");
    }

    #[test]
    fn test_source_and_target_follow_direction() {
        let inbound = seg("Post", "Author", "wrote", Direction::In);
        assert_eq!(inbound.source_type(), "Author");
        assert_eq!(inbound.target_type(), "Post");
    }

    #[test]
    fn test_non_contiguous_path_rejected() {
        let rel = Relationship::new(
            "tags",
            Cardinality::Plural,
            vec![
                seg("Author", "Post", "wrote", Direction::Out),
                seg("Comment", "Tag", "hasTag", Direction::Out),
            ],
        );
        let err = rel.validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_empty_path_rejected() {
        let rel = Relationship::new("tags", Cardinality::Plural, vec![]);
        assert!(rel.validate().is_err());
    }

    #[test]
    fn test_bad_identifier_rejected() {
        assert!(validate_identifier("entity", "Author").is_ok());
        assert!(validate_identifier("entity", "bad name").is_err());
        assert!(validate_identifier("entity", "1start").is_err());
        assert!(validate_identifier("entity", "").is_err());
    }
}
