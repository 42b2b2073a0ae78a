//! Storage decisions for relationship pairs.
//!
//! Every [`SegmentPair`] resolves to exactly one physical storage strategy:
//! an embedded foreign key on one endpoint's table, or an association table
//! holding one row per edge. The decision never depends on which endpoint
//! authored the declaration — both declarations of an edge land on the same
//! pairing signature and therefore the same description.

use crate::segment::{SegmentPair, dedupe_segments, pair_segments};
use graphrel_core::entity::{Direction, Relationship, RelationshipSegment};
use graphrel_core::error::{Error, Result};
use graphrel_core::naming::{snake_case, table_name};
use std::collections::BTreeMap;

/// An embedded foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDescription {
    /// Direction of the owning declaration; part of the column name so
    /// distinct relationships between the same entities never collide.
    pub direction: Direction,
    /// Table holding the key column.
    pub table: String,
    /// Table the key points at.
    pub referenced_table: String,
    /// The key column name.
    pub column: String,
    /// Whether the column is NOT NULL.
    pub not_null: bool,
}

/// An association table storing a many-to-many relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTableDescription {
    /// Association table name.
    pub table: String,
    /// Table of the canonical source endpoint.
    pub left_table: String,
    /// Table of the canonical target endpoint.
    pub right_table: String,
    /// Column referencing the source endpoint.
    pub left_column: String,
    /// Column referencing the target endpoint.
    pub right_column: String,
}

/// The resolved storage decision for one pairing signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentDescription {
    /// Stored as a foreign key column.
    ForeignKey(ForeignKeyDescription),
    /// Stored as an association table.
    JoinTable(JoinTableDescription),
}

/// Whether a pair must be stored as an association table.
///
/// True iff every segment present is plural. A pair with a single declared
/// direction treats the unknown side as plural, so a lone plural declaration
/// is conservatively given an association table.
#[must_use]
pub fn pair_requires_join_table(pair: &SegmentPair) -> bool {
    let mut any = false;
    for segment in pair.segments() {
        if !segment.cardinality.is_plural() {
            return false;
        }
        any = true;
    }
    any
}

/// Resolve one pair into its storage description.
pub fn describe_pair(pair: &SegmentPair) -> Result<SegmentDescription> {
    let Some(sample) = pair.any_segment() else {
        return Err(Error::invariant(
            "relationship pair has neither an in nor an out segment",
        ));
    };

    if pair_requires_join_table(pair) {
        return Ok(SegmentDescription::JoinTable(join_table_description(sample)));
    }

    // Foreign key. With one declared direction use it; with both, prefer the
    // inbound declaration unless it is plural, or the outbound declaration is
    // non-null while the inbound one is not.
    let owning = match (&pair.inbound, &pair.outbound) {
        (Some(inbound), None) => inbound,
        (None, Some(outbound)) => outbound,
        (Some(inbound), Some(outbound)) => {
            if inbound.cardinality.is_plural() || (outbound.not_null && !inbound.not_null) {
                outbound
            } else {
                inbound
            }
        }
        (None, None) => unreachable!("any_segment returned Some above"),
    };

    Ok(SegmentDescription::ForeignKey(ForeignKeyDescription {
        direction: owning.direction,
        table: table_name(&owning.from_type),
        referenced_table: table_name(&owning.to_type),
        column: foreign_key_column(&owning.label, owning.direction),
        not_null: owning.not_null,
    }))
}

/// Resolve the full declaration set into one description per pairing
/// signature.
#[tracing::instrument(level = "debug", skip(relationships))]
pub fn resolve_segments(
    relationships: &[Relationship],
) -> Result<BTreeMap<String, SegmentDescription>> {
    let segments = dedupe_segments(relationships);
    let pairs = pair_segments(&segments);

    let mut descriptions = BTreeMap::new();
    for (signature, pair) in pairs {
        let description = describe_pair(&pair)?;
        tracing::debug!(
            signature = %signature,
            join_table = matches!(description, SegmentDescription::JoinTable(_)),
            "resolved relationship storage"
        );
        descriptions.insert(signature, description);
    }
    Ok(descriptions)
}

/// Derived foreign-key column name: `{label}_{direction}_id`.
#[must_use]
pub fn foreign_key_column(label: &str, direction: Direction) -> String {
    format!("{}_{}_id", snake_case(label), direction.as_str())
}

/// Derived association table layout for a segment's relationship.
fn join_table_description(segment: &RelationshipSegment) -> JoinTableDescription {
    let source = segment.source_type();
    let target = segment.target_type();
    let left_table = table_name(source);
    let right_table = table_name(target);
    let left_column = format!("{}_id", snake_case(source));
    let right_column = if source == target {
        // Self-relationship: keep the two endpoint columns distinct.
        format!("related_{}_id", snake_case(target))
    } else {
        format!("{}_id", snake_case(target))
    };
    JoinTableDescription {
        table: format!(
            "{}_{}_{}",
            left_table,
            snake_case(&segment.label),
            right_table
        ),
        left_table,
        right_table,
        left_column,
        right_column,
    }
}

impl SegmentDescription {
    /// The association layout, if this relationship uses one.
    #[must_use]
    pub fn as_join_table(&self) -> Option<&JoinTableDescription> {
        match self {
            SegmentDescription::JoinTable(jt) => Some(jt),
            SegmentDescription::ForeignKey(_) => None,
        }
    }

    /// The foreign-key layout, if this relationship embeds one.
    #[must_use]
    pub fn as_foreign_key(&self) -> Option<&ForeignKeyDescription> {
        match self {
            SegmentDescription::ForeignKey(fk) => Some(fk),
            SegmentDescription::JoinTable(_) => None,
        }
    }
}
