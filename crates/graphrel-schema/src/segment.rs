//! Segment flattening, deduplication, and pairing.
//!
//! Relationships are declared per endpoint, so the same underlying edge can
//! arrive twice — once `out` from one entity, once `in` from the other — and
//! the same declaration can appear in several transitive paths. Storage must
//! be decided exactly once per underlying relationship, so this module
//! reduces the declaration set in two steps: dedup by identity signature
//! (non-null wins), then group by the direction-normalized pairing signature
//! into at most one segment per direction.

use graphrel_core::entity::{Direction, Relationship, RelationshipSegment};
use std::collections::BTreeMap;

/// The `in`/`out` declarations sharing one pairing signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentPair {
    /// The declaration whose edge points into its declaring entity.
    pub inbound: Option<RelationshipSegment>,
    /// The declaration whose edge points out of its declaring entity.
    pub outbound: Option<RelationshipSegment>,
}

impl SegmentPair {
    /// The segments present in this pair.
    pub fn segments(&self) -> impl Iterator<Item = &RelationshipSegment> {
        self.inbound.iter().chain(self.outbound.iter())
    }

    /// A segment to borrow canonical source/target/label data from.
    #[must_use]
    pub fn any_segment(&self) -> Option<&RelationshipSegment> {
        self.inbound.as_ref().or(self.outbound.as_ref())
    }
}

/// Flatten every relationship's path into segments and deduplicate by
/// identity signature.
///
/// Precedence rule: a later-seen non-null declaration replaces an earlier
/// nullable one for the same identity signature. A later nullable
/// declaration never downgrades an earlier non-null one.
#[must_use]
pub fn dedupe_segments(relationships: &[Relationship]) -> Vec<RelationshipSegment> {
    let mut order: Vec<String> = Vec::new();
    let mut by_identity: BTreeMap<String, RelationshipSegment> = BTreeMap::new();

    for relationship in relationships {
        for segment in &relationship.path {
            let identity = segment.identity_signature();
            match by_identity.get_mut(&identity) {
                None => {
                    order.push(identity.clone());
                    by_identity.insert(identity, segment.clone());
                }
                Some(existing) => {
                    if segment.not_null && !existing.not_null {
                        *existing = segment.clone();
                    }
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|identity| by_identity.remove(&identity))
        .collect()
}

/// Group deduplicated segments into pairs by pairing signature.
///
/// Returns a map keyed by pairing signature so iteration order — and with
/// it, everything derived downstream — is deterministic.
#[must_use]
pub fn pair_segments(segments: &[RelationshipSegment]) -> BTreeMap<String, SegmentPair> {
    let mut pairs: BTreeMap<String, SegmentPair> = BTreeMap::new();
    for segment in segments {
        let pair = pairs.entry(segment.pairing_signature()).or_default();
        match segment.direction {
            Direction::In => pair.inbound = Some(segment.clone()),
            Direction::Out => pair.outbound = Some(segment.clone()),
        }
    }
    pairs
}
