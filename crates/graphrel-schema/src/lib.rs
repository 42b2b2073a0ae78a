//! Schema compilation for graphrel.
//!
//! This crate turns the declarative schema input — entities plus relationship
//! declarations — into the relational layout the rest of the system runs on:
//!
//! 1. The **segment resolver** ([`segment`], [`storage`]) normalizes
//!    relationship declarations into directionless, deduplicated storage
//!    decisions: every underlying relationship becomes exactly one
//!    [`SegmentDescription`], either an embedded foreign key or an
//!    association table, no matter which endpoint declared it.
//! 2. The **schema compiler** ([`compiler`]) emits tables, columns, and
//!    indexes from the entity definitions and the resolved descriptions.
//! 3. The **DDL generator** ([`ddl`]) renders the compiled layout as
//!    deterministic `CREATE TABLE` / `CREATE INDEX` text for the external
//!    provisioning tool.
//!
//! Everything here runs once at startup; the outputs are immutable values
//! that are passed explicitly into the query and loader layers.
//!
//! [`SegmentDescription`]: storage::SegmentDescription

pub mod compiler;
pub mod ddl;
pub mod segment;
pub mod storage;
pub mod table;

pub use compiler::{CompiledTables, compile_tables};
pub use ddl::generate_ddl;
pub use segment::{SegmentPair, dedupe_segments, pair_segments};
pub use storage::{
    ForeignKeyDescription, JoinTableDescription, SegmentDescription, describe_pair,
    pair_requires_join_table, resolve_segments,
};
pub use table::{Column, ColumnReference, ColumnType, Index, Table};
