//! Core types and traits for graphrel.
//!
//! `graphrel-core` is the **foundation layer** for the entire workspace. It
//! defines the contracts that all other crates build on.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: `Executor` is the seam to the external statement
//!   executor; everything above it treats query execution as an opaque
//!   `execute(sql, params) -> rows` capability.
//! - **Data model**: `Row` and `Value` represent query inputs/outputs and are
//!   shared across the schema, query, and loader crates.
//! - **Schema input**: `EntityDef`, `FieldDef`, and `Relationship` model the
//!   declarations produced by the schema front end.
//! - **Structured concurrency**: re-exports `Cx` and `Outcome` from asupersync
//!   so every async database operation is cancel-correct and budget-aware.
//!
//! # Who Uses This Crate
//!
//! - `graphrel-schema` resolves relationship declarations into storage
//!   decisions and table layouts.
//! - `graphrel-query` consumes segment metadata and `Value` to build SQL.
//! - `graphrel-loader` depends on `Executor`, `Row`, and `Value` for batched
//!   resolution.
//!
//! Most applications should use the `graphrel` facade; reach for
//! `graphrel-core` directly when implementing executors or advanced
//! integrations.

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Budget, Cx, Outcome, RegionId, TaskId};

pub mod entity;
pub mod error;
pub mod executor;
pub mod naming;
pub mod row;
pub mod value;

pub use entity::{
    Cardinality, Direction, EntityDef, FieldDef, FieldType, Relationship, RelationshipSegment,
};
pub use error::{Error, Result};
pub use executor::Executor;
pub use naming::{pluralize, quote_ident, snake_case, table_name};
pub use row::Row;
pub use value::Value;
