//! Convenience re-exports for applications.
//!
//! ```ignore
//! use graphrel::prelude::*;
//! ```

pub use crate::{CompiledSchema, RequestScope, compile};

pub use graphrel_core::entity::{
    Cardinality, Direction, EntityDef, FieldDef, FieldType, Relationship, RelationshipSegment,
};
pub use graphrel_core::error::{Error, Result};
pub use graphrel_core::executor::Executor;
pub use graphrel_core::row::Row;
pub use graphrel_core::value::Value;
pub use graphrel_core::{Cx, Outcome};

pub use graphrel_loader::{Connection, ConnectionLoader, Edge, PageInfo, SingularLoader};
pub use graphrel_query::page::{ConnectionArgs, paginate};
pub use graphrel_query::path::RelationPlan;
pub use graphrel_schema::ddl::generate_ddl;
pub use graphrel_schema::storage::SegmentDescription;
pub use graphrel_schema::table::{Column, ColumnType, Index, Table};

pub use std::sync::Arc;
