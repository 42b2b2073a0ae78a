//! Relationship-path compilation and SQL rendering for graphrel.
//!
//! This crate is the middle of the pipeline: it takes a [`Relationship`]'s
//! path plus the resolved storage decisions and produces a reusable
//! [`RelationPlan`] — an intermediate [`Query`] plus its rendered statement
//! text. The pagination extension re-derives the query per request when
//! connection arguments are present; the renderer is a pure function so the
//! same IR always produces the same bytes.
//!
//! [`Relationship`]: graphrel_core::entity::Relationship

pub mod ir;
pub mod page;
pub mod path;
pub mod render;

pub use ir::{ColumnRef, Condition, Join, Operator, Order, OrderDirection, Query, ValueExpr};
pub use page::{ConnectionArgs, paginate};
pub use path::{RelationPlan, compact_joins, compile_path};
pub use render::render_query;
