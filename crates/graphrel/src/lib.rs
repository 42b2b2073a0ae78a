//! graphrel: graph-shaped schemas on relational storage.
//!
//! The facade crate ties the pipeline together. [`compile`] runs once at
//! startup: it resolves every declared relationship into a single physical
//! storage decision, lays out tables/columns/indexes, and compiles one
//! reusable statement per relationship. The resulting [`CompiledSchema`] is
//! an immutable value — share it behind an `Arc` across as many concurrent
//! requests as you like and pass it explicitly wherever it is needed.
//!
//! Per request, build a [`RequestScope`]: it hands out batched loaders that
//! coalesce concurrent key lookups into one statement each and cache results
//! for the rest of the request. Drop the scope when the request ends;
//! nothing outlives it.
//!
//! # Example
//!
//! ```ignore
//! use graphrel::prelude::*;
//!
//! let schema = Arc::new(graphrel::compile(&entities, &relationships)?);
//!
//! // Per request:
//! let mut scope = RequestScope::new(schema.clone());
//! let posts = scope.connection("Author", "posts")?;
//! let page = posts.load(&cx, &executor, &author_id, &args).await?;
//! ```

pub mod prelude;

use graphrel_core::entity::{Cardinality, EntityDef, Relationship};
use graphrel_core::error::{Error, Result};
use graphrel_loader::{ConnectionLoader, SingularLoader};
use graphrel_query::path::{RelationPlan, compile_path};
use graphrel_schema::compiler::compile_tables;
use graphrel_schema::ddl::generate_ddl;
use graphrel_schema::storage::{SegmentDescription, resolve_segments};
use graphrel_schema::table::{Index, Table};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// The immutable, process-wide output of schema compilation.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    /// All tables: one per entity plus one per association-table decision.
    pub tables: Vec<Table>,
    /// All indexes, including uniqueness constraints.
    pub indexes: Vec<Index>,
    /// One storage decision per pairing signature.
    pub descriptions: BTreeMap<String, SegmentDescription>,
    /// One compiled plan per relationship, keyed `Parent.field`.
    relations: BTreeMap<String, Arc<RelationPlan>>,
}

impl CompiledSchema {
    /// Look up a relationship plan by declaring entity and field name.
    #[must_use]
    pub fn relation(&self, parent_type: &str, field: &str) -> Option<&Arc<RelationPlan>> {
        self.relations.get(&relation_key(parent_type, field))
    }

    /// All compiled plans, in deterministic key order.
    pub fn relations(&self) -> impl Iterator<Item = &Arc<RelationPlan>> {
        self.relations.values()
    }

    /// Render the compiled layout as DDL statements.
    #[must_use]
    pub fn ddl(&self) -> Vec<String> {
        generate_ddl(&graphrel_schema::compiler::CompiledTables {
            tables: self.tables.clone(),
            indexes: self.indexes.clone(),
        })
    }
}

fn relation_key(parent_type: &str, field: &str) -> String {
    format!("{parent_type}.{field}")
}

/// Compile a declared schema into its relational layout and per-relationship
/// statements.
///
/// Runs once at startup. Configuration mistakes — reserved field names,
/// unresolvable relationship pairs, conflicting derived columns — surface
/// here as fatal [`Error::Config`] values rather than at request time.
pub fn compile(entities: &[EntityDef], relationships: &[Relationship]) -> Result<CompiledSchema> {
    let descriptions = resolve_segments(relationships)?;
    let compiled = compile_tables(entities, &descriptions)?;

    let mut relations = BTreeMap::new();
    for relationship in relationships {
        relationship.validate()?;
        let parent = &relationship.path[0].from_type;
        let key = relation_key(parent, &relationship.field_name);
        let plan = Arc::new(compile_path(relationship, &descriptions)?);
        if relations.insert(key.clone(), plan).is_some() {
            return Err(Error::config(format!(
                "relationship `{key}` is declared twice"
            )));
        }
    }

    Ok(CompiledSchema {
        tables: compiled.tables,
        indexes: compiled.indexes,
        descriptions,
        relations,
    })
}

/// Request-scoped loader registry.
///
/// Creates one loader per relationship on first use and keeps it for the
/// request so repeated resolutions share the same cache. Holds no locks —
/// the scope belongs to exactly one request.
#[derive(Debug)]
pub struct RequestScope {
    schema: Arc<CompiledSchema>,
    singular: HashMap<String, SingularLoader>,
    connections: HashMap<String, ConnectionLoader>,
}

impl RequestScope {
    /// Create a scope over a compiled schema.
    #[must_use]
    pub fn new(schema: Arc<CompiledSchema>) -> Self {
        Self {
            schema,
            singular: HashMap::new(),
            connections: HashMap::new(),
        }
    }

    /// The loader for a singular relationship field.
    pub fn singular(&mut self, parent_type: &str, field: &str) -> Result<&mut SingularLoader> {
        let key = relation_key(parent_type, field);
        let plan = self.lookup(parent_type, field, Cardinality::Singular)?;
        Ok(self
            .singular
            .entry(key)
            .or_insert_with(|| SingularLoader::new(plan)))
    }

    /// The loader for a plural (connection-shaped) relationship field.
    pub fn connection(&mut self, parent_type: &str, field: &str) -> Result<&mut ConnectionLoader> {
        let key = relation_key(parent_type, field);
        let plan = self.lookup(parent_type, field, Cardinality::Plural)?;
        Ok(self
            .connections
            .entry(key)
            .or_insert_with(|| ConnectionLoader::new(plan)))
    }

    fn lookup(
        &self,
        parent_type: &str,
        field: &str,
        expected: Cardinality,
    ) -> Result<Arc<RelationPlan>> {
        let plan = self.schema.relation(parent_type, field).ok_or_else(|| {
            Error::config(format!(
                "unknown relationship `{}`",
                relation_key(parent_type, field)
            ))
        })?;
        if plan.cardinality != expected {
            return Err(Error::config(format!(
                "relationship `{}` has the wrong cardinality for this loader",
                relation_key(parent_type, field)
            )));
        }
        Ok(plan.clone())
    }
}
