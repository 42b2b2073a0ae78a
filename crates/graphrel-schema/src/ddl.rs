//! Postgres DDL generation.
//!
//! Renders the compiled layout as `CREATE TABLE` / `CREATE INDEX` statements
//! for the external migration/provisioning tool. Output is deterministic:
//! all tables in emission order, then all indexes in emission order.
//! Uniqueness constraints are lowered to unique indexes so they can be
//! dropped later without table recreation.

use crate::compiler::CompiledTables;
use crate::table::{Column, Table};
use graphrel_core::naming::quote_ident;

/// Render the full schema as DDL statements.
#[must_use]
pub fn generate_ddl(compiled: &CompiledTables) -> Vec<String> {
    let mut statements = Vec::with_capacity(compiled.tables.len() + compiled.indexes.len());

    for table in &compiled.tables {
        tracing::debug!(table = %table.name, "generating DDL");
        statements.push(create_table(table));
    }
    for index in &compiled.indexes {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let columns: Vec<String> = index.columns.iter().map(|c| quote_ident(c)).collect();
        statements.push(format!(
            "CREATE {unique}INDEX {} ON {}({})",
            quote_ident(&index.name()),
            quote_ident(&index.table),
            columns.join(", ")
        ));
    }

    statements
}

fn create_table(table: &Table) -> String {
    let columns: Vec<String> = table.columns.iter().map(column_def).collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_ident(&table.name),
        columns.join(", ")
    )
}

fn column_def(column: &Column) -> String {
    let mut def = format!(
        "{} {}",
        quote_ident(&column.name),
        column.column_type.sql_name()
    );
    if column.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    if column.not_null && !column.primary_key {
        def.push_str(" NOT NULL");
    }
    if column.unique {
        def.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    if let Some(reference) = &column.references {
        def.push_str(&format!(
            " REFERENCES {}({})",
            quote_ident(&reference.table),
            quote_ident(&reference.column)
        ));
    }
    def
}
