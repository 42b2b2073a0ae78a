//! Identifier naming helpers.
//!
//! Entity names arrive in the schema author's casing (`BlogPost`); tables and
//! columns are snake-cased, and tables are pluralized. These functions are
//! the single source of truth for that mapping — every layer that needs a
//! table name derives it from here so compiled statements, DDL, and loaders
//! agree byte for byte.

/// Convert a camel/Pascal-case name to snake_case.
#[must_use]
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            for low in ch.to_lowercase() {
                out.push(low);
            }
            prev_lower = false;
        } else if ch == '-' || ch == ' ' {
            out.push('_');
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

/// Pluralize an already snake-cased noun.
///
/// Covers the regular English forms; irregular nouns come out regular
/// (`person` -> `persons`), which is acceptable for generated table names.
#[must_use]
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    if let Some(stem) = name.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{stem}ies");
        }
    }
    if name.ends_with('s')
        || name.ends_with('x')
        || name.ends_with('z')
        || name.ends_with("ch")
        || name.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

/// The table name for an entity type: pluralized snake case.
#[must_use]
pub fn table_name(entity: &str) -> String {
    pluralize(&snake_case(entity))
}

/// Quote an identifier for DDL output.
#[must_use]
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
