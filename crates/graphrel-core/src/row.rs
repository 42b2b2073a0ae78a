//! Decoded result rows.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One decoded row from the statement executor.
///
/// Columns keep the order the statement selected them in; lookup by name is
/// linear, which is fine for the narrow rows relationship traversal produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from parallel column/value lists.
    ///
    /// The two lists must be the same length; executors are expected to
    /// guarantee this, so a mismatch is truncated to the shorter side.
    #[must_use]
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        if columns.len() != values.len() {
            tracing::warn!(
                columns = columns.len(),
                values = values.len(),
                "row arity mismatch; truncating to the shorter side"
            );
        }
        let len = columns.len().min(values.len());
        let mut columns = columns;
        let mut values = values;
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Create a row from `(column, value)` pairs. Mostly useful in tests.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(&str, Value)>) -> Self {
        let (columns, values) = pairs
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .unzip();
        Self { columns, values }
    }

    /// Look up a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Look up a value by position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The column names in selection order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_name_and_index() {
        let row = Row::from_pairs(vec![("id", Value::from("a1")), ("title", Value::from("T"))]);
        assert_eq!(row.get("id"), Some(&Value::from("a1")));
        assert_eq!(row.get("title"), Some(&Value::from("T")));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_index(1), Some(&Value::from("T")));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_mismatched_lengths_truncate() {
        let row = Row::new(
            vec!["a".to_string(), "b".to_string()],
            vec![Value::Int(1)],
        );
        assert_eq!(row.len(), 1);
        assert_eq!(row.columns(), ["a".to_string()]);
    }
}
