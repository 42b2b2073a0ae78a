//! Connection-shaped results for plural relationship fields.

use graphrel_core::row::Row;
use serde::Serialize;

/// Paging flags for one connection page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether rows exist before this page in scan-ascending terms.
    pub has_previous_page: bool,
    /// Whether rows exist after this page in scan-ascending terms.
    pub has_next_page: bool,
}

/// One connection edge: a row plus its cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    /// The related row.
    pub node: Row,
    /// Opaque cursor; equals the row's identifier.
    pub cursor: String,
}

/// The paginated result shape for a plural relationship field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// The page of edges, in scan order.
    pub edges: Vec<Edge>,
    /// Paging flags.
    pub page_info: PageInfo,
    /// Number of edges on this page.
    pub count: usize,
    /// Total rows for the relationship and key, ignoring pagination.
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphrel_core::value::Value;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let connection = Connection {
            edges: vec![Edge {
                node: Row::from_pairs(vec![("id", Value::from("p1"))]),
                cursor: "p1".to_string(),
            }],
            page_info: PageInfo {
                has_previous_page: false,
                has_next_page: true,
            },
            count: 1,
            total_count: 3,
        };
        let json = serde_json::to_value(&connection).unwrap();
        assert_eq!(json["pageInfo"]["hasNextPage"], true);
        assert_eq!(json["totalCount"], 3);
        assert_eq!(json["edges"][0]["cursor"], "p1");
    }
}
