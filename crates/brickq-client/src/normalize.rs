//! SPARQL JSON results normalization.
//!
//! Turns `application/sparql-results+json` documents into a [`ResultTable`].
//! Column order follows `head.vars`; a row ends at the first variable the
//! binding leaves unbound.

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::identifier::Identifier;
use crate::types::ResultTable;

#[derive(Debug, Default, Deserialize)]
struct SparqlResponse {
    #[serde(default)]
    head: Head,
    #[serde(default)]
    results: Results,
}

#[derive(Debug, Default, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Results {
    #[serde(default)]
    bindings: Vec<HashMap<String, Term>>,
}

/// RDF term in a binding. Only `value` is used; `type`, `datatype` and
/// `xml:lang` are ignored.
#[derive(Debug, Deserialize)]
struct Term {
    value: String,
}

/// Normalize a results document read from `reader`.
pub fn normalize<R: Read>(reader: R) -> QueryResult<ResultTable> {
    let response: SparqlResponse = serde_json::from_reader(reader)
        .map_err(|e| QueryError::decode(format!("failed to parse query results: {}", e)))?;
    Ok(into_table(response))
}

/// Normalize a results document held in memory.
pub fn normalize_slice(bytes: &[u8]) -> QueryResult<ResultTable> {
    let response: SparqlResponse = serde_json::from_slice(bytes)
        .map_err(|e| QueryError::decode(format!("failed to parse query results: {}", e)))?;
    Ok(into_table(response))
}

fn into_table(response: SparqlResponse) -> ResultTable {
    let vars = response.head.vars;
    let mut table = ResultTable::default();

    for binding in &response.results.bindings {
        let row = vars
            .iter()
            .map_while(|var| binding.get(var))
            .map(|term| Identifier::parse(&term.value))
            .collect();
        table.push(row);
    }

    debug!(rows = table.len(), vars = vars.len(), "normalized query results");
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_orders_columns_by_head() {
        let body = r#"{
            "head": {"vars": ["vav", "room"]},
            "results": {"bindings": [
                {
                    "room": {"type": "uri", "value": "http://buildsys.org/ontologies/building_example#Room_410"},
                    "vav": {"type": "uri", "value": "http://buildsys.org/ontologies/building_example#VAV_4_1"}
                }
            ]}
        }"#;

        let table = normalize_slice(body.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row[0].value, "VAV_4_1");
        assert_eq!(row[1].value, "Room_410");
        assert_eq!(
            row[0].namespace,
            "http://buildsys.org/ontologies/building_example"
        );
    }

    #[test]
    fn test_normalize_missing_trailing_binding_shortens_row() {
        let body = r#"{
            "head": {"vars": ["a", "b"]},
            "results": {"bindings": [{"a": {"type": "literal", "value": "brick:Sensor"}}]}
        }"#;

        let table = normalize_slice(body.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].len(), 1);
        assert_eq!(table.rows()[0][0], Identifier::new("brick", "Sensor"));
    }

    #[test]
    fn test_normalize_row_stops_at_first_gap() {
        let body = r#"{
            "head": {"vars": ["a", "b", "c"]},
            "results": {"bindings": [
                {"a": {"value": "x"}, "c": {"value": "z"}},
                {"a": {"value": "x"}, "b": {"value": "y"}, "c": {"value": "z"}},
                {"b": {"value": "y"}}
            ]}
        }"#;

        let table = normalize_slice(body.as_bytes()).unwrap();
        let lengths: Vec<usize> = table.iter().map(|r| r.len()).collect();
        assert_eq!(lengths, vec![1, 3, 0]);
    }

    #[test]
    fn test_normalize_zero_bindings() {
        let body = r#"{"head": {"vars": ["s"]}, "results": {"bindings": []}}"#;
        let table = normalize_slice(body.as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_normalize_boolean_result_has_no_rows() {
        let body = r#"{"head": {}, "boolean": true}"#;
        let table = normalize_slice(body.as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_normalize_preserves_response_order() {
        let body = r#"{
            "head": {"vars": ["n"]},
            "results": {"bindings": [
                {"n": {"value": "3"}}, {"n": {"value": "1"}}, {"n": {"value": "2"}}
            ]}
        }"#;

        let table = normalize_slice(body.as_bytes()).unwrap();
        let values: Vec<&str> = table.iter().map(|r| r[0].value.as_str()).collect();
        assert_eq!(values, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_normalize_malformed_json() {
        let err = normalize_slice(b"{\"head\": {\"vars\": [").unwrap_err();
        assert!(matches!(err, QueryError::Decode { .. }));
    }

    #[test]
    fn test_normalize_term_without_value() {
        let body = r#"{"head": {"vars": ["s"]}, "results": {"bindings": [{"s": {"type": "uri"}}]}}"#;
        let err = normalize_slice(body.as_bytes()).unwrap_err();
        assert!(matches!(err, QueryError::Decode { .. }));
    }

    #[test]
    fn test_normalize_from_reader() {
        let body = r#"{"head": {"vars": ["s"]}, "results": {"bindings": [{"s": {"value": "?unbound"}}]}}"#;
        let table = normalize(std::io::Cursor::new(body)).unwrap();
        assert!(table.rows()[0][0].is_variable());
    }
}
