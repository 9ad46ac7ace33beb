//! Namespace prefix injection.
//!
//! Every query is sent with the same prefix block in front of it. The block is
//! part of the cache key, so its text (including the repeated `rdf`/`rdfs`
//! lines) must stay byte-stable.

use crate::identifier::Identifier;

/// Prefix declarations prepended to every query body.
pub const PREFIX_BLOCK: &str = concat!(
    "PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> \n",
    "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> \n",
    "PREFIX bf: <http://buildsys.org/ontologies/BrickFrame#>\n",
    "PREFIX brick: <http://buildsys.org/ontologies/Brick#> \n",
    "PREFIX btag: <http://buildsys.org/ontologies/BrickTag#> \n",
    "PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> \n",
    "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> \n",
    "PREFIX soda_hall: <http://buildsys.org/ontologies/building_example#> \n",
);

/// Namespace bindings declared by [`PREFIX_BLOCK`], without duplicates.
pub const NAMESPACES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema"),
    ("bf", "http://buildsys.org/ontologies/BrickFrame"),
    ("brick", "http://buildsys.org/ontologies/Brick"),
    ("btag", "http://buildsys.org/ontologies/BrickTag"),
    ("soda_hall", "http://buildsys.org/ontologies/building_example"),
];

/// Produce the fully qualified query text sent upstream and used as cache key.
///
/// No canonicalization: bodies that differ only in whitespace or variable
/// names produce different keys.
pub fn qualify(body: &str) -> String {
    let mut out = String::with_capacity(PREFIX_BLOCK.len() + body.len());
    out.push_str(PREFIX_BLOCK);
    out.push_str(body);
    out
}

/// Prefix bound to a namespace IRI (given without the trailing `#`).
pub fn prefix_for(namespace: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(_, ns)| *ns == namespace)
        .map(|(p, _)| *p)
}

/// Render an identifier as a CURIE when its namespace has a known prefix.
pub fn compact(id: &Identifier) -> String {
    match prefix_for(&id.namespace) {
        Some(prefix) => format!("{}:{}", prefix, id.value),
        None => id.to_string(),
    }
}
