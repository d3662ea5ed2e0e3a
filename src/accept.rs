//! Quality-weighted `Accept` header negotiation
//!
//! The SPARQL 1.1 Protocol leaves the choice of result serialization to
//! content negotiation. Two fixed content-type sets exist: one for tabular
//! SPARQL results (SELECT/ASK) and one for RDF graph serializations
//! (CONSTRUCT/DESCRIBE). Iteration order of a set is significant — it breaks
//! ties between equally weighted types.

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::verb::QueryVerb;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const SPARQL_RESULTS_XML: &str = "application/sparql-results+xml";
pub const LD_JSON: &str = "application/ld+json";
pub const RDF_XML: &str = "application/rdf+xml";
pub const TURTLE: &str = "text/turtle";
pub const N_QUADS: &str = "application/n-quads";
pub const N_TRIPLES: &str = "application/n-triples";
pub const SPARQL_UPDATE: &str = "application/sparql-update";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// An ordered mapping from MIME type to a preference weight in `[0.0, 1.0]`.
#[derive(Debug, Clone, Default)]
pub struct AcceptSet {
    entries: IndexMap<String, f32>,
}

impl AcceptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a content type with the given quality weight.
    pub fn insert(&mut self, content_type: impl Into<String>, weight: f32) {
        self.entries.insert(content_type.into(), weight.clamp(0.0, 1.0));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render the set as an `Accept` header value: entries ordered by
    /// descending weight (insertion order breaks ties), `;q=` omitted for
    /// full-weight types.
    pub fn header_value(&self) -> String {
        let mut entries: Vec<(&str, f32)> = self
            .entries
            .iter()
            .map(|(content_type, weight)| (content_type.as_str(), *weight))
            .collect();
        // Stable sort keeps insertion order among equal weights.
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
            .iter()
            .map(|(content_type, weight)| {
                if (*weight - 1.0).abs() < f32::EPSILON {
                    (*content_type).to_string()
                } else {
                    format!("{content_type};q={weight}")
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for AcceptSet {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (content_type, weight) in iter {
            set.insert(content_type, weight);
        }
        set
    }
}

/// Content types for tabular SPARQL results (SELECT/ASK).
pub static TABULAR_TYPES: LazyLock<AcceptSet> = LazyLock::new(|| {
    AcceptSet::from_iter([(SPARQL_RESULTS_JSON, 1.0), (SPARQL_RESULTS_XML, 0.8)])
});

/// Content types for RDF graph serializations (CONSTRUCT/DESCRIBE).
pub static GRAPH_TYPES: LazyLock<AcceptSet> = LazyLock::new(|| {
    AcceptSet::from_iter([
        (LD_JSON, 1.0),
        (RDF_XML, 0.9),
        (TURTLE, 0.8),
        (N_QUADS, 0.7),
        (N_TRIPLES, 0.7),
    ])
});

/// Select the content-type set for a classified query verb. Unclassified
/// queries fall back to the tabular set.
pub fn accept_for(verb: Option<QueryVerb>) -> &'static AcceptSet {
    match verb {
        Some(QueryVerb::Construct) | Some(QueryVerb::Describe) => &GRAPH_TYPES,
        _ => &TABULAR_TYPES,
    }
}

/// Strip parameters (charset and friends) from a `Content-Type` value,
/// leaving the lowercased base MIME type.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabular_header_value() {
        let header = TABULAR_TYPES.header_value();
        assert_eq!(
            header,
            "application/sparql-results+json,application/sparql-results+xml;q=0.8"
        );
    }

    #[test]
    fn test_graph_header_lists_ld_json_first() {
        let header = GRAPH_TYPES.header_value();
        assert!(header.starts_with("application/ld+json,"));
        assert!(header.contains("application/rdf+xml;q=0.9"));
        assert!(header.contains("text/turtle;q=0.8"));
        // Equal weights keep insertion order.
        let quads = header.find("application/n-quads;q=0.7").unwrap();
        let triples = header.find("application/n-triples;q=0.7").unwrap();
        assert!(quads < triples);
    }

    #[test]
    fn test_full_weight_omits_q() {
        let header = TABULAR_TYPES.header_value();
        assert!(!header.contains("application/sparql-results+json;q"));
    }

    #[test]
    fn test_descending_weight_order() {
        let set = AcceptSet::from_iter([("a/low", 0.3), ("a/high", 0.9)]);
        assert_eq!(set.header_value(), "a/high;q=0.9,a/low;q=0.3");
    }

    #[test]
    fn test_accept_for_verbs() {
        assert_eq!(
            accept_for(Some(QueryVerb::Select)).header_value(),
            TABULAR_TYPES.header_value()
        );
        assert_eq!(
            accept_for(Some(QueryVerb::Construct)).header_value(),
            GRAPH_TYPES.header_value()
        );
        assert_eq!(accept_for(None).header_value(), TABULAR_TYPES.header_value());
    }

    #[test]
    fn test_essence_strips_parameters() {
        assert_eq!(
            essence("application/sparql-results+json; charset=utf-8"),
            "application/sparql-results+json"
        );
        assert_eq!(essence("Text/Turtle"), "text/turtle");
        assert_eq!(essence(""), "");
    }
}
