//! Query verb classification
//!
//! Inspects a raw query string after its BASE/PREFIX prologue and classifies
//! it as SELECT, ASK, CONSTRUCT or DESCRIBE. Non-standard queries (vendor
//! extensions, unparseable prologues) classify as `None` — that is a
//! first-class outcome, not an error.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// The four standard SPARQL 1.1 query forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryVerb {
    Select,
    Ask,
    Construct,
    Describe,
}

impl QueryVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryVerb::Select => "SELECT",
            QueryVerb::Ask => "ASK",
            QueryVerb::Construct => "CONSTRUCT",
            QueryVerb::Describe => "DESCRIBE",
        }
    }

    /// True for the query forms whose results are an RDF graph rather than
    /// a tabular solution set.
    pub fn returns_graph(&self) -> bool {
        matches!(self, QueryVerb::Construct | QueryVerb::Describe)
    }
}

impl fmt::Display for QueryVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Zero or more leading BASE <...> / PREFIX name: <...> clauses, in any order.
static PROLOGUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:BASE\s*<[^>]*>|PREFIX\s+[A-Za-z0-9_.\-]*:\s*<[^>]*>)\s*)*")
        .expect("prologue pattern is valid")
});

static VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(SELECT|ASK|CONSTRUCT|DESCRIBE)\b").expect("verb pattern is valid")
});

/// Classify a query string by its verb.
///
/// Strips the prologue, then matches the first whole-token occurrence of a
/// standard verb, case-insensitively. Returns `None` when no verb is found.
pub fn classify(query: &str) -> Option<QueryVerb> {
    let body = match PROLOGUE.find(query) {
        Some(prologue) => &query[prologue.end()..],
        None => query,
    };
    let matched = VERB.find(body)?;
    match matched.as_str().to_ascii_uppercase().as_str() {
        "SELECT" => Some(QueryVerb::Select),
        "ASK" => Some(QueryVerb::Ask),
        "CONSTRUCT" => Some(QueryVerb::Construct),
        "DESCRIBE" => Some(QueryVerb::Describe),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_select() {
        assert_eq!(classify("SELECT * WHERE {?s ?p ?o}"), Some(QueryVerb::Select));
    }

    #[test]
    fn test_classify_ask_with_prologue() {
        assert_eq!(
            classify("PREFIX ex: <http://x/> ASK {?s ?p ?o}"),
            Some(QueryVerb::Ask)
        );
    }

    #[test]
    fn test_classify_describe() {
        assert_eq!(classify("DESCRIBE <http://x/>"), Some(QueryVerb::Describe));
    }

    #[test]
    fn test_classify_construct_lowercase() {
        assert_eq!(
            classify("construct { ?s ?p ?o } where { ?s ?p ?o }"),
            Some(QueryVerb::Construct)
        );
    }

    #[test]
    fn test_classify_repeated_prologue() {
        let query = "BASE <http://base/>\nPREFIX a: <http://a/>\nPREFIX b: <http://b/>\nSELECT ?s WHERE { ?s a:p b:q }";
        assert_eq!(classify(query), Some(QueryVerb::Select));
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify("LOAD <http://example.org/data.ttl>"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_verb_must_be_whole_token() {
        assert_eq!(classify("ASKEW ?s"), None);
        assert_eq!(classify("PREASK { ?s ?p ?o }"), None);
    }

    #[test]
    fn test_returns_graph() {
        assert!(QueryVerb::Construct.returns_graph());
        assert!(QueryVerb::Describe.returns_graph());
        assert!(!QueryVerb::Select.returns_graph());
        assert!(!QueryVerb::Ask.returns_graph());
    }
}
