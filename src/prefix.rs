//! Namespace registry and prefix auto-injection
//!
//! Scans a query for prefixed terms that lack an explicit `PREFIX`
//! declaration and prepends the missing declarations from a registered
//! namespace mapping. This is a pure textual scan, deliberately not a SPARQL
//! parser: a prefix appearing inside a string literal or comment will still
//! trigger injection. That is an accepted limitation.

use indexmap::IndexMap;

/// An ordered mapping from namespace prefix to IRI, enumerated in insertion
/// order during injection.
#[derive(Debug, Clone, Default)]
pub struct PrefixRegistry {
    namespaces: IndexMap<String, String>,
}

impl PrefixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefix. Re-registering overwrites the IRI but keeps the
    /// prefix's original position in the iteration order.
    pub fn insert(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), iri.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .map(|(prefix, iri)| (prefix.as_str(), iri.as_str()))
    }

    /// Prepend `PREFIX` declarations for every registered prefix that is
    /// used in the query but not already declared. Idempotent.
    pub fn inject(&self, query: &str) -> String {
        let mut declarations = Vec::new();
        for (prefix, iri) in &self.namespaces {
            let used = format!("{prefix}:");
            let declared = format!("PREFIX {prefix}:");
            if query.contains(&used) && !query.contains(&declared) {
                declarations.push(format!("PREFIX {prefix}: <{iri}>"));
            }
        }
        if declarations.is_empty() {
            query.to_string()
        } else {
            format!("{}\n{}", declarations.join("\n"), query)
        }
    }
}

impl<P: Into<String>, I: Into<String>> FromIterator<(P, I)> for PrefixRegistry {
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut registry = Self::new();
        for (prefix, iri) in iter {
            registry.insert(prefix, iri);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PrefixRegistry {
        PrefixRegistry::from_iter([
            ("foaf", "http://xmlns.com/foaf/0.1/"),
            ("dc", "http://purl.org/dc/elements/1.1/"),
        ])
    }

    #[test]
    fn test_injects_missing_declaration() {
        let query = "SELECT ?name WHERE { ?s foaf:name ?name }";
        let processed = registry().inject(query);
        assert!(processed.starts_with("PREFIX foaf: <http://xmlns.com/foaf/0.1/>\n"));
        assert!(processed.ends_with(query));
    }

    #[test]
    fn test_does_not_duplicate_declaration() {
        let query = "PREFIX foaf: <http://xmlns.com/foaf/0.1/>\nSELECT ?n WHERE { ?s foaf:name ?n }";
        assert_eq!(registry().inject(query), query);
    }

    #[test]
    fn test_idempotent() {
        let query = "ASK { ?s dc:title ?t }";
        let once = registry().inject(query);
        let twice = registry().inject(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unused_prefixes_untouched() {
        let query = "SELECT * WHERE { ?s ?p ?o }";
        assert_eq!(registry().inject(query), query);
    }

    #[test]
    fn test_registry_iteration_order() {
        let query = "SELECT * WHERE { ?s foaf:knows ?x . ?s dc:title ?t }";
        let processed = registry().inject(query);
        let foaf = processed.find("PREFIX foaf:").unwrap();
        let dc = processed.find("PREFIX dc:").unwrap();
        assert!(foaf < dc);
    }

    #[test]
    fn test_accessors() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert_eq!(registry.get("foaf"), Some("http://xmlns.com/foaf/0.1/"));
        assert_eq!(registry.get("missing"), None);
    }
}
