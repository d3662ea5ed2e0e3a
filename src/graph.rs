//! RDF graph collaborator contract
//!
//! Full RDF parsing and serialization live outside this crate. The client
//! only needs two capabilities from a graph type: construct itself from a
//! response body with a known content type, and serialize itself to
//! N-Triples for `INSERT DATA` statements. [`NTriplesDocument`] is the
//! built-in implementation, a plain carrier for N-Triples text.

use crate::accept::{essence, N_TRIPLES};
use crate::{ClientError, Result};

/// Contract for the RDF graph type a [`crate::SparqlClient`] produces for
/// CONSTRUCT/DESCRIBE responses and consumes for update data.
pub trait RdfGraph: Sized {
    /// Construct a graph from a response body. `content_type` is the base
    /// MIME type with parameters already stripped; implementations fail
    /// with [`ClientError::Parse`] for types they cannot handle.
    fn parse(base_iri: &str, content_type: &str, body: &[u8]) -> Result<Self>;

    /// Serialize the graph to N-Triples for embedding in a SPARQL Update
    /// `DATA` block.
    fn to_ntriples(&self) -> Result<String>;
}

/// Minimal [`RdfGraph`] implementation carrying an N-Triples document
/// verbatim. Accepts `application/n-triples` (and `text/plain`, its legacy
/// alias); any other content type is a parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NTriplesDocument {
    base_iri: String,
    text: String,
}

impl NTriplesDocument {
    /// Build a document directly from N-Triples text.
    pub fn from_triples(text: impl Into<String>) -> Self {
        Self {
            base_iri: String::new(),
            text: text.into(),
        }
    }

    pub fn base_iri(&self) -> &str {
        &self.base_iri
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of statement lines (blank lines and comments excluded).
    pub fn len(&self) -> usize {
        self.text
            .lines()
            .filter(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RdfGraph for NTriplesDocument {
    fn parse(base_iri: &str, content_type: &str, body: &[u8]) -> Result<Self> {
        let mime = essence(content_type);
        if mime != N_TRIPLES && mime != "text/plain" {
            return Err(ClientError::Parse(format!(
                "cannot parse graph content type: {content_type}"
            )));
        }
        let text = std::str::from_utf8(body)
            .map_err(|e| ClientError::Parse(format!("graph body is not valid UTF-8: {e}")))?;
        Ok(Self {
            base_iri: base_iri.to_string(),
            text: text.to_string(),
        })
    }

    fn to_ntriples(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ntriples() {
        let body = b"<http://s> <http://p> <http://o> .\n";
        let doc =
            NTriplesDocument::parse("http://example.org/sparql", N_TRIPLES, body).unwrap();
        assert_eq!(doc.base_iri(), "http://example.org/sparql");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.to_ntriples().unwrap(), "<http://s> <http://p> <http://o> .\n");
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let result = NTriplesDocument::parse("http://x/", "text/turtle", b"");
        assert!(matches!(result, Err(ClientError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let result = NTriplesDocument::parse("http://x/", N_TRIPLES, &[0xff, 0xfe]);
        assert!(matches!(result, Err(ClientError::Parse(_))));
    }

    #[test]
    fn test_len_skips_comments_and_blanks() {
        let doc = NTriplesDocument::from_triples("# header\n\n<a> <b> <c> .\n<d> <e> <f> .\n");
        assert_eq!(doc.len(), 2);
        assert!(!doc.is_empty());
    }
}
