//! The SPARQL protocol client orchestrator
//!
//! Owns the query/update endpoint URIs, shapes requests (prefix injection,
//! verb classification, Accept negotiation, GET-vs-POST selection), executes
//! them through the configured transport backend, follows endpoint-issued
//! redirects with cycle detection, and classifies successful responses into
//! tabular solutions or graph artifacts.

use std::marker::PhantomData;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::StatusCode;
use tracing::{debug, info, warn};

use crate::accept::{accept_for, essence, FORM_URLENCODED, SPARQL_UPDATE};
use crate::backend::{BackendConfig, BackendRequest, BackendResponse, HttpBackend, ReqwestBackend};
use crate::graph::{NTriplesDocument, RdfGraph};
use crate::prefix::PrefixRegistry;
use crate::results::QuerySolutions;
use crate::verb::classify;
use crate::{ClientError, Result};

/// Maximum length of an encoded GET request URI; longer queries switch to a
/// form-encoded POST.
pub const MAX_GET_URI_LEN: usize = 2046;

/// Whether a request reads or writes, selecting the endpoint, default HTTP
/// method and Accept content-type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Query,
    Update,
}

/// The typed outcome of a successful query.
#[derive(Debug)]
pub enum QueryOutcome<G> {
    /// Tabular SPARQL results (SELECT/ASK).
    Solutions(QuerySolutions),
    /// An RDF graph artifact (CONSTRUCT/DESCRIBE, or any non-tabular
    /// response content type).
    Graph(G),
    /// A 204 No Content response, returned unparsed.
    NoContent(BackendResponse),
}

impl<G> QueryOutcome<G> {
    pub fn as_solutions(&self) -> Option<&QuerySolutions> {
        match self {
            QueryOutcome::Solutions(solutions) => Some(solutions),
            _ => None,
        }
    }

    pub fn into_solutions(self) -> Result<QuerySolutions> {
        match self {
            QueryOutcome::Solutions(solutions) => Ok(solutions),
            _ => Err(ClientError::Parse(
                "query did not return a tabular result".into(),
            )),
        }
    }
}

/// Data for an `INSERT DATA` / `DELETE DATA` statement: either literal
/// triple text or a graph collaborator serialized to N-Triples.
#[derive(Debug)]
pub enum UpdateData<'a, G> {
    Triples(&'a str),
    Graph(&'a G),
}

impl<'a, G> UpdateData<'a, G> {
    pub fn triples(text: &'a str) -> Self {
        UpdateData::Triples(text)
    }

    pub fn graph(graph: &'a G) -> Self {
        UpdateData::Graph(graph)
    }
}

impl<'a, G> From<&'a str> for UpdateData<'a, G> {
    fn from(text: &'a str) -> Self {
        UpdateData::Triples(text)
    }
}

/// A synchronous SPARQL 1.1 Protocol client.
///
/// Redirect following permanently reassigns the relevant endpoint URI, so
/// subsequent calls reuse the redirected endpoint. Because of this in-place
/// mutation the client is not safe for concurrent use; use one instance per
/// thread or guard calls with a lock.
pub struct SparqlClient<G: RdfGraph = NTriplesDocument> {
    backend: Box<dyn HttpBackend>,
    query_uri: String,
    query_uri_has_params: bool,
    update_uri: String,
    prefixes: PrefixRegistry,
    _graph: PhantomData<G>,
}

impl SparqlClient<NTriplesDocument> {
    /// Create a client over the default blocking `reqwest` backend, using
    /// `query_uri` for updates as well.
    pub fn new(query_uri: impl Into<String>) -> Result<Self> {
        let backend = Box::new(ReqwestBackend::new(BackendConfig::default())?);
        Ok(Self::with_backend(backend, query_uri))
    }
}

impl<G: RdfGraph> SparqlClient<G> {
    /// Create a client over an explicit transport backend.
    pub fn with_backend(backend: Box<dyn HttpBackend>, query_uri: impl Into<String>) -> Self {
        let query_uri = query_uri.into();
        let query_uri_has_params = has_query_component(&query_uri);
        Self {
            backend,
            update_uri: query_uri.clone(),
            query_uri,
            query_uri_has_params,
            prefixes: PrefixRegistry::default(),
            _graph: PhantomData,
        }
    }

    /// Use a separate endpoint for updates.
    pub fn with_update_uri(mut self, update_uri: impl Into<String>) -> Self {
        self.update_uri = update_uri.into();
        self
    }

    /// Register namespaces for prefix auto-injection.
    pub fn with_prefixes(mut self, prefixes: PrefixRegistry) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn query_uri(&self) -> &str {
        &self.query_uri
    }

    pub fn update_uri(&self) -> &str {
        &self.update_uri
    }

    /// Execute a read request and parse the response into a typed result.
    pub fn query(&mut self, text: &str) -> Result<QueryOutcome<G>> {
        let response = self.request(text, Intent::Query)?;
        if response.status == StatusCode::NO_CONTENT {
            return Ok(QueryOutcome::NoContent(response));
        }
        self.classify_response(response)
    }

    /// Execute a write request, returning the raw backend response.
    ///
    /// No parsing is attempted: callers needing the status alone (for
    /// example a 204 No Content) inspect the response directly.
    pub fn update(&mut self, text: &str) -> Result<BackendResponse> {
        self.request(text, Intent::Update)
    }

    /// Build and execute `INSERT DATA { ... }`, optionally scoped to a
    /// named graph.
    pub fn insert_data(
        &mut self,
        data: UpdateData<'_, G>,
        graph_iri: Option<&str>,
    ) -> Result<BackendResponse> {
        self.update_data("INSERT", data, graph_iri)
    }

    /// Build and execute `DELETE DATA { ... }`, optionally scoped to a
    /// named graph.
    pub fn delete_data(
        &mut self,
        data: UpdateData<'_, G>,
        graph_iri: Option<&str>,
    ) -> Result<BackendResponse> {
        self.update_data("DELETE", data, graph_iri)
    }

    /// Build and execute a `<OPERATION> DATA { ... }` statement from either
    /// literal triple text or a graph serialized to N-Triples.
    pub fn update_data(
        &mut self,
        operation: &str,
        data: UpdateData<'_, G>,
        graph_iri: Option<&str>,
    ) -> Result<BackendResponse> {
        let triples = match data {
            UpdateData::Triples(text) => text.to_string(),
            UpdateData::Graph(graph) => graph
                .to_ntriples()
                .map_err(|e| ClientError::Conversion(e.to_string()))?,
        };
        let statement = match graph_iri {
            Some(iri) => format!("{operation} DATA {{ GRAPH <{iri}> {{\n{triples}\n}} }}"),
            None => format!("{operation} DATA {{\n{triples}\n}}"),
        };
        self.update(&statement)
    }

    /// Build and execute `CLEAR [SILENT] (GRAPH <target> | all | named |
    /// default)`. The bare targets are matched case-insensitively as full
    /// tokens and emitted as given.
    pub fn clear(&mut self, target: &str, silent: bool) -> Result<BackendResponse> {
        let clause = match target.to_ascii_lowercase().as_str() {
            "all" | "named" | "default" => target.to_string(),
            _ => format!("GRAPH <{target}>"),
        };
        let statement = if silent {
            format!("CLEAR SILENT {clause}")
        } else {
            format!("CLEAR {clause}")
        };
        self.update(&statement)
    }

    /// Count triples matching `condition` (default `?s ?p ?o`). The
    /// condition is inserted into the query verbatim; the caller is
    /// responsible for it being valid SPARQL.
    pub fn count_triples(&mut self, condition: Option<&str>) -> Result<u64> {
        let condition = condition.unwrap_or("?s ?p ?o");
        let text = format!("SELECT (COUNT(*) AS ?count) {{ {condition} }}");
        let solutions = self.query(&text)?.into_solutions()?;
        let term = solutions.get(0, "count").ok_or_else(|| {
            ClientError::Parse("count query returned no `count` binding".into())
        })?;
        term.value()
            .parse::<u64>()
            .map_err(|e| ClientError::Parse(format!("count binding is not an integer: {e}")))
    }

    /// List the identifiers of all named graphs, optionally limited.
    pub fn list_named_graphs(&mut self, limit: Option<usize>) -> Result<Vec<String>> {
        let mut text = String::from("SELECT DISTINCT ?g WHERE {GRAPH ?g {?s ?p ?o}}");
        if let Some(limit) = limit {
            text.push_str(&format!(" LIMIT {limit}"));
        }
        let solutions = self.query(&text)?.into_solutions()?;
        Ok(solutions
            .rows()
            .iter()
            .filter_map(|row| row.get("g"))
            .map(|term| term.value().to_string())
            .collect())
    }

    /// The generic request protocol: preprocess, shape, execute, follow
    /// redirects while making forward progress, and return the first 2xx
    /// response.
    fn request(&mut self, text: &str, intent: Intent) -> Result<BackendResponse> {
        let mut visited: Vec<String> = Vec::new();
        loop {
            let processed = self.prefixes.inject(text);
            let request = self.shape(&processed, intent)?;
            debug!(method = %request.method, uri = %request.uri, "issuing SPARQL protocol request");

            let response = self.backend.execute(&request)?;
            if response.is_success() {
                return Ok(response);
            }

            match response.location().map(str::to_owned) {
                Some(location) if visited.iter().any(|seen| *seen == location) => {
                    warn!(%location, "redirect target already visited, aborting");
                    return Err(ClientError::CircularRedirection(location));
                }
                Some(location) => {
                    info!(
                        from = %self.endpoint_for(intent),
                        to = %location,
                        "following endpoint redirect"
                    );
                    visited.push(self.endpoint_for(intent).to_string());
                    self.assign_endpoint(intent, location);
                }
                None => {
                    return Err(ClientError::RequestFailed {
                        status: response.status.as_u16(),
                        body: response.body_text().into_owned(),
                    });
                }
            }
        }
    }

    /// Shape one HTTP request for the preprocessed text.
    fn shape(&self, processed: &str, intent: Intent) -> Result<BackendRequest> {
        match intent {
            Intent::Update => {
                BackendRequest::post(self.update_uri.clone(), Bytes::from(processed.to_owned()))
                    .header(CONTENT_TYPE, SPARQL_UPDATE)?
                    .header(ACCEPT, &accept_for(None).header_value())
            }
            Intent::Query => {
                let accept = accept_for(classify(processed)).header_value();
                let encoded = urlencoding::encode(processed);
                let separator = if self.query_uri_has_params { '&' } else { '?' };
                let get_uri = format!("{}{}query={}", self.query_uri, separator, encoded);
                if get_uri.len() <= MAX_GET_URI_LEN {
                    BackendRequest::get(get_uri).header(ACCEPT, &accept)
                } else {
                    BackendRequest::post(
                        self.query_uri.clone(),
                        Bytes::from(format!("query={encoded}")),
                    )
                    .header(CONTENT_TYPE, FORM_URLENCODED)?
                    .header(ACCEPT, &accept)
                }
            }
        }
    }

    /// Classify a successful response by content type: SPARQL results
    /// parse into [`QuerySolutions`], everything else is delegated to the
    /// graph collaborator with the query endpoint as base IRI.
    fn classify_response(&self, response: BackendResponse) -> Result<QueryOutcome<G>> {
        let mime = essence(response.content_type().unwrap_or(""));
        if mime.starts_with("application/sparql-results") {
            Ok(QueryOutcome::Solutions(QuerySolutions::parse(
                &response.body,
                &mime,
            )?))
        } else {
            Ok(QueryOutcome::Graph(G::parse(
                &self.query_uri,
                &mime,
                &response.body,
            )?))
        }
    }

    fn endpoint_for(&self, intent: Intent) -> &str {
        match intent {
            Intent::Query => &self.query_uri,
            Intent::Update => &self.update_uri,
        }
    }

    fn assign_endpoint(&mut self, intent: Intent, uri: String) {
        match intent {
            Intent::Query => {
                self.query_uri_has_params = has_query_component(&uri);
                self.query_uri = uri;
            }
            Intent::Update => self.update_uri = uri,
        }
    }
}

/// True iff the URI's query component is non-empty.
fn has_query_component(uri: &str) -> bool {
    let without_fragment = uri.split('#').next().unwrap_or(uri);
    match without_fragment.split_once('?') {
        Some((_, query)) => !query.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_query_component() {
        assert!(!has_query_component("http://example.org/sparql"));
        assert!(has_query_component("http://example.org/sparql?default-graph-uri=http://g/"));
        assert!(!has_query_component("http://example.org/sparql?"));
        assert!(!has_query_component("http://example.org/sparql#frag"));
        assert!(has_query_component("http://example.org/sparql?x=1#frag"));
    }
}
