//! # sparql-protocol-client
//!
//! A synchronous client for the [SPARQL 1.1 Protocol], turning query and
//! update strings into HTTP(S) requests against a remote endpoint and the
//! responses back into typed results.
//!
//! The crate is organised around a small protocol state machine:
//!
//! - query text is preprocessed by the [`prefix`] auto-injector,
//! - classified by the [`verb`] matcher to pick an `Accept` content-type set,
//! - shaped into a GET or POST per the protocol's URL-length rule,
//! - executed through a pluggable [`backend`] (blocking `reqwest` or `curl`),
//! - endpoint-issued redirects are followed with cycle detection,
//! - and successful responses are classified into either tabular
//!   [`QuerySolutions`] or an RDF graph artifact handed to an [`RdfGraph`]
//!   collaborator.
//!
//! [SPARQL 1.1 Protocol]: https://www.w3.org/TR/sparql11-protocol/
//!
//! ## Example
//!
//! ```no_run
//! use sparql_protocol_client::{QueryOutcome, SparqlClient};
//!
//! # fn main() -> sparql_protocol_client::Result<()> {
//! let mut client = SparqlClient::new("https://example.org/sparql")?;
//! if let QueryOutcome::Solutions(rows) = client.query("SELECT * WHERE { ?s ?p ?o } LIMIT 5")? {
//!     for row in rows.rows() {
//!         println!("{:?}", row.get("s"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod accept;
pub mod backend;
pub mod client;
pub mod graph;
pub mod prefix;
pub mod results;
pub mod verb;

pub use backend::{
    backend_for, BackendConfig, BackendRequest, BackendResponse, CurlBackend, HttpBackend,
    ReqwestBackend,
};
pub use client::{Intent, QueryOutcome, SparqlClient, UpdateData};
pub use graph::{NTriplesDocument, RdfGraph};
pub use prefix::PrefixRegistry;
pub use results::{QuerySolutions, RdfTerm};
pub use verb::QueryVerb;

/// Core error type for SPARQL protocol operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The transport backend could not complete the HTTP exchange.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The configured backend name matches no known adapter.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),
    /// A redirect target was already visited during this request.
    #[error("Circular redirection to {0}")]
    CircularRedirection(String),
    /// The endpoint answered with a non-2xx status and no usable `Location`.
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },
    /// Update data could not be converted to N-Triples.
    #[error("Conversion error: {0}")]
    Conversion(String),
    /// A response body was malformed for its claimed content type.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for SPARQL protocol operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Crate version, used for the default `User-Agent` header
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
