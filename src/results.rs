//! SPARQL query results parsing
//!
//! Parses both W3C result formats the client advertises in its `Accept`
//! header: SPARQL Results JSON and SPARQL Results XML.
//!
//! See: <https://www.w3.org/TR/sparql11-results-json/> and
//! <https://www.w3.org/TR/rdf-sparql-XMLres/>

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use tracing::debug;

use crate::accept::{SPARQL_RESULTS_JSON, SPARQL_RESULTS_XML};
use crate::{ClientError, Result};

/// A single RDF term bound to a variable in a solution row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfTerm {
    Iri(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl RdfTerm {
    /// The lexical value of the term, regardless of its kind.
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Iri(value) => value,
            RdfTerm::BlankNode(value) => value,
            RdfTerm::Literal { value, .. } => value,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, RdfTerm::Iri(_))
    }
}

/// A solution row: variable name to bound term.
pub type Row = HashMap<String, RdfTerm>;

/// A parsed tabular SPARQL result set.
///
/// SELECT results carry variables and rows; ASK results carry a boolean and
/// no rows.
#[derive(Debug, Clone, Default)]
pub struct QuerySolutions {
    variables: Vec<String>,
    rows: Vec<Row>,
    boolean: Option<bool>,
}

impl QuerySolutions {
    /// Parse a response body for the given base content type.
    pub fn parse(body: &[u8], content_type: &str) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|e| ClientError::Parse(format!("results body is not valid UTF-8: {e}")))?;
        if content_type.starts_with(SPARQL_RESULTS_JSON) {
            Self::from_json(text)
        } else if content_type.starts_with(SPARQL_RESULTS_XML) {
            Self::from_xml(text)
        } else {
            Err(ClientError::Parse(format!(
                "unsupported SPARQL results content type: {content_type}"
            )))
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The binding of `variable` in row `row`, if any.
    pub fn get(&self, row: usize, variable: &str) -> Option<&RdfTerm> {
        self.rows.get(row)?.get(variable)
    }

    /// The ASK result, when this is a boolean result set.
    pub fn boolean(&self) -> Option<bool> {
        self.boolean
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn from_json(text: &str) -> Result<Self> {
        let parsed: JsonResults = serde_json::from_str(text)
            .map_err(|e| ClientError::Parse(format!("invalid SPARQL results JSON: {e}")))?;

        if let Some(boolean) = parsed.boolean {
            return Ok(Self {
                variables: parsed.head.vars,
                rows: Vec::new(),
                boolean: Some(boolean),
            });
        }

        let bindings = parsed
            .results
            .ok_or_else(|| {
                ClientError::Parse("results JSON has neither `results` nor `boolean`".into())
            })?
            .bindings;

        debug!("parsed {} solution rows", bindings.len());

        let rows = bindings
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(variable, term)| (variable, term.into_term()))
                    .collect()
            })
            .collect();

        Ok(Self {
            variables: parsed.head.vars,
            rows,
            boolean: None,
        })
    }

    fn from_xml(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);

        let mut variables: Vec<String> = Vec::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut current_row: Option<Row> = None;
        let mut binding_name: Option<String> = None;
        let mut term_kind: Option<XmlTermKind> = None;
        let mut text_buf = String::new();
        let mut in_boolean = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.local_name().as_ref() {
                        b"variable" => {
                            for attr in e.attributes().flatten() {
                                if attr.key.local_name().as_ref() == b"name" {
                                    variables.push(String::from_utf8_lossy(&attr.value).into_owned());
                                }
                            }
                        }
                        b"result" => current_row = Some(Row::new()),
                        b"binding" => {
                            for attr in e.attributes().flatten() {
                                if attr.key.local_name().as_ref() == b"name" {
                                    binding_name =
                                        Some(String::from_utf8_lossy(&attr.value).into_owned());
                                }
                            }
                        }
                        b"uri" => {
                            term_kind = Some(XmlTermKind::Uri);
                            text_buf.clear();
                        }
                        b"bnode" => {
                            term_kind = Some(XmlTermKind::Bnode);
                            text_buf.clear();
                        }
                        b"literal" => {
                            let mut datatype = None;
                            let mut language = None;
                            for attr in e.attributes().flatten() {
                                if attr.key.local_name().as_ref() == b"datatype" {
                                    datatype =
                                        Some(String::from_utf8_lossy(&attr.value).into_owned());
                                } else if attr.key.0 == b"xml:lang" {
                                    language =
                                        Some(String::from_utf8_lossy(&attr.value).into_owned());
                                }
                            }
                            term_kind = Some(XmlTermKind::Literal { datatype, language });
                            text_buf.clear();
                        }
                        b"boolean" => {
                            in_boolean = true;
                            text_buf.clear();
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"result" => {
                        if let Some(row) = current_row.take() {
                            rows.push(row);
                        }
                    }
                    b"binding" => binding_name = None,
                    b"uri" | b"bnode" | b"literal" => {
                        if let (Some(kind), Some(name), Some(row)) =
                            (term_kind.take(), binding_name.as_ref(), current_row.as_mut())
                        {
                            row.insert(name.clone(), kind.into_term(text_buf.clone()));
                        }
                    }
                    b"boolean" => {
                        let value = text_buf.trim();
                        return Ok(Self {
                            variables,
                            rows: Vec::new(),
                            boolean: Some(value == "true" || value == "1"),
                        });
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if term_kind.is_some() || in_boolean {
                        let unescaped = e.unescape().map_err(|err| {
                            ClientError::Parse(format!("invalid XML text content: {err}"))
                        })?;
                        text_buf.push_str(&unescaped);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ClientError::Parse(format!(
                        "invalid SPARQL results XML: {e}"
                    )))
                }
                _ => {}
            }
        }

        Ok(Self {
            variables,
            rows,
            boolean: None,
        })
    }
}

#[derive(Clone)]
enum XmlTermKind {
    Uri,
    Bnode,
    Literal {
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl XmlTermKind {
    fn into_term(self, value: String) -> RdfTerm {
        match self {
            XmlTermKind::Uri => RdfTerm::Iri(value),
            XmlTermKind::Bnode => RdfTerm::BlankNode(value),
            XmlTermKind::Literal { datatype, language } => RdfTerm::Literal {
                value,
                datatype,
                language,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonResults {
    #[serde(default)]
    head: JsonHead,
    #[serde(default)]
    results: Option<JsonBindings>,
    #[serde(default)]
    boolean: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct JsonHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JsonBindings {
    #[serde(default)]
    bindings: Vec<HashMap<String, JsonTerm>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonTerm {
    Uri {
        value: String,
    },
    Bnode {
        value: String,
    },
    Literal {
        value: String,
        #[serde(default)]
        datatype: Option<String>,
        #[serde(default, rename = "xml:lang")]
        lang: Option<String>,
    },
    // Legacy alias some stores still emit.
    #[serde(rename = "typed-literal")]
    TypedLiteral {
        value: String,
        #[serde(default)]
        datatype: Option<String>,
    },
}

impl JsonTerm {
    fn into_term(self) -> RdfTerm {
        match self {
            JsonTerm::Uri { value } => RdfTerm::Iri(value),
            JsonTerm::Bnode { value } => RdfTerm::BlankNode(value),
            JsonTerm::Literal {
                value,
                datatype,
                lang,
            } => RdfTerm::Literal {
                value,
                datatype,
                language: lang,
            },
            JsonTerm::TypedLiteral { value, datatype } => RdfTerm::Literal {
                value,
                datatype,
                language: None,
            },
        }
    }
}
