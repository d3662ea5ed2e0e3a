//! libcurl transport adapter (configure-then-send shape)

use curl::easy::{Easy, List};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tracing::debug;

use super::{BackendConfig, BackendRequest, BackendResponse, HttpBackend};
use crate::{ClientError, Result};

/// Adapter over [`curl::easy::Easy`]: the handle is configured one setting
/// at a time (URL, method, headers, body, callbacks) and then triggered
/// with a bare `perform()`. A fresh handle is created per exchange.
pub struct CurlBackend {
    config: BackendConfig,
}

impl CurlBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

fn transport(e: curl::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

impl HttpBackend for CurlBackend {
    fn execute(&self, request: &BackendRequest) -> Result<BackendResponse> {
        debug!(method = %request.method, uri = %request.uri, "executing via curl");

        let mut easy = Easy::new();
        easy.url(&request.uri).map_err(transport)?;
        easy.timeout(self.config.timeout).map_err(transport)?;
        easy.useragent(&self.config.user_agent).map_err(transport)?;
        easy.follow_location(false).map_err(transport)?;

        if request.method == Method::POST {
            easy.post(true).map_err(transport)?;
            if let Some(body) = &request.body {
                easy.post_fields_copy(body).map_err(transport)?;
            }
        } else {
            easy.get(true).map_err(transport)?;
        }

        let mut header_list = List::new();
        for (name, value) in request.headers.iter() {
            let value = value.to_str().map_err(|e| {
                ClientError::Transport(format!("non-ASCII header value for {name}: {e}"))
            })?;
            header_list
                .append(&format!("{}: {}", name.as_str(), value))
                .map_err(transport)?;
        }
        easy.http_headers(header_list).map_err(transport)?;

        let mut body_buf: Vec<u8> = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body_buf.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer
                .header_function(|line| {
                    header_lines.push(String::from_utf8_lossy(line).into_owned());
                    true
                })
                .map_err(transport)?;
            transfer.perform().map_err(transport)?;
        }

        let code = easy.response_code().map_err(transport)? as u16;
        let status = StatusCode::from_u16(code).map_err(|e| {
            ClientError::Transport(format!("invalid response status {code}: {e}"))
        })?;

        let mut headers = HeaderMap::new();
        for line in &header_lines {
            if let Some((name, value)) = line.split_once(':') {
                if let (Ok(name), Ok(value)) = (
                    HeaderName::from_bytes(name.trim().as_bytes()),
                    HeaderValue::from_str(value.trim()),
                ) {
                    headers.append(name, value);
                }
            }
        }

        Ok(BackendResponse {
            status,
            headers,
            body: body_buf.into(),
        })
    }
}
