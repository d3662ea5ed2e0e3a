//! Blocking `reqwest` transport adapter (execute-style shape)

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use super::{BackendConfig, BackendRequest, BackendResponse, HttpBackend};
use crate::{ClientError, Result};

/// Adapter over [`reqwest::blocking::Client`]: a single synchronous
/// execute-style call per exchange.
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    /// Build the adapter. Automatic redirect following is disabled: the
    /// protocol client owns redirect policy, including loop detection.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(Policy::none())
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpBackend for ReqwestBackend {
    fn execute(&self, request: &BackendRequest) -> Result<BackendResponse> {
        debug!(method = %request.method, uri = %request.uri, "executing via reqwest");

        let mut builder = self
            .client
            .request(request.method.clone(), request.uri.as_str())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().map_err(|e| {
            ClientError::Transport(format!("request to {} failed: {e}", request.uri))
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(|e| {
            ClientError::Transport(format!("failed to read response body: {e}"))
        })?;

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }
}
