//! Client configuration and the request execution pipeline.
//!
//! # Design
//! `Client` holds only the API token, the base URL and a transport, none of
//! which change after construction, so one client can serve concurrent
//! callers. Every resource operation builds an `ApiRequest` and hands it to
//! one of the `execute_*` adapters, which all funnel through `execute`:
//! attach auth, dispatch, normalize non-2xx statuses. Nothing is retried.

use std::fmt;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpResponse, Transport};
use crate::request::{Accept, ApiRequest};

/// Production endpoint of the DNS API.
pub const DEFAULT_BASE_URL: &str = "https://dns.hetzner.com/api/v1";

/// Settings captured at client construction.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_token: String,
    /// Overrides `DEFAULT_BASE_URL`, e.g. for a test server.
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Blocking client for the zone and record API.
#[derive(Clone)]
pub struct Client<T> {
    token: String,
    base_url: String,
    transport: T,
}

#[cfg(feature = "ureq")]
impl Client<crate::transport::UreqTransport> {
    /// Client over the default `ureq` transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, crate::transport::UreqTransport::new())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let base_url = config
            .base_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            token: config.api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch `request` and return the raw 2xx response.
    ///
    /// Non-2xx responses are normalized into `ApiError::Api` and their bodies
    /// released before returning.
    pub fn execute(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method(), path = request.path(), "dispatching request");
        let request = request.into_http(&self.base_url, &self.token);

        let response = self.transport.execute(request).map_err(ApiError::Transport)?;
        debug!(status = response.status, "received response");

        if !response.is_success() {
            let err = ApiError::from_response(response);
            warn!(error = %err, "API request failed");
            return Err(err);
        }
        Ok(response)
    }

    /// Execute and decode a JSON body into `R`.
    pub fn execute_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let response = self.execute(request.accept(Accept::Json))?;
        let body = response.body.read_to_bytes().map_err(ApiError::Body)?;
        serde_json::from_slice(&body).map_err(ApiError::Deserialization)
    }

    /// Execute and return the body as text.
    pub fn execute_text(&self, request: ApiRequest) -> Result<String, ApiError> {
        let response = self.execute(request.accept(Accept::Text))?;
        response.body.read_to_string().map_err(ApiError::Body)
    }

    /// Execute and discard whatever body the server sends.
    pub fn execute_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(request).map(drop)
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
