//! The description of one API call, passed by value into `Client::execute`.

use std::borrow::Cow;
use std::io::Read;

use serde::Serialize;

use crate::http::{HttpMethod, HttpRequest, RequestBody};
use crate::query::QueryParams;

/// Percent-encode one path segment such as a zone or record id.
pub(crate) fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Header carrying the API token on every request.
pub const AUTH_HEADER: &str = "Auth-API-Token";

/// Response encoding asked for through the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Json,
    Text,
}

impl Accept {
    pub fn mime(&self) -> &'static str {
        match self {
            Accept::Json => "application/json",
            Accept::Text => "text/plain",
        }
    }
}

/// One API call: method, path relative to the base URL, query, body and the
/// desired response encoding.
#[derive(Debug)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    query: QueryParams,
    body: Option<RequestBody>,
    accept: Option<Accept>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: None,
            accept: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn query(mut self, params: QueryParams) -> Self {
        self.query.extend(params);
        self
    }

    /// Serialize `body` as the JSON request payload.
    ///
    /// # Panics
    /// Panics if `body` cannot be serialized. Request shapes are plain data,
    /// so a failure here is a bug in the caller's types.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        let encoded = serde_json::to_vec(body).expect("request body must serialize to JSON");
        self.body = Some(RequestBody::Json(encoded));
        self
    }

    /// Stream `body` verbatim as a `text/plain` payload.
    pub fn text(mut self, body: impl Read + 'static) -> Self {
        self.body = Some(RequestBody::Text(Box::new(body)));
        self
    }

    pub fn accept(mut self, accept: Accept) -> Self {
        self.accept = Some(accept);
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn into_http(self, base_url: &str, token: &str) -> HttpRequest {
        let mut url = format!("{}/{}", base_url, self.path.trim_start_matches('/'));
        self.query.append_to(&mut url);

        let mut headers = vec![(AUTH_HEADER.to_string(), token.to_string())];
        if let Some(accept) = self.accept {
            headers.push(("Accept".to_string(), accept.mime().to_string()));
        }
        if let Some(body) = &self.body {
            headers.push(("Content-Type".to_string(), body.content_type().to_string()));
        }

        HttpRequest {
            method: self.method,
            url,
            headers,
            body: self.body,
        }
    }
}
