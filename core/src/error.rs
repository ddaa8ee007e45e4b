//! Error types for the DNS API client.
//!
//! # Design
//! Every non-2xx response is normalized into `ApiError::Api` carrying the
//! numeric status and a message. The message defaults to the status line
//! (`404 Not Found`) and is replaced by the `error` string of a JSON body when
//! the server sends one. Reading that body is best-effort: an unreadable or
//! non-JSON body never masks the status.

use tracing::warn;

use crate::http::{HttpResponse, TransportError};

/// Errors returned by `Client` operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The transport failed before a response was obtained.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// The server answered with a status outside 200..300.
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    /// A 2xx body did not match the expected JSON shape.
    #[error("failed to decode response body: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// A 2xx body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] std::io::Error),
}

impl ApiError {
    /// Normalize a non-2xx response, consuming and releasing its body.
    pub fn from_response(response: HttpResponse) -> Self {
        let status = response.status;
        let mut message = response.status_line();

        match response.body.read_to_bytes() {
            Ok(body) => {
                if let Some(vendor) = vendor_message(&body) {
                    message = vendor;
                }
            }
            Err(err) => warn!(status, error = %err, "could not read error response body"),
        }

        ApiError::Api { status, message }
    }

    /// HTTP status for `Api` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn vendor_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("error")?.as_str().map(str::to_owned)
}
