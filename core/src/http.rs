//! HTTP transport types and the pluggable `Transport` seam.
//!
//! # Design
//! Requests and responses are described as plain data so the client core
//! never depends on a particular HTTP stack. A `Transport` executes one
//! `HttpRequest` and hands back an `HttpResponse` whose body is still a
//! stream; the client decides whether to decode, read or discard it.
//!
//! `ResponseBody` drains whatever is left of its reader when dropped. Every
//! exit path of the client (success, decode failure, API error) therefore
//! returns the underlying connection to the transport's pool.

use std::fmt;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound request payload.
pub enum RequestBody {
    /// An already-encoded JSON document.
    Json(Vec<u8>),
    /// Plain text streamed to the server verbatim.
    Text(Box<dyn Read>),
}

impl RequestBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Text(_) => "text/plain",
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Json(bytes) => f
                .debug_tuple("Json")
                .field(&String::from_utf8_lossy(bytes))
                .finish(),
            RequestBody::Text(_) => f.write_str("Text(<stream>)"),
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the encoded query string.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Streaming response body that releases its reader on every exit path.
pub struct ResponseBody {
    reader: Option<Box<dyn Read>>,
}

impl ResponseBody {
    pub fn new(reader: impl Read + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
        }
    }

    pub fn empty() -> Self {
        Self { reader: None }
    }

    pub fn read_to_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn read_to_string(mut self) -> io::Result<String> {
        let mut buf = String::new();
        Read::read_to_string(&mut self, &mut buf)?;
        Ok(buf)
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            let _ = io::copy(&mut reader, &mut io::sink());
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseBody(<stream>)")
    }
}

impl From<String> for ResponseBody {
    fn from(body: String) -> Self {
        Self::new(Cursor::new(body.into_bytes()))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(body: &'static str) -> Self {
        Self::new(Cursor::new(body.as_bytes()))
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(body: Vec<u8>) -> Self {
        Self::new(Cursor::new(body))
    }
}

/// An HTTP response whose body has not been read yet.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. `Not Found`. May be empty.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status line text such as `404 Not Found`.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Error raised by a transport before any response was obtained.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Executes exactly one HTTP request.
///
/// Implementations own timeouts, TLS and connection pooling. They must not
/// treat non-2xx statuses as errors; status interpretation belongs to the
/// client.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
