//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::Mutex;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, ResponseBody, Transport, TransportError};

/// A response queued on `RecordingTransport`.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Canned {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }
}

/// A request as seen by `RecordingTransport`, with the body read to text.
#[derive(Debug, Clone)]
pub struct Sent {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Sent {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_str(self.body.as_deref().expect("request has no body")).unwrap()
    }
}

/// Records every request and answers from a queue of canned responses.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, canned: Canned) -> Self {
        self.responses.lock().unwrap().push_back(canned);
        self
    }

    pub fn requests(&self) -> Vec<Sent> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = match request.body {
            Some(RequestBody::Json(bytes)) => Some(String::from_utf8(bytes)?),
            Some(RequestBody::Text(mut reader)) => {
                let mut text = String::new();
                reader.read_to_string(&mut text)?;
                Some(text)
            }
            None => None,
        };
        self.requests.lock().unwrap().push(Sent {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body,
        });

        let canned = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or("no canned response left")?;
        Ok(HttpResponse {
            status: canned.status,
            reason: reason(canned.status).to_string(),
            headers: vec![("Content-Type".to_string(), canned.content_type.to_string())],
            body: ResponseBody::from(canned.body),
        })
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}
