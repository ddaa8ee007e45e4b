//! Verify every client operation against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector names an operation and its input, the exact request the client
//! must emit, a simulated server response, and either the decoded result or
//! the normalized error. Results are compared as typed values so field order
//! and timestamp spelling in the fixtures do not matter.

use std::fmt::Debug;
use std::io::{Cursor, Read};
use std::sync::Mutex;

use hetzner_dns::{
    ApiError, BulkUpdateRecord, Client, ClientConfig, HttpRequest, HttpResponse, ListRecordsRequest, ListZonesRequest,
    PageRequest, RequestBody, ResponseBody, Transport, TransportError, WriteRecord, WriteZone,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "https://dns.hetzner.test/api/v1";
const TOKEN: &str = "vector-token";

/// Request as seen on the wire, with any body read out.
#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

/// Serves one simulated response and remembers the request that asked for it.
struct VectorTransport {
    status: u16,
    reason: String,
    body: String,
    captured: Mutex<Option<Captured>>,
}

impl VectorTransport {
    fn new(simulated: &Value) -> Self {
        let body = match &simulated["body"] {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            json => json.to_string(),
        };
        Self {
            status: simulated["status"].as_u64().unwrap() as u16,
            reason: simulated["reason"].as_str().unwrap_or_default().to_string(),
            body,
            captured: Mutex::new(None),
        }
    }

    fn take(&self) -> Captured {
        self.captured.lock().unwrap().take().expect("no request was sent")
    }
}

impl Transport for VectorTransport {
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
        *self.captured.lock().unwrap() = Some(Captured {
            method: request.method.to_string(),
            url: request.url,
            headers: request.headers,
            body,
        });
        Ok(HttpResponse {
            status: self.status,
            reason: self.reason.clone(),
            headers: Vec::new(),
            body: ResponseBody::from(self.body.clone()),
        })
    }
}

fn str_field(input: &Value, key: &str) -> String {
    input[key]
        .as_str()
        .unwrap_or_else(|| panic!("input.{key} must be a string"))
        .to_string()
}

fn opt_str(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

fn typed<T: DeserializeOwned>(value: &Value) -> T {
    serde_json::from_value(value.clone()).unwrap()
}

/// Compare an operation's outcome with `expected_result` or `expected_error`.
fn check<R: DeserializeOwned + PartialEq + Debug>(name: &str, case: &Value, result: Result<R, ApiError>) {
    if let Some(expected) = case.get("expected_error") {
        match result {
            Err(ApiError::Api { status, message }) => {
                assert_eq!(u64::from(status), expected["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(message, expected["message"].as_str().unwrap(), "{name}: message");
            }
            Err(other) => panic!("{name}: expected API error, got {other:?}"),
            Ok(value) => panic!("{name}: expected API error, got {value:?}"),
        }
    } else {
        let value = result.unwrap_or_else(|err| panic!("{name}: unexpected error: {err}"));
        let expected: R = typed(&case["expected_result"]);
        assert_eq!(value, expected, "{name}: result");
    }
}

fn run_operation(client: &Client<&VectorTransport>, name: &str, case: &Value) {
    let input = &case["input"];
    match case["operation"].as_str().unwrap() {
        "list_zones" => {
            let request = ListZonesRequest {
                page: PageRequest::new(
                    input["page"].as_u64().unwrap_or(0) as u32,
                    input["per_page"].as_u64().unwrap_or(0) as u32,
                ),
                name: opt_str(input, "name"),
                search_name: opt_str(input, "search_name"),
            };
            check(name, case, client.list_zones(&request));
        }
        "create_zone" => check(name, case, client.create_zone(&typed::<WriteZone>(&input["zone"]))),
        "get_zone" => check(name, case, client.get_zone(&str_field(input, "id"))),
        "update_zone" => check(
            name,
            case,
            client.update_zone(&str_field(input, "id"), &typed::<WriteZone>(&input["zone"])),
        ),
        "delete_zone" => check(name, case, client.delete_zone(&str_field(input, "id"))),
        "import_zone" => check(
            name,
            case,
            client.import_zone(&str_field(input, "id"), Cursor::new(str_field(input, "zone_file"))),
        ),
        "export_zone" => check(name, case, client.export_zone(&str_field(input, "id"))),
        "validate_zone_file" => check(
            name,
            case,
            client.validate_zone_file(Cursor::new(str_field(input, "zone_file"))),
        ),
        "list_records" => {
            let request = ListRecordsRequest {
                zone_id: opt_str(input, "zone_id"),
            };
            check(name, case, client.list_records(&request));
        }
        "create_record" => check(name, case, client.create_record(&typed::<WriteRecord>(&input["record"]))),
        "get_record" => check(name, case, client.get_record(&str_field(input, "id"))),
        "update_record" => check(
            name,
            case,
            client.update_record(&str_field(input, "id"), &typed::<WriteRecord>(&input["record"])),
        ),
        "delete_record" => check(name, case, client.delete_record(&str_field(input, "id"))),
        "create_records" => check(
            name,
            case,
            client.create_records(&typed::<Vec<WriteRecord>>(&input["records"])),
        ),
        "update_records" => check(
            name,
            case,
            client.update_records(&typed::<Vec<BulkUpdateRecord>>(&input["records"])),
        ),
        other => panic!("{name}: unknown operation {other}"),
    }
}

fn verify_request(name: &str, sent: &Captured, expected: &Value) {
    assert_eq!(sent.method, expected["method"].as_str().unwrap(), "{name}: method");
    assert_eq!(
        sent.url,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: url"
    );

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(sent.headers, expected_headers, "{name}: headers");

    if let Some(body) = expected.get("body") {
        let sent_body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(&sent_body, body, "{name}: body");
    } else if let Some(text) = expected.get("body_text") {
        assert_eq!(sent.body.as_deref(), text.as_str(), "{name}: body text");
    } else {
        assert!(sent.body.is_none(), "{name}: body should be None");
    }
}

fn run_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = VectorTransport::new(&case["simulated_response"]);
        let client = Client::with_transport(ClientConfig::new(TOKEN).base_url(BASE_URL), &transport);

        run_operation(&client, name, case);
        verify_request(name, &transport.take(), &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

#[test]
fn zone_test_vectors() {
    run_vectors(include_str!("../../test-vectors/zones.json"));
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[test]
fn record_test_vectors() {
    run_vectors(include_str!("../../test-vectors/records.json"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn error_test_vectors() {
    run_vectors(include_str!("../../test-vectors/errors.json"));
}
