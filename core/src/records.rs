//! Record resources, the record endpoints and bulk operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::ApiError;
use crate::http::Transport;
use crate::query::QueryParams;
use crate::request::{segment, ApiRequest};
use crate::timestamp::{self, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Ptr,
    Ns,
    Mx,
    Cname,
    Rp,
    Txt,
    Soa,
    Hinfo,
    Srv,
    Dane,
    Tlsa,
    Ds,
    Caa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Ptr => "PTR",
            RecordType::Ns => "NS",
            RecordType::Mx => "MX",
            RecordType::Cname => "CNAME",
            RecordType::Rp => "RP",
            RecordType::Txt => "TXT",
            RecordType::Soa => "SOA",
            RecordType::Hinfo => "HINFO",
            RecordType::Srv => "SRV",
            RecordType::Dane => "DANE",
            RecordType::Tlsa => "TLSA",
            RecordType::Ds => "DS",
            RecordType::Caa => "CAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource record as returned by the API.
///
/// Records echoed back from validation or failed bulk writes carry no id or
/// timestamps; those fields then stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, with = "timestamp::option")]
    pub created: Option<Timestamp>,
    #[serde(default, with = "timestamp::option")]
    pub modified: Option<Timestamp>,
    #[serde(default)]
    pub zone_id: String,
    pub value: String,
    #[serde(default)]
    pub ttl: u64,
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRecordsRequest {
    pub zone_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordList {
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Server-mutable record fields. A `None` TTL falls back to the zone default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: String,
    pub zone_id: String,
}

/// Outcome of `Client::create_records`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    /// Records as submitted and created.
    #[serde(default, alias = "record")]
    pub records: Vec<Record>,
    #[serde(default)]
    pub valid_records: Vec<Record>,
    #[serde(default)]
    pub invalid_records: Vec<Record>,
}

/// One entry of a bulk update: the target id plus the new field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateRecord {
    pub id: String,
    #[serde(flatten)]
    pub record: WriteRecord,
}

/// Outcome of `Client::update_records`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub failed_records: Vec<Record>,
}

#[derive(Serialize)]
struct BulkBody<'a, R> {
    records: &'a [R],
}

#[derive(Deserialize)]
struct RecordEnvelope {
    record: Record,
}

impl<T: Transport> Client<T> {
    pub fn list_records(&self, request: &ListRecordsRequest) -> Result<RecordList, ApiError> {
        let mut query = QueryParams::new();
        query.add_non_empty("zone_id", request.zone_id.as_deref());
        self.execute_json(ApiRequest::get("records").query(query))
    }

    pub fn create_record(&self, record: &WriteRecord) -> Result<Record, ApiError> {
        self.execute_json::<RecordEnvelope>(ApiRequest::post("records").json(record))
            .map(|envelope| envelope.record)
    }

    pub fn get_record(&self, id: &str) -> Result<Record, ApiError> {
        self.execute_json::<RecordEnvelope>(ApiRequest::get(format!("records/{}", segment(id))))
            .map(|envelope| envelope.record)
    }

    pub fn update_record(&self, id: &str, record: &WriteRecord) -> Result<Record, ApiError> {
        self.execute_json::<RecordEnvelope>(ApiRequest::patch(format!("records/{}", segment(id))).json(record))
            .map(|envelope| envelope.record)
    }

    pub fn delete_record(&self, id: &str) -> Result<(), ApiError> {
        self.execute_empty(ApiRequest::delete(format!("records/{}", segment(id))))
    }

    pub fn create_records(&self, records: &[WriteRecord]) -> Result<BulkCreateResponse, ApiError> {
        self.execute_json(ApiRequest::post("records/bulk").json(&BulkBody { records }))
    }

    pub fn update_records(&self, records: &[BulkUpdateRecord]) -> Result<BulkUpdateResponse, ApiError> {
        self.execute_json(ApiRequest::put("records/bulk").json(&BulkBody { records }))
    }
}
