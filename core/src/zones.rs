//! Zone resources and the zone endpoints.

use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};

use crate::client::Client;
use crate::error::ApiError;
use crate::http::Transport;
use crate::pagination::{PageRequest, PagedMetadata};
use crate::query::QueryParams;
use crate::records::Record;
use crate::request::{segment, ApiRequest};
use crate::timestamp::{self, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    Pending,
    Verified,
    Failed,
}

/// TXT record the provider expects before it marks a zone verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtVerification {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default, with = "timestamp::option")]
    pub created: Option<Timestamp>,
    #[serde(default, with = "timestamp::option")]
    pub modified: Option<Timestamp>,
    #[serde(default)]
    pub legacy_dns_host: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub legacy_ns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ns: Vec<String>,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub permission: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub records_count: u64,
    #[serde(default)]
    pub registrar: String,
    pub status: ZoneStatus,
    #[serde(default)]
    pub ttl: u64,
    /// When verification completed. Never the zero instant.
    #[serde(
        default,
        deserialize_with = "verified_at",
        serialize_with = "timestamp::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub verified: Option<Timestamp>,
    #[serde(default)]
    pub is_secondary_dns: bool,
    #[serde(default)]
    pub txt_verification: TxtVerification,
}

/// A zero verification instant means the zone was never verified.
fn verified_at<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Timestamp>, D::Error> {
    Ok(timestamp::option::deserialize(deserializer)?.filter(|ts| !timestamp::is_zero(ts)))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Filters for `Client::list_zones`. Empty strings and zero pages are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListZonesRequest {
    pub page: PageRequest,
    pub name: Option<String>,
    pub search_name: Option<String>,
}

impl ListZonesRequest {
    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.add_non_empty("name", self.name.as_deref());
        query.add_non_empty("search_name", self.search_name.as_deref());
        self.page.add_to(&mut query);
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneList {
    #[serde(default)]
    pub meta: PagedMetadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zones: Vec<Zone>,
}

/// Server-mutable zone fields. A `None` TTL leaves the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteZone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

/// Result of checking a zone file without importing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateZoneResponse {
    pub parsed_records: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valid_records: Vec<Record>,
}

#[derive(Deserialize)]
struct ZoneEnvelope {
    zone: Zone,
}

impl<T: Transport> Client<T> {
    pub fn list_zones(&self, request: &ListZonesRequest) -> Result<ZoneList, ApiError> {
        self.execute_json(ApiRequest::get("zones").query(request.query()))
    }

    pub fn create_zone(&self, zone: &WriteZone) -> Result<Zone, ApiError> {
        self.execute_json::<ZoneEnvelope>(ApiRequest::post("zones").json(zone))
            .map(|envelope| envelope.zone)
    }

    pub fn get_zone(&self, id: &str) -> Result<Zone, ApiError> {
        self.execute_json::<ZoneEnvelope>(ApiRequest::get(format!("zones/{}", segment(id))))
            .map(|envelope| envelope.zone)
    }

    pub fn update_zone(&self, id: &str, zone: &WriteZone) -> Result<Zone, ApiError> {
        self.execute_json::<ZoneEnvelope>(ApiRequest::patch(format!("zones/{}", segment(id))).json(zone))
            .map(|envelope| envelope.zone)
    }

    pub fn delete_zone(&self, id: &str) -> Result<(), ApiError> {
        self.execute_empty(ApiRequest::delete(format!("zones/{}", segment(id))))
    }

    /// Replace the zone's records with those in `zone_file`.
    pub fn import_zone(&self, id: &str, zone_file: impl Read + 'static) -> Result<Zone, ApiError> {
        self.execute_json::<ZoneEnvelope>(ApiRequest::post(format!("zones/{}/import", segment(id))).text(zone_file))
            .map(|envelope| envelope.zone)
    }

    pub fn export_zone(&self, id: &str) -> Result<String, ApiError> {
        self.execute_text(ApiRequest::get(format!("zones/{}/export", segment(id))))
    }

    pub fn validate_zone_file(&self, zone_file: impl Read + 'static) -> Result<ValidateZoneResponse, ApiError> {
        self.execute_json(ApiRequest::post("zones/file/validate").text(zone_file))
    }
}
