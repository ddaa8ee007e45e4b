//! Blocking client for the Hetzner DNS zone and record API.
//!
//! # Overview
//! Every operation builds an `ApiRequest`, dispatches it through a pluggable
//! `Transport`, normalizes non-2xx statuses into `ApiError::Api` and decodes
//! the body into a typed result (JSON), a `String` (zone files) or nothing.
//!
//! # Design
//! - `Client` is stateless apart from the token, base URL and transport
//!   captured at construction; it is safe to share across threads.
//! - The transport is a trait so tests and callers can substitute their own
//!   HTTP stack. `UreqTransport` is the default (cargo feature `ureq`).
//! - Response bodies are streams that drain themselves on drop, so no exit
//!   path leaks a pooled connection.
//! - Timestamps use the API's own text layout; see `timestamp`.
//!
//! ```no_run
//! use hetzner_dns::{Client, ClientConfig, ListZonesRequest};
//!
//! let client = Client::new(ClientConfig::new("token"));
//! let zones = client.list_zones(&ListZonesRequest::default())?;
//! # Ok::<(), hetzner_dns::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod pagination;
pub mod query;
pub mod records;
pub mod request;
pub mod timestamp;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod zones;

#[cfg(test)]
mod testing;

pub use client::{Client, ClientConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, ResponseBody, Transport, TransportError};
pub use pagination::{PageMetadata, PageRequest, PagedMetadata};
pub use query::QueryParams;
pub use records::{
    BulkCreateResponse, BulkUpdateRecord, BulkUpdateResponse, ListRecordsRequest, Record, RecordList, RecordType,
    WriteRecord,
};
pub use request::{Accept, ApiRequest, AUTH_HEADER};
pub use timestamp::{Timestamp, TimestampError};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use zones::{ListZonesRequest, TxtVerification, ValidateZoneResponse, WriteZone, Zone, ZoneList, ZoneStatus};
