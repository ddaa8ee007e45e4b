//! In-memory stand-in for the DNS zone and record API.
//!
//! Serves the same routes under `/api/v1`, enforces the `Auth-API-Token`
//! header and emits timestamps in the API's text layout. DTOs here are
//! defined independently of the client crate so integration tests catch
//! schema drift.

pub mod zonefile;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

use zonefile::Entry;

pub const API_PREFIX: &str = "/api/v1";
pub const AUTH_HEADER: &str = "Auth-API-Token";
pub const DEFAULT_ZONE_TTL: u64 = 86400;
const DEFAULT_PER_PAGE: usize = 100;
const NAMESERVERS: [&str; 3] = ["hydrogen.ns.hetzner.com", "oxygen.ns.hetzner.com", "helium.ns.hetzner.de"];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TxtVerification {
    pub name: String,
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub created: String,
    pub modified: String,
    pub legacy_dns_host: String,
    pub legacy_ns: Vec<String>,
    pub ns: Vec<String>,
    pub owner: String,
    pub paused: bool,
    pub permission: String,
    pub project: String,
    pub records_count: u64,
    pub registrar: String,
    pub status: String,
    pub ttl: u64,
    pub verified: String,
    pub is_secondary_dns: bool,
    pub txt_verification: TxtVerification,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub created: String,
    pub modified: String,
    pub zone_id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(rename = "type")]
    pub record_type: String,
}

#[derive(Debug, Deserialize)]
pub struct WriteZone {
    #[serde(default)]
    pub name: String,
    pub ttl: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WriteRecord {
    #[serde(default)]
    pub name: String,
    pub ttl: Option<u64>,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub zone_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateEntry {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub record: WriteRecord,
}

#[derive(Debug, Deserialize)]
struct BulkBody<T> {
    records: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ZoneQuery {
    pub name: Option<String>,
    pub search_name: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    pub zone_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    zones: HashMap<String, Zone>,
    records: HashMap<String, Record>,
}

impl Store {
    fn zone_view(&self, zone: &Zone) -> Zone {
        let mut view = zone.clone();
        view.records_count = self.records.values().filter(|r| r.zone_id == zone.id).count() as u64;
        view
    }

    fn zone_records(&self, zone_id: &str) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .records
            .values()
            .filter(|r| r.zone_id == zone_id)
            .cloned()
            .collect();
        sort_records(&mut records);
        records
    }

    fn check_record(&self, record: &WriteRecord) -> Result<(), String> {
        if !self.zones.contains_key(&record.zone_id) {
            return Err("invalid zone_id".to_string());
        }
        if record.name.is_empty() {
            return Err("record name is required".to_string());
        }
        if !zonefile::RECORD_TYPES.contains(&record.record_type.as_str()) {
            return Err(format!("unsupported record type {:?}", record.record_type));
        }
        if record.value.is_empty() {
            return Err("record value is required".to_string());
        }
        Ok(())
    }

    fn insert_record(&mut self, write: &WriteRecord) -> Record {
        let ts = now();
        let record = Record {
            id: new_id(),
            name: write.name.clone(),
            created: ts.clone(),
            modified: ts,
            zone_id: write.zone_id.clone(),
            value: write.value.clone(),
            ttl: write.ttl,
            record_type: write.record_type.clone(),
        };
        self.records.insert(record.id.clone(), record.clone());
        record
    }

    fn overwrite_record(&mut self, id: &str, write: &WriteRecord) -> Option<Record> {
        let record = self.records.get_mut(id)?;
        record.name = write.name.clone();
        record.ttl = write.ttl;
        record.record_type = write.record_type.clone();
        record.value = write.value.clone();
        record.zone_id = write.zone_id.clone();
        record.modified = now();
        Some(record.clone())
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    db: Db,
}

/// Failure answered with `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiFailure {
    Unauthorized,
    NotFound(&'static str),
    Unprocessable(String),
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiFailure::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid token".to_string()),
            ApiFailure::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiFailure::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiFailure>;

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db: Arc::new(RwLock::new(Store::default())),
    };

    let api = Router::new()
        .route("/zones", get(list_zones).post(create_zone))
        .route("/zones/file/validate", post(validate_zone_file))
        .route("/zones/{id}", get(get_zone).patch(update_zone).delete(delete_zone))
        .route("/zones/{id}/import", post(import_zone))
        .route("/zones/{id}/export", get(export_zone))
        .route("/records", get(list_records).post(create_record))
        .route("/records/bulk", post(create_records).put(update_records))
        .route("/records/{id}", get(get_record).patch(update_record).delete(delete_record))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state);

    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok());
    if presented != Some(&*state.token) {
        return ApiFailure::Unauthorized.into_response();
    }
    next.run(request).await
}

fn now() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f %z UTC").to_string()
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Shape a write payload as a record without server-assigned fields.
fn echo(write: &WriteRecord) -> Record {
    Record {
        id: String::new(),
        name: write.name.clone(),
        created: String::new(),
        modified: String::new(),
        zone_id: write.zone_id.clone(),
        value: write.value.clone(),
        ttl: write.ttl,
        record_type: write.record_type.clone(),
    }
}

fn entry_to_write(zone_id: &str, entry: Entry) -> WriteRecord {
    WriteRecord {
        name: entry.name,
        ttl: entry.ttl,
        record_type: entry.record_type,
        value: entry.value,
        zone_id: zone_id.to_string(),
    }
}

// --- zones ---

async fn list_zones(State(state): State<AppState>, Query(query): Query<ZoneQuery>) -> Json<Value> {
    let store = state.db.read().await;
    let mut zones: Vec<Zone> = store
        .zones
        .values()
        .filter(|z| query.name.as_deref().is_none_or(|name| z.name == name))
        .filter(|z| query.search_name.as_deref().is_none_or(|needle| z.name.contains(needle)))
        .map(|z| store.zone_view(z))
        .collect();
    zones.sort_by(|a, b| a.name.cmp(&b.name));

    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let per_page = query.per_page.filter(|p| *p > 0).unwrap_or(DEFAULT_PER_PAGE);
    let total = zones.len();
    let last_page = total.div_ceil(per_page).max(1);
    let offset = (page - 1).saturating_mul(per_page);
    let zones: Vec<Zone> = zones.into_iter().skip(offset).take(per_page).collect();

    Json(json!({
        "meta": {
            "pagination": {
                "page": page,
                "per_page": per_page,
                "last_page": last_page,
                "total_entries": total,
            }
        },
        "zones": zones,
    }))
}

async fn create_zone(
    State(state): State<AppState>,
    Json(input): Json<WriteZone>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if input.name.is_empty() {
        return Err(ApiFailure::Unprocessable("invalid zone name".to_string()));
    }
    let mut store = state.db.write().await;
    if store.zones.values().any(|z| z.name == input.name) {
        return Err(ApiFailure::Unprocessable("zone already exists".to_string()));
    }

    let ts = now();
    let zone = Zone {
        id: new_id(),
        name: input.name,
        created: ts.clone(),
        modified: ts,
        legacy_dns_host: String::new(),
        legacy_ns: Vec::new(),
        ns: NAMESERVERS.iter().map(|ns| ns.to_string()).collect(),
        owner: String::new(),
        paused: false,
        permission: String::new(),
        project: String::new(),
        records_count: 0,
        registrar: String::new(),
        status: "pending".to_string(),
        ttl: input.ttl.unwrap_or(DEFAULT_ZONE_TTL),
        verified: String::new(),
        is_secondary_dns: false,
        txt_verification: TxtVerification {
            name: "_hetzner".to_string(),
            token: new_id(),
        },
    };
    debug!(id = %zone.id, name = %zone.name, "zone created");
    store.zones.insert(zone.id.clone(), zone.clone());
    Ok((StatusCode::CREATED, Json(json!({ "zone": store.zone_view(&zone) }))))
}

async fn get_zone(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    let zone = store.zones.get(&id).ok_or(ApiFailure::NotFound("zone"))?;
    Ok(Json(json!({ "zone": store.zone_view(zone) })))
}

async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<WriteZone>,
) -> ApiResult<Json<Value>> {
    let mut store = state.db.write().await;
    let zone = store.zones.get_mut(&id).ok_or(ApiFailure::NotFound("zone"))?;
    if !input.name.is_empty() {
        zone.name = input.name;
    }
    if let Some(ttl) = input.ttl {
        zone.ttl = ttl;
    }
    zone.modified = now();
    let zone = zone.clone();
    Ok(Json(json!({ "zone": store.zone_view(&zone) })))
}

async fn delete_zone(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    store.zones.remove(&id).ok_or(ApiFailure::NotFound("zone"))?;
    store.records.retain(|_, r| r.zone_id != id);
    Ok(StatusCode::OK)
}

async fn import_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.db.write().await;
    if !store.zones.contains_key(&id) {
        return Err(ApiFailure::NotFound("zone"));
    }

    let scan = zonefile::scan(&body);
    if let Some((line, reason)) = scan.errors.first() {
        return Err(ApiFailure::Unprocessable(format!("line {line}: {reason}")));
    }

    store.records.retain(|_, r| r.zone_id != id);
    for entry in scan.valid {
        store.insert_record(&entry_to_write(&id, entry));
    }

    let zone = store.zones.get_mut(&id).ok_or(ApiFailure::NotFound("zone"))?;
    zone.modified = now();
    let zone = zone.clone();
    Ok((StatusCode::CREATED, Json(json!({ "zone": store.zone_view(&zone) }))))
}

async fn export_zone(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let store = state.db.read().await;
    let zone = store.zones.get(&id).ok_or(ApiFailure::NotFound("zone"))?;
    let entries: Vec<Entry> = store
        .zone_records(&id)
        .into_iter()
        .map(|r| Entry {
            name: r.name,
            ttl: r.ttl,
            record_type: r.record_type,
            value: r.value,
        })
        .collect();
    let text = zonefile::render(&zone.name, zone.ttl, &entries);
    Ok(([(header::CONTENT_TYPE, "text/plain")], text).into_response())
}

async fn validate_zone_file(body: String) -> Json<Value> {
    let scan = zonefile::scan(&body);
    let valid: Vec<Record> = scan
        .valid
        .into_iter()
        .map(|entry| echo(&entry_to_write("", entry)))
        .collect();
    Json(json!({
        "parsed_records": scan.parsed,
        "valid_records": valid,
    }))
}

// --- records ---

async fn list_records(State(state): State<AppState>, Query(query): Query<RecordQuery>) -> Json<Value> {
    let store = state.db.read().await;
    let mut records: Vec<Record> = store
        .records
        .values()
        .filter(|r| query.zone_id.as_deref().is_none_or(|zone_id| r.zone_id == zone_id))
        .cloned()
        .collect();
    sort_records(&mut records);
    Json(json!({ "records": records }))
}

async fn create_record(
    State(state): State<AppState>,
    Json(input): Json<WriteRecord>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.db.write().await;
    store.check_record(&input).map_err(ApiFailure::Unprocessable)?;
    let record = store.insert_record(&input);
    Ok((StatusCode::CREATED, Json(json!({ "record": record }))))
}

async fn get_record(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    let record = store.records.get(&id).ok_or(ApiFailure::NotFound("record"))?;
    Ok(Json(json!({ "record": record })))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<WriteRecord>,
) -> ApiResult<Json<Value>> {
    let mut store = state.db.write().await;
    if !store.records.contains_key(&id) {
        return Err(ApiFailure::NotFound("record"));
    }
    store.check_record(&input).map_err(ApiFailure::Unprocessable)?;
    let record = store
        .overwrite_record(&id, &input)
        .ok_or(ApiFailure::NotFound("record"))?;
    Ok(Json(json!({ "record": record })))
}

async fn delete_record(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    store.records.remove(&id).ok_or(ApiFailure::NotFound("record"))?;
    Ok(StatusCode::OK)
}

async fn create_records(
    State(state): State<AppState>,
    Json(input): Json<BulkBody<WriteRecord>>,
) -> Json<Value> {
    let mut store = state.db.write().await;
    let mut created = Vec::new();
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for write in &input.records {
        if store.check_record(write).is_ok() {
            created.push(store.insert_record(write));
            valid.push(echo(write));
        } else {
            invalid.push(echo(write));
        }
    }
    Json(json!({
        "records": created,
        "valid_records": valid,
        "invalid_records": invalid,
    }))
}

async fn update_records(
    State(state): State<AppState>,
    Json(input): Json<BulkBody<BulkUpdateEntry>>,
) -> Json<Value> {
    let mut store = state.db.write().await;
    let mut updated = Vec::new();
    let mut failed = Vec::new();
    for entry in &input.records {
        let applied = match store.check_record(&entry.record) {
            Ok(()) => store.overwrite_record(&entry.id, &entry.record),
            Err(_) => None,
        };
        match applied {
            Some(record) => updated.push(record),
            None => failed.push(echo(&entry.record)),
        }
    }
    Json(json!({
        "records": updated,
        "failed_records": failed,
    }))
}
