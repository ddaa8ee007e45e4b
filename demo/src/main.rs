//! Walks the first zone of an account: list, fetch, export, re-import.
//!
//! ```sh
//! HETZNER_API_KEY=... hetzner-dns-demo
//! hetzner-dns-demo --base-url http://127.0.0.1:3000/api/v1 --api-token mock-token
//! ```

use std::io::Cursor;

use anyhow::{Context, Result};
use clap::Parser;
use hetzner_dns::{Client, ClientConfig, ListZonesRequest};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hetzner-dns-demo")]
#[command(about = "Exercise the DNS API client against a live account")]
struct Args {
    /// API token sent in the Auth-API-Token header.
    #[arg(long, env = "HETZNER_API_KEY", hide_env_values = true)]
    api_token: String,

    /// Override the API base URL, e.g. a local mock server.
    #[arg(long, env = "HETZNER_API_URL")]
    base_url: Option<String>,
}

fn init_tracing() {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = ClientConfig::new(args.api_token);
    config.base_url = args.base_url;
    let client = Client::new(config);
    info!(base_url = client.base_url(), "client ready");

    let zones = client
        .list_zones(&ListZonesRequest::default())
        .context("listing zones")?;
    info!(
        count = zones.zones.len(),
        total = zones.meta.pagination.total_entries,
        "listed zones"
    );
    for zone in &zones.zones {
        info!(id = %zone.id, name = %zone.name, status = ?zone.status, records = zone.records_count, "zone");
    }

    let first = zones.zones.first().context("account has no zones")?;
    let zone = client
        .get_zone(&first.id)
        .with_context(|| format!("fetching zone {}", first.id))?;
    info!(id = %zone.id, name = %zone.name, ttl = zone.ttl, verified = ?zone.verified, "fetched zone");

    let export = client
        .export_zone(&zone.id)
        .with_context(|| format!("exporting zone {}", zone.name))?;
    info!(bytes = export.len(), "exported zone file");
    println!("{export}");

    let imported = client
        .import_zone(&zone.id, Cursor::new(export))
        .with_context(|| format!("importing zone {}", zone.name))?;
    info!(name = %imported.name, records = imported.records_count, "re-imported zone");

    Ok(())
}
