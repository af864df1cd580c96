use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::record::render_attribute;
use crate::watchlist::{Watchlist, WatchlistStore};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// One watchlist entry as written to disk
#[derive(Debug, Serialize)]
pub struct ExportedClient {
    pub watchlist: Watchlist,
    pub device_id: String,
    pub status: String,
    pub manufacturer: String,
    pub ip_address: Option<String>,
    pub x: f64,
    pub y: f64,
    pub unit: String,
    pub floor_image: String,
    pub floor_ref_id: String,
    pub hierarchy: String,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    pub observed: Option<String>,
}

/// Export both watchlists to a file, returning the number of entries written
pub fn export_watchlists(store: &WatchlistStore, output_path: &Path, format: ExportFormat) -> Result<usize> {
    let clients = collect_clients(store);
    let count = clients.len();

    match format {
        ExportFormat::Json => export_json(&clients, output_path)?,
        ExportFormat::Csv => export_csv(&clients, output_path)?,
    }

    Ok(count)
}

fn collect_clients(store: &WatchlistStore) -> Vec<ExportedClient> {
    store
        .iter()
        .map(|(watchlist, record)| ExportedClient {
            watchlist,
            device_id: record.device_id.clone(),
            status: record.membership_status.as_str().to_string(),
            manufacturer: record.manufacturer.clone(),
            ip_address: record.attributes.get("ipAddress").map(render_attribute),
            x: record.position_x,
            y: record.position_y,
            unit: record.unit.clone(),
            floor_image: record.floor_image_ref.clone(),
            floor_ref_id: record.floor_ref_id.clone(),
            hierarchy: record.map_hierarchy_path.clone(),
            first_seen: record.first_seen_at.map(|t| t.to_rfc3339()),
            last_seen: record.last_seen_at.map(|t| t.to_rfc3339()),
            observed: record.observed_at.map(|t| t.to_rfc3339()),
        })
        .collect()
}

fn export_json(clients: &[ExportedClient], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(clients)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_csv(clients: &[ExportedClient], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "watchlist",
        "device_id",
        "status",
        "manufacturer",
        "ip_address",
        "x",
        "y",
        "unit",
        "floor_image",
        "floor_ref_id",
        "hierarchy",
        "first_seen",
        "last_seen",
        "observed",
    ])?;

    for client in clients {
        wtr.write_record([
            client.watchlist.name(),
            &client.device_id,
            &client.status,
            &client.manufacturer,
            client.ip_address.as_deref().unwrap_or(""),
            &client.x.to_string(),
            &client.y.to_string(),
            &client.unit,
            &client.floor_image,
            &client.floor_ref_id,
            &client.hierarchy,
            client.first_seen.as_deref().unwrap_or(""),
            client.last_seen.as_deref().unwrap_or(""),
            client.observed.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
