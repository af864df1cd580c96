//! Schema A (`/api/location/v2/clients`) entry layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::EntryParser;
use crate::error::MalformedEntry;
use crate::record::{canonical_device_id, ClientRecord, MembershipStatus};

/// Timestamp layout used by the service, e.g. `2019-02-25T04:17:16.311+0000`.
const SERVICE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct V2Client {
    mac_address: String,
    manufacturer: String,
    map_coordinate: MapCoordinate,
    map_info: MapInfo,
    #[serde(default)]
    ip_address: Option<Value>,
    #[serde(default)]
    network_status: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    ss_id: Option<String>,
    #[serde(default)]
    band: Option<String>,
    #[serde(default)]
    confidence_factor: Option<f64>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct MapCoordinate {
    x: f64,
    y: f64,
    unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapInfo {
    map_hierarchy_string: String,
    floor_ref_id: FloorRef,
    floor_dimension: FloorDimension,
    image: FloorImage,
}

/// The service sends floor ids as numbers on some releases and strings on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FloorRef {
    Number(i64),
    Text(String),
}

impl FloorRef {
    fn into_string(self) -> String {
        match self {
            FloorRef::Number(n) => n.to_string(),
            FloorRef::Text(s) => s,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FloorDimension {
    length: f64,
    width: f64,
    height: f64,
    offset_x: f64,
    offset_y: f64,
    unit: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FloorImage {
    image_name: String,
    width: u32,
    height: u32,
    size: u64,
    max_resolution: u32,
    zoom_level: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default)]
    current_server_time: Option<String>,
    #[serde(default)]
    first_located_time: Option<String>,
    #[serde(default)]
    last_located_time: Option<String>,
}

fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    DateTime::parse_from_str(value, SERVICE_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

pub struct SchemaA;

impl EntryParser for SchemaA {
    fn parse_entry(&self, entry: &Value, observed_at: DateTime<Utc>) -> Result<ClientRecord, MalformedEntry> {
        let client: V2Client =
            serde_json::from_value(entry.clone()).map_err(|e| MalformedEntry(e.to_string()))?;

        let mut attributes = BTreeMap::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value.filter(|v| !v.is_null()) {
                attributes.insert(key.to_string(), value);
            }
        };
        put("ipAddress", client.ip_address);
        put("networkStatus", client.network_status.map(Value::from));
        put("userName", client.user_name.map(Value::from));
        put("ssId", client.ss_id.map(Value::from));
        put("band", client.band.map(Value::from));
        put("confidenceFactor", client.confidence_factor.map(Value::from));
        put("floorDimension", serde_json::to_value(&client.map_info.floor_dimension).ok());
        put("floorImage", serde_json::to_value(&client.map_info.image).ok());

        let stats = client.statistics.unwrap_or_default();
        put("currentServerTime", stats.current_server_time.clone().map(Value::from));

        Ok(ClientRecord {
            device_id: canonical_device_id(&client.mac_address),
            manufacturer: client.manufacturer,
            position_x: client.map_coordinate.x,
            position_y: client.map_coordinate.y,
            unit: client.map_coordinate.unit,
            floor_image_ref: client.map_info.image.image_name,
            floor_ref_id: client.map_info.floor_ref_id.into_string(),
            map_hierarchy_path: client.map_info.map_hierarchy_string,
            membership_status: MembershipStatus::OnNet,
            last_seen_at: parse_time(stats.last_located_time.as_deref()),
            first_seen_at: parse_time(stats.first_located_time.as_deref()),
            observed_at: Some(observed_at),
            attributes,
        })
    }
}
