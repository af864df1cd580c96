use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Floor image used for clients the service has no data for.
pub const PLACEHOLDER_FLOOR_IMAGE: &str = "unknownmap.jpg";
pub const PLACEHOLDER_MANUFACTURER: &str = "Unknown";
pub const PLACEHOLDER_FLOOR_REF: &str = "9876543210";
pub const PLACEHOLDER_HIERARCHY: &str = "OZone";
pub const PLACEHOLDER_UNIT: &str = "FEET";
pub const PLACEHOLDER_POSITION: (f64, f64) = (10.0, 10.0);

/// Form every device id is stored and compared in: trimmed, ASCII lower-case.
///
/// The service reports hardware addresses in lower case while operators type
/// them either way.
pub fn canonical_device_id(device_id: &str) -> String {
    device_id.trim().to_ascii_lowercase()
}

/// Status of a tracked client as seen by the incident workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MembershipStatus {
    #[default]
    OnNet,
    Quarantined,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::OnNet => "OnNet",
            MembershipStatus::Quarantined => "Quarantined",
        }
    }
}

/// Canonical, schema-independent view of one client device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub device_id: String,
    pub manufacturer: String,
    pub position_x: f64,
    pub position_y: f64,
    pub unit: String,
    pub floor_image_ref: String,
    pub floor_ref_id: String,
    pub map_hierarchy_path: String,
    #[serde(default)]
    pub membership_status: MembershipStatus,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub first_seen_at: Option<DateTime<Utc>>,
    pub observed_at: Option<DateTime<Utc>>,
    /// Schema-specific fields carried along untouched (IP address, SSID, ...).
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl ClientRecord {
    /// Stand-in record for an identifier the service currently does not see.
    pub fn placeholder(device_id: &str, observed_at: DateTime<Utc>) -> Self {
        Self {
            device_id: canonical_device_id(device_id),
            manufacturer: PLACEHOLDER_MANUFACTURER.to_string(),
            position_x: PLACEHOLDER_POSITION.0,
            position_y: PLACEHOLDER_POSITION.1,
            unit: PLACEHOLDER_UNIT.to_string(),
            floor_image_ref: PLACEHOLDER_FLOOR_IMAGE.to_string(),
            floor_ref_id: PLACEHOLDER_FLOOR_REF.to_string(),
            map_hierarchy_path: PLACEHOLDER_HIERARCHY.to_string(),
            membership_status: MembershipStatus::OnNet,
            last_seen_at: None,
            first_seen_at: None,
            observed_at: Some(observed_at),
            attributes: BTreeMap::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.floor_image_ref == PLACEHOLDER_FLOOR_IMAGE && self.floor_ref_id == PLACEHOLDER_FLOOR_REF
    }

    /// Fold a fresher observation of the same device into this record.
    ///
    /// Identity and membership status are left alone; timestamps the new
    /// observation lacks keep their previous value, as do attributes it
    /// does not mention.
    pub fn merge_from(&mut self, newer: ClientRecord) {
        self.manufacturer = newer.manufacturer;
        self.position_x = newer.position_x;
        self.position_y = newer.position_y;
        self.unit = newer.unit;
        self.floor_image_ref = newer.floor_image_ref;
        self.floor_ref_id = newer.floor_ref_id;
        self.map_hierarchy_path = newer.map_hierarchy_path;
        self.last_seen_at = newer.last_seen_at.or(self.last_seen_at);
        self.first_seen_at = newer.first_seen_at.or(self.first_seen_at);
        self.observed_at = newer.observed_at.or(self.observed_at);
        self.attributes.extend(newer.attributes);
    }
}

impl fmt::Display for ClientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = self
            .attributes
            .get("ipAddress")
            .map(render_attribute)
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{}\t{}\t{}\t{}\t({:.1}, {:.1})\t{}\t{}",
            self.device_id,
            ip,
            self.manufacturer,
            self.floor_ref_id,
            self.position_x,
            self.position_y,
            self.map_hierarchy_path,
            self.membership_status.as_str()
        )
    }
}

/// Flatten an attribute for single-line display.
pub fn render_attribute(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_attribute)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
