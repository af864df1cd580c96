//! Service-wide counters: client totals and the campus hierarchy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::schema::SchemaVersion;

/// Clients currently seen by the service.
///
/// Schema A only reports a total; the split counters stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientCount {
    pub total: u64,
    pub associated: u64,
    pub probing: u64,
}

#[derive(Debug, Deserialize)]
struct V2Count {
    count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct V3Count {
    total_count: u64,
    #[serde(default)]
    associated_count: u64,
    #[serde(default)]
    probing_count: u64,
}

impl ClientCount {
    pub fn from_response(schema: SchemaVersion, raw: &Value) -> Result<Self, serde_json::Error> {
        match schema {
            SchemaVersion::A => {
                let body: V2Count = serde_json::from_value(raw.clone())?;
                Ok(Self {
                    total: body.count,
                    ..Self::default()
                })
            }
            SchemaVersion::B => {
                let body: V3Count = serde_json::from_value(raw.clone())?;
                Ok(Self {
                    total: body.total_count,
                    associated: body.associated_count,
                    probing: body.probing_count,
                })
            }
        }
    }
}

impl fmt::Display for ClientCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total clients: {}\tAssociated: {}\tProbing: {}",
            self.total, self.associated, self.probing
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusHierarchy {
    #[serde(default)]
    pub total_campuses: u32,
    #[serde(default)]
    pub total_buildings: u32,
    #[serde(default)]
    pub total_floors: u32,
    #[serde(default)]
    pub total_aps: u32,
    #[serde(default, rename = "campusCounts")]
    pub campuses: Vec<Campus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campus {
    pub campus_name: String,
    #[serde(default, rename = "buildingCounts")]
    pub buildings: Vec<Building>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub building_name: String,
    #[serde(default, rename = "floorCounts")]
    pub floors: Vec<Floor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub floor_name: String,
    #[serde(default)]
    pub ap_count: u32,
}

impl CampusHierarchy {
    pub fn from_response(raw: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(raw.clone())
    }

    /// Indented tree, one line per campus, building and floor.
    pub fn outline(&self) -> String {
        let mut out = format!(
            "Campuses: {}\tBuildings: {}\tFloors: {}\tAPs: {}\n",
            self.total_campuses, self.total_buildings, self.total_floors, self.total_aps
        );
        for campus in &self.campuses {
            out.push_str(&format!("{} ({} buildings)\n", campus.campus_name, campus.buildings.len()));
            for building in &campus.buildings {
                out.push_str(&format!("  {} ({} floors)\n", building.building_name, building.floors.len()));
                for floor in &building.floors {
                    out.push_str(&format!("    {}\tAPs: {}\n", floor.floor_name, floor.ap_count));
                }
            }
        }
        out
    }
}
