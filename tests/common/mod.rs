//! Fakes shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use cmxtrack::error::{RenderError, TransportError};
use cmxtrack::render::{MapRenderer, Placement, Rendered};
use cmxtrack::schema::SchemaVersion;
use cmxtrack::service::{LocationService, ServiceResponse, VersionProbe};
use serde_json::{json, Value};

/// Location service answering from a table of bodies keyed by device id.
///
/// Bodies can be swapped between calls through the shared handle.
#[derive(Clone, Default)]
pub struct FakeService {
    pub version: Option<String>,
    pub bodies: Rc<RefCell<HashMap<String, Value>>>,
    pub lookups: Rc<Cell<usize>>,
    pub probes: Rc<Cell<usize>>,
    pub down: Rc<Cell<bool>>,
}

impl FakeService {
    pub fn with_version(version: &str) -> Self {
        Self {
            version: Some(version.to_string()),
            ..Self::default()
        }
    }

    pub fn set_body(&self, device_id: &str, body: Value) {
        self.bodies.borrow_mut().insert(device_id.to_string(), body);
    }

    fn unreachable(&self, url: &str) -> TransportError {
        TransportError::Network {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        }
    }
}

impl LocationService for FakeService {
    fn probe_version(&self) -> Result<VersionProbe, TransportError> {
        self.probes.set(self.probes.get() + 1);
        match &self.version {
            Some(v) if !self.down.get() => Ok(VersionProbe {
                version_string: v.clone(),
                raw: json!({ "cmx_image_version": v }),
            }),
            _ => Err(self.unreachable("fake://api/config/v1/version/image")),
        }
    }

    fn query_by_identifier(&self, schema: SchemaVersion, device_id: &str) -> Result<ServiceResponse, TransportError> {
        self.lookups.set(self.lookups.get() + 1);
        if self.down.get() {
            return Err(self.unreachable(&format!("fake://api/location/{}/clients", schema.api_segment())));
        }
        Ok(self.bodies.borrow().get(device_id).cloned().unwrap_or_else(|| json!([])))
    }

    fn query_all(&self, _schema: SchemaVersion) -> Result<ServiceResponse, TransportError> {
        Ok(Value::Array(self.bodies.borrow().values().flat_map(entries).collect()))
    }

    fn client_count(&self, _schema: SchemaVersion) -> Result<ServiceResponse, TransportError> {
        Ok(json!({ "count": self.bodies.borrow().len() }))
    }

    fn maps_count(&self) -> Result<ServiceResponse, TransportError> {
        Ok(json!({ "totalCampuses": 0 }))
    }
}

fn entries(body: &Value) -> Vec<Value> {
    body.as_array().cloned().unwrap_or_default()
}

/// Renderer that remembers every placement instead of drawing.
#[derive(Clone, Default)]
pub struct FakeRenderer {
    pub placements: Rc<RefCell<Vec<(String, String, f64, f64)>>>,
}

impl MapRenderer for FakeRenderer {
    fn place(&self, placement: &Placement<'_>) -> Result<Rendered, RenderError> {
        self.placements.borrow_mut().push((
            placement.device_id.to_string(),
            placement.floor_image_ref.to_string(),
            placement.x,
            placement.y,
        ));
        Ok(Rendered {
            path: PathBuf::from(format!("{}.png", placement.device_id)),
            used_default_map: placement.floor_image_ref == "unknownmap.jpg",
        })
    }
}

/// One schema A client entry as the service returns it.
pub fn v2_client(mac: &str, x: f64, y: f64) -> Value {
    json!({
        "macAddress": mac,
        "manufacturer": "Apple",
        "mapCoordinate": { "x": x, "y": y, "z": 0, "unit": "FEET" },
        "mapInfo": {
            "mapHierarchyString": "DevNetCampus>DevNetBuilding>DevNetZone",
            "floorRefId": 723413320329068590u64,
            "floorDimension": {
                "length": 81.9, "width": 307.0, "height": 16.5,
                "offsetX": 0.0, "offsetY": 0.0, "unit": "FEET"
            },
            "image": {
                "imageName": "domain_0_1421949023265.png",
                "zoomLevel": 4, "width": 1376, "height": 3696,
                "size": 3696, "maxResolution": 8
            }
        },
        "ipAddress": ["10.10.20.165", "fe80:0000:0000:0000:1c68:24ff:fe39:2ac2"],
        "networkStatus": "ACTIVE",
        "ssId": "test",
        "band": "IEEE_802_11_B",
        "confidenceFactor": 24.0,
        "statistics": {
            "currentServerTime": "2019-02-25T04:17:16.311+0000",
            "firstLocatedTime": "2019-02-25T04:03:38.397+0000",
            "lastLocatedTime": "2019-02-25T04:17:14.009+0000"
        }
    })
}
