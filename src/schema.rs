//! Location API schema detection.
//!
//! The service exposes two incompatible client layouts. Which one applies is
//! decided once from the version probe and then cached by the tracker.

use std::fmt;

use serde::Deserialize;
use tracing::{info, warn};

use crate::service::{LocationService, VersionProbe};

/// Major version family that introduced the v3 layout.
const SCHEMA_B_MAJOR: &str = "10";

/// Lowest minor version (compared as a string) served with the v3 layout.
const SCHEMA_B_MIN_MINOR: &str = "4";

/// Response layout in effect for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Nested `mapCoordinate`/`mapInfo` layout served by the v2 location API.
    A,
    /// Flat `locationCoordinate`/`geoCoordinate` layout served by the v3 location API.
    B,
}

impl SchemaVersion {
    /// Path segment of the location API for this schema.
    pub fn api_segment(&self) -> &'static str {
        match self {
            SchemaVersion::A => "v2",
            SchemaVersion::B => "v3",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::A => write!(f, "A ({})", self.api_segment()),
            SchemaVersion::B => write!(f, "B ({})", self.api_segment()),
        }
    }
}

/// Major/minor components pulled out of a probe version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeVersion {
    pub major: String,
    pub minor: String,
}

impl ProbeVersion {
    /// Parse either `CMX-10_3.2` or the service's own `3.0_CMX-10.4.1` form.
    pub fn parse(version: &str) -> Option<Self> {
        let (head, tail) = version.trim().split_once('_')?;

        // "<product>-<major>_<minor>.<rest>"
        if let Some(major) = product_major(head) {
            let minor = tail.split('.').next()?;
            return Self::new(major, minor);
        }

        // "<build>_<product>-<major>.<minor>.<patch>"
        let mut parts = tail.split('.');
        let major = product_major(parts.next()?)?;
        let minor = parts.next()?;
        Self::new(major, minor)
    }

    fn new(major: &str, minor: &str) -> Option<Self> {
        if minor.is_empty() {
            return None;
        }
        Some(Self {
            major: major.to_string(),
            minor: minor.to_string(),
        })
    }

    /// Decide the schema for this version.
    ///
    /// The minor component is compared lexically, so "10" sorts below "4".
    pub fn schema(&self) -> SchemaVersion {
        if self.major == SCHEMA_B_MAJOR && self.minor.as_str() >= SCHEMA_B_MIN_MINOR {
            SchemaVersion::B
        } else {
            SchemaVersion::A
        }
    }
}

/// `CMX-10` -> `10`
fn product_major(segment: &str) -> Option<&str> {
    let (_, major) = segment.rsplit_once('-')?;
    if !major.is_empty() && major.chars().all(|c| c.is_ascii_digit()) {
        Some(major)
    } else {
        None
    }
}

/// Body of the image version endpoint.
#[derive(Debug, Deserialize)]
struct ImageVersionBody {
    #[serde(default)]
    cmx_rpm_versions: Vec<String>,
}

/// Probe the service and pick a schema, failing open to [`SchemaVersion::A`].
pub fn detect(service: &dyn LocationService) -> SchemaVersion {
    let probe = match service.probe_version() {
        Ok(probe) => probe,
        Err(e) => {
            warn!("Version probe failed, assuming schema A: {}", e);
            return SchemaVersion::A;
        }
    };

    let schema = schema_for_probe(&probe);
    info!(
        "Location service image version {:?}, using schema {}",
        probe.version_string, schema
    );
    schema
}

fn schema_for_probe(probe: &VersionProbe) -> SchemaVersion {
    if let Ok(body) = serde_json::from_value::<ImageVersionBody>(probe.raw.clone()) {
        if !body.cmx_rpm_versions.is_empty() {
            info!("Location service components: {}", body.cmx_rpm_versions.join(", "));
        }
    }

    match ProbeVersion::parse(&probe.version_string) {
        Some(version) => version.schema(),
        None => {
            warn!(
                "Unrecognised version string {:?}, assuming schema A",
                probe.version_string
            );
            SchemaVersion::A
        }
    }
}
