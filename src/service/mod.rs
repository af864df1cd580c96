//! Location service capability and its HTTP implementation.

pub mod auth;
pub mod client;

use serde_json::Value;

use crate::error::TransportError;
use crate::schema::SchemaVersion;

pub use client::CmxClient;

/// Raw JSON body returned by the location service.
pub type ServiceResponse = Value;

/// Result of the unauthenticated version probe.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionProbe {
    pub version_string: String,
    pub raw: Value,
}

/// Everything the tracker needs from a location service.
///
/// Calls are blocking; implementations are expected to bound them with a timeout.
pub trait LocationService {
    /// Read the service's image version. Requires no credentials.
    fn probe_version(&self) -> Result<VersionProbe, TransportError>;

    /// Look up a single client by hardware address.
    fn query_by_identifier(
        &self,
        schema: SchemaVersion,
        device_id: &str,
    ) -> Result<ServiceResponse, TransportError>;

    /// Every client the service currently sees.
    fn query_all(&self, schema: SchemaVersion) -> Result<ServiceResponse, TransportError>;

    /// Client counters.
    fn client_count(&self, schema: SchemaVersion) -> Result<ServiceResponse, TransportError>;

    /// Campus/building/floor hierarchy with AP counts.
    fn maps_count(&self) -> Result<ServiceResponse, TransportError>;
}
