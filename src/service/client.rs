use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::auth::basic_auth_header;
use super::{LocationService, ServiceResponse, VersionProbe};
use crate::config::ServiceConfig;
use crate::error::{AuthError, TransportError};
use crate::schema::SchemaVersion;

/// Blocking HTTP client for a CMX location service.
pub struct CmxClient {
    agent: ureq::Agent,
    base_url: String,
    auth: Result<String, AuthError>,
}

impl CmxClient {
    pub fn from_config(config: &ServiceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        Self {
            agent,
            base_url: format!("{}://{}", config.scheme, config.host),
            auth: basic_auth_header(config),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn clients_url(&self, schema: SchemaVersion) -> String {
        self.url(&format!("/api/location/{}/clients", schema.api_segment()))
    }

    fn get_json(
        &self,
        url: &str,
        query: Option<(&str, &str)>,
        authenticated: bool,
    ) -> Result<Value, TransportError> {
        debug!("GET {}", url);

        let mut req = self
            .agent
            .get(url)
            .set("Content-Type", "application/json")
            .set("Cache-Control", "no-cache");

        if authenticated {
            let header = self.auth.clone()?;
            req = req.set("Authorization", &header);
        }
        if let Some((key, value)) = query {
            req = req.query(key, value);
        }

        let response = req.call().map_err(|e| match e {
            ureq::Error::Status(status, _) => TransportError::Status {
                status,
                url: url.to_string(),
            },
            ureq::Error::Transport(t) => TransportError::Network {
                url: url.to_string(),
                reason: t.to_string(),
            },
        })?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(TransportError::Status {
                status,
                url: url.to_string(),
            });
        }

        response.into_json::<Value>().map_err(|e| TransportError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl LocationService for CmxClient {
    fn probe_version(&self) -> Result<VersionProbe, TransportError> {
        let url = self.url("/api/config/v1/version/image");
        let raw = self.get_json(&url, None, false)?;

        let version_string = raw
            .get("cmx_image_version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| TransportError::Decode {
                url: url.clone(),
                reason: "missing cmx_image_version".to_string(),
            })?;

        Ok(VersionProbe { version_string, raw })
    }

    fn query_by_identifier(
        &self,
        schema: SchemaVersion,
        device_id: &str,
    ) -> Result<ServiceResponse, TransportError> {
        let url = self.clients_url(schema);
        self.get_json(&url, Some(("macAddress", device_id)), true)
    }

    fn query_all(&self, schema: SchemaVersion) -> Result<ServiceResponse, TransportError> {
        let url = self.clients_url(schema);
        self.get_json(&url, None, true)
    }

    fn client_count(&self, schema: SchemaVersion) -> Result<ServiceResponse, TransportError> {
        let url = format!("{}/count", self.clients_url(schema));
        self.get_json(&url, None, true)
    }

    fn maps_count(&self) -> Result<ServiceResponse, TransportError> {
        let url = self.url("/api/config/v1/maps/count");
        self.get_json(&url, None, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_follow_schema() {
        let config = ServiceConfig {
            host: "cmx.example.net".to_string(),
            ..ServiceConfig::default()
        };
        let client = CmxClient::from_config(&config);

        assert_eq!(
            client.clients_url(SchemaVersion::A),
            "https://cmx.example.net/api/location/v2/clients"
        );
        assert_eq!(
            client.clients_url(SchemaVersion::B),
            "https://cmx.example.net/api/location/v3/clients"
        );
    }

    #[test]
    fn test_authenticated_call_without_credentials() {
        let client = CmxClient::from_config(&ServiceConfig::default());
        let err = client.query_all(SchemaVersion::A).unwrap_err();
        assert_eq!(err, TransportError::Auth(AuthError::MissingCredentials));
    }
}
