//! Error types for the tracking core.
//!
//! Only [`TransportError`] (wrapped in [`TrackerError`]) ever reaches the
//! caller of a lookup. Everything else is recovered locally and logged.

use thiserror::Error;

use crate::schema::SchemaVersion;

/// Failure talking to the location service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service answered with a status outside 2xx.
    #[error("location service returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response (DNS, TLS, timeout, refused).
    #[error("location service request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The response body was not valid JSON.
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// No usable credentials for an authenticated call.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// A single service entry that could not be mapped to a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed client entry: {0}")]
pub struct MalformedEntry(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credentials configured: set service.username/password or service.basic_auth")]
    MissingCredentials,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("floor plan {0} not found and no default map available")]
    NoFloorPlan(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Observable failure from the tracker's top-level operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The active schema has no normalizer, so a lookup produced no record.
    #[error("schema {0} payloads are not supported; no record produced")]
    UnsupportedSchema(SchemaVersion),
}
