use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::AuthError;

/// Build the `Authorization` header value for the location service.
///
/// A username/password pair wins over a pre-encoded credential. When both are
/// configured and disagree, the computed value is used.
pub fn basic_auth_header(config: &ServiceConfig) -> Result<String, AuthError> {
    let username = config.username.as_deref().unwrap_or("");
    let password = config.password.as_deref().unwrap_or("");
    let preset = config.basic_auth.as_deref().unwrap_or("").trim();

    if username.is_empty() || password.is_empty() {
        if preset.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        debug!("Using pre-encoded basic auth credential");
        return Ok(format!("Basic {}", preset));
    }

    let computed = BASE64.encode(format!("{}:{}", username, password));
    if !preset.is_empty() && preset != computed {
        warn!("Configured basic_auth does not match username/password, using computed value");
    }
    Ok(format!("Basic {}", computed))
}
