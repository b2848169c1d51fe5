use http::Uri;
use thiserror::Error;

use crate::ClientID;
use crate::credentials::Credentials;
use crate::http::config::{HttpConfig, ProxyError};

pub mod identity_provider;

use identity_provider::IdentityProvider;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("required configuration field `{0}` is empty")]
    MissingField(&'static str),
    #[error("invalid region `{0}`")]
    InvalidRegion(String),
    #[error("invalid uri `{0}`: `{1}`")]
    InvalidUri(String, String),
    #[error("invalid proxy: `{0}`")]
    InvalidProxy(#[from] ProxyError),
    #[error("could not build the http client: `{0}`")]
    HttpClient(String),
}

/// Everything a probe run needs, gathered before any network call is made.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub credentials: Credentials,
    pub client_id: ClientID,
    pub identity_provider: IdentityProvider,
    /// Endpoint requested with and without the identity token.
    pub api_url: String,
    pub http: HttpConfig,
}

/// Endpoints of a validated [ProbeConfig].
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeTargets {
    pub identity_endpoint: Uri,
    pub api_endpoint: Uri,
}

impl ProbeConfig {
    /// Fails on the first empty or malformed required field.
    pub fn validate(&self) -> Result<ProbeTargets, ConfigurationError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigurationError::MissingField("client_id"));
        }
        if self.credentials.username.is_empty() {
            return Err(ConfigurationError::MissingField("username"));
        }
        if self.credentials.password.expose().is_empty() {
            return Err(ConfigurationError::MissingField("password"));
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigurationError::MissingField("api_url"));
        }

        let api_endpoint = parse_absolute_uri(&self.api_url)?;
        let identity_endpoint = self.identity_provider.endpoint()?;

        Ok(ProbeTargets {
            identity_endpoint,
            api_endpoint,
        })
    }
}

fn parse_absolute_uri(value: &str) -> Result<Uri, ConfigurationError> {
    let uri = value
        .parse::<Uri>()
        .map_err(|e| ConfigurationError::InvalidUri(value.to_string(), e.to_string()))?;
    require_absolute(uri)
}

/// Requests can only be sent to uris carrying both a scheme and a host.
fn require_absolute(uri: Uri) -> Result<Uri, ConfigurationError> {
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(ConfigurationError::InvalidUri(
            uri.to_string(),
            "scheme and host are required".to_string(),
        ));
    }
    Ok(uri)
}
