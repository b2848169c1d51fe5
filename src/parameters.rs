use std::env;
use std::env::VarError;
use std::time::Duration;

use clap::{Args, ValueEnum};
use http::Uri;
use tracing::Level;

use crate::config::identity_provider::IdentityProvider;
use crate::config::{ConfigurationError, ProbeConfig};
use crate::credentials::{Credentials, DEFAULT_PASSWORD, DEFAULT_USERNAME};
use crate::http::config::{DEFAULT_HTTP_TIMEOUT, HttpConfig, ProxyConfig};

const AWS_REGION_ENV_NAME: &str = "AWS_REGION";
const AWS_DEFAULT_REGION_ENV_NAME: &str = "AWS_DEFAULT_REGION";

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// App client id of the user pool. The USER_PASSWORD_AUTH flow must be enabled for it.
    #[arg(long, short, default_value = "")]
    client_id: String,

    /// Endpoint requested with and without the identity token
    #[arg(long, short, default_value = "")]
    api_url: String,

    /// Region of the user pool. Defaults to AWS_REGION or AWS_DEFAULT_REGION.
    #[arg(long, short)]
    region: Option<String>,

    /// Custom identity provider endpoint, replaces the regional Cognito one.
    #[arg(long)]
    identity_endpoint: Option<String>,

    #[arg(long, short, default_value = DEFAULT_USERNAME)]
    username: String,

    #[arg(long, short, default_value = DEFAULT_PASSWORD, hide_default_value = true)]
    password: String,

    /// Timeout in seconds for each request
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    timeout: u64,

    /// Proxy url. Defaults to HTTPS_PROXY or HTTP_PROXY.
    #[arg(long)]
    proxy: Option<String>,

    /// Verbosity of the logs written to stderr
    #[arg(long, default_value_t = Level::WARN)]
    pub log_level: Level,

    /// Select how the responses are printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output_format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Prints each response body under a heading
    #[value(name = "Plain")]
    Plain,
    /// Prints statuses, bodies and errors as json
    #[value(name = "Json")]
    Json,
}

impl ProbeArgs {
    pub fn into_config(self) -> Result<ProbeConfig, ConfigurationError> {
        self.into_config_with_env(|name| env::var(name))
    }

    fn into_config_with_env<F>(self, env_var: F) -> Result<ProbeConfig, ConfigurationError>
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        let identity_provider = match self.identity_endpoint {
            Some(endpoint) => IdentityProvider::Custom(
                endpoint
                    .parse::<Uri>()
                    .map_err(|e| ConfigurationError::InvalidUri(endpoint.clone(), e.to_string()))?,
            ),
            None => IdentityProvider::Region(select_region(self.region, env_var)),
        };

        let proxy = ProxyConfig::new(self.proxy.as_deref().unwrap_or_default())?
            .try_with_url_from_env()?;
        let timeout = Duration::from_secs(self.timeout);

        Ok(ProbeConfig {
            credentials: Credentials::new(self.username, self.password),
            client_id: self.client_id,
            identity_provider,
            api_url: self.api_url,
            http: HttpConfig::new(timeout, timeout, proxy),
        })
    }
}

/// Region from the arguments, then `AWS_REGION`, then `AWS_DEFAULT_REGION`. Empty if none is set.
fn select_region<F>(region: Option<String>, env_var: F) -> String
where
    F: Fn(&'static str) -> Result<String, VarError>,
{
    region
        .or_else(|| env_var(AWS_REGION_ENV_NAME).ok())
        .or_else(|| env_var(AWS_DEFAULT_REGION_ENV_NAME).ok())
        .unwrap_or_default()
}
