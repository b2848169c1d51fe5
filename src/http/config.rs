use http::Uri;
use std::env;
use std::env::VarError;
use std::fmt::Display;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const HTTP_PROXY_ENV_NAME: &str = "HTTP_PROXY";
const HTTPS_PROXY_ENV_NAME: &str = "HTTPS_PROXY";

/// Settings for the blocking client shared by the identity exchange and the fetcher.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub(crate) timeout: Duration,
    pub(crate) conn_timeout: Duration,
    pub(crate) proxy: ProxyConfig,
}

impl HttpConfig {
    pub fn new(timeout: Duration, conn_timeout: Duration, proxy: ProxyConfig) -> Self {
        Self {
            timeout,
            conn_timeout,
            proxy,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_HTTP_TIMEOUT,
            DEFAULT_HTTP_TIMEOUT,
            ProxyConfig::default(),
        )
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProxyError {
    #[error("invalid proxy url `{0}`: `{1}`")]
    InvalidUrl(String, String),
}

/// Proxy url that may be empty. Non-empty values are validated as uris.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct ProxyUrl(Option<Uri>);

impl TryFrom<&str> for ProxyUrl {
    type Error = ProxyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Ok(Self(None));
        }
        let uri = s
            .parse::<Uri>()
            .map_err(|err| ProxyError::InvalidUrl(s.to_string(), err.to_string()))?;
        Ok(Self(Some(uri)))
    }
}

impl Display for ProxyUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(url) => write!(f, "{url}"),
            None => write!(f, ""),
        }
    }
}

impl ProxyUrl {
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Proxy used for every outgoing request.
/// <protocol>://<user>:<password>@<host>:<port>
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ProxyConfig {
    url: ProxyUrl,
}

impl ProxyConfig {
    pub fn new(proxy_url: &str) -> Result<Self, ProxyError> {
        Ok(Self {
            url: ProxyUrl::try_from(proxy_url)?,
        })
    }

    pub fn url(&self) -> &ProxyUrl {
        &self.url
    }

    /// Returns a new instance whose url is taken from the standard environment variables if needed.
    pub fn try_with_url_from_env(self) -> Result<Self, ProxyError> {
        self.with_env_aware_url(|name| env::var(name))
    }

    /// Fills an empty url from `HTTPS_PROXY` or `HTTP_PROXY`, in that order.
    fn with_env_aware_url<F>(self, env_var: F) -> Result<Self, ProxyError>
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        if !self.url.is_empty() {
            return Ok(self);
        }
        let url = env_var(HTTPS_PROXY_ENV_NAME)
            .or_else(|_| env_var(HTTP_PROXY_ENV_NAME))
            .unwrap_or_default()
            .as_str()
            .try_into()?;
        Ok(ProxyConfig { url })
    }
}

#[cfg(test)]
mod tests {
    use super::{ProxyConfig, ProxyError, ProxyUrl};
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::{collections::HashMap, env::VarError};

    #[rstest]
    #[case::nothing_configured(&[("SOME_OTHER", "env-variable")], "", "")]
    #[case::explicit_url(&[], "http://localhost:8888", "http://localhost:8888/")]
    #[case::explicit_url_wins(&[("HTTPS_PROXY", "http://other.proxy:9999")], "http://localhost:8888", "http://localhost:8888/")]
    #[case::https_proxy_env(&[("HTTPS_PROXY", "http://other.proxy:9999")], "", "http://other.proxy:9999/")]
    #[case::http_proxy_env(&[("HTTP_PROXY", "http://other.proxy:9999")], "", "http://other.proxy:9999/")]
    #[case::https_proxy_first(&[("HTTPS_PROXY", "http://one.proxy:9999"), ("HTTP_PROXY", "http://other.proxy:9999")], "", "http://one.proxy:9999/")]
    fn proxy_url_resolution(
        #[case] env_values: &[(&'static str, &'static str)],
        #[case] configured: &str,
        #[case] expected: &str,
    ) {
        let env_values: HashMap<_, _> = env_values.iter().copied().collect();
        let config = ProxyConfig::new(configured)
            .unwrap()
            .with_env_aware_url(|k| {
                env_values
                    .get(k)
                    .map(|v| v.to_string())
                    .ok_or(VarError::NotPresent)
            })
            .unwrap();

        assert_eq!(config.url().to_string(), expected);
    }

    #[test]
    fn empty_proxy_url() {
        assert_eq!(ProxyUrl::try_from("").unwrap(), ProxyUrl::default());
        assert!(ProxyUrl::default().is_empty());
    }

    #[test]
    fn invalid_system_proxy() {
        let result = ProxyConfig::default().with_env_aware_url(|_| Ok("http://".to_string()));
        assert_matches!(result.unwrap_err(), ProxyError::InvalidUrl(s, _) => {
            assert_eq!(s, "http://".to_string())
        });
    }
}
