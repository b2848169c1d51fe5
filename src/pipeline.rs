use thiserror::Error;
use tracing::{info, warn};

use crate::ClientID;
use crate::authenticator::{
    AuthenticationError, Authenticator, HttpAuthenticator, InitiateAuthRequest,
};
use crate::config::{ConfigurationError, ProbeConfig};
use crate::credentials::Credentials;
use crate::fetcher::{FetchedResponse, RequestError, ResourceFetcher};
use crate::http::client::HttpClient as ReqwestHttpClient;
use crate::http_client::HttpClient;
use crate::token::Token;

/// Exchanges the configured credentials for an identity token.
#[derive(Debug)]
pub struct AuthenticateStage<A> {
    authenticator: A,
    credentials: Credentials,
    client_id: ClientID,
}

impl<A> AuthenticateStage<A>
where
    A: Authenticator,
{
    pub fn new(authenticator: A, credentials: Credentials, client_id: ClientID) -> Self {
        Self {
            authenticator,
            credentials,
            client_id,
        }
    }

    pub fn run(&self) -> Result<Token, AuthenticationError> {
        let request =
            InitiateAuthRequest::user_password(&self.credentials, self.client_id.clone());
        let result = self.authenticator.authenticate(request)?;
        Token::try_from(result)
    }
}

/// Requests the API endpoint, without a token or with the one issued by [AuthenticateStage].
#[derive(Debug)]
pub struct FetchStage<C> {
    fetcher: ResourceFetcher<C>,
}

impl<C> FetchStage<C>
where
    C: HttpClient,
{
    pub fn new(fetcher: ResourceFetcher<C>) -> Self {
        Self { fetcher }
    }

    pub fn unauthenticated(&self) -> Result<FetchedResponse, RequestError> {
        self.fetcher.fetch(None)
    }

    pub fn authenticated(&self, token: &Token) -> Result<FetchedResponse, RequestError> {
        self.fetcher.fetch(Some(token.id_token()))
    }
}

/// Stages wired to the real identity provider and API endpoint.
pub type HttpStages = (
    AuthenticateStage<HttpAuthenticator<ReqwestHttpClient>>,
    FetchStage<ReqwestHttpClient>,
);

/// Validates the configuration and builds both stages on a shared http client.
/// Nothing is sent over the network here.
pub fn build_stages(config: &ProbeConfig) -> Result<HttpStages, ConfigurationError> {
    let targets = config.validate()?;

    let http_client = ReqwestHttpClient::new(config.http.clone())
        .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

    let authenticate = AuthenticateStage::new(
        HttpAuthenticator::new(http_client.clone(), targets.identity_endpoint),
        config.credentials.clone(),
        config.client_id.clone(),
    );
    let fetch = FetchStage::new(ResourceFetcher::new(http_client, targets.api_endpoint));

    Ok((authenticate, fetch))
}

/// Runs the probe: the unauthenticated request first, then the identity exchange and,
/// only if it produced a token, the authenticated request.
pub fn run<A, C>(authenticate: &AuthenticateStage<A>, fetch: &FetchStage<C>) -> ProbeReport
where
    A: Authenticator,
    C: HttpClient,
{
    let unauthenticated = fetch.unauthenticated();
    match &unauthenticated {
        Ok(response) => info!(status = response.status, "unauthenticated request succeeded"),
        Err(e) => info!("unauthenticated request failed: {e}"),
    }

    let authentication = authenticate.run();
    let authenticated = match &authentication {
        Ok(token) => {
            info!(expires_at = ?token.expires_at(), "identity token obtained");
            Some(fetch.authenticated(token))
        }
        Err(e) => {
            warn!("authentication failed, skipping the authenticated request: {e}");
            None
        }
    };
    if let Some(Err(e)) = &authenticated {
        warn!("authenticated request failed: {e}");
    }

    ProbeReport {
        unauthenticated,
        authentication,
        authenticated,
    }
}

/// Everything a run observed. Each outcome is kept on its own so one failure never hides another.
#[derive(Debug)]
pub struct ProbeReport {
    pub unauthenticated: Result<FetchedResponse, RequestError>,
    pub authentication: Result<Token, AuthenticationError>,
    /// `None` when authentication failed and the authenticated request was skipped.
    pub authenticated: Option<Result<FetchedResponse, RequestError>>,
}

#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    #[error("authentication failed: {0}")]
    Authentication(#[source] AuthenticationError),
    #[error("authenticated request failed: {0}")]
    AuthenticatedRequest(#[source] RequestError),
}

impl ProbeReport {
    /// The run fails when no token was obtained or the request presenting it failed.
    /// A rejected unauthenticated request is the expected outcome and does not count.
    pub fn outcome(&self) -> Result<(), ProbeError> {
        match (&self.authentication, &self.authenticated) {
            (Err(e), _) => Err(ProbeError::Authentication(e.clone())),
            (Ok(_), Some(Err(e))) => Err(ProbeError::AuthenticatedRequest(e.clone())),
            _ => Ok(()),
        }
    }
}
