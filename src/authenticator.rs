use http::header::CONTENT_TYPE;
use http::{HeaderName, Request, Uri};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ClientID;
use crate::credentials::{Credentials, Password};
use crate::http_client::{HttpClient, HttpClientError};

const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const AMZ_TARGET_HEADER: HeaderName = HeaderName::from_static("x-amz-target");
const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";

#[derive(Error, Debug, Clone)]
pub enum AuthenticationError {
    #[error("client id must not be empty")]
    InvalidClientId,
    #[error("credentials rejected by the identity provider: `{0}`")]
    InvalidCredentials(String),
    #[error("client rejected by the identity provider: `{0}`")]
    InvalidClient(String),
    #[error("identity provider requires the `{0}` challenge, which is not supported")]
    ChallengeRequired(String),
    #[error("identity provider error: Status code: `{0}`, Type: `{1}`, Reason: `{2}`")]
    IdentityProvider(u16, String, String),
    #[error("authentication result carries no identity token")]
    MissingToken,
    #[error("unable to serialize request: `{0}`")]
    SerializeError(String),
    #[error("unable to deserialize response: `{0}`")]
    DeserializeError(String),
    #[error("http transport error: `{0}`")]
    HttpTransportError(String),
}

impl From<HttpClientError> for AuthenticationError {
    fn from(err: HttpClientError) -> Self {
        match err {
            HttpClientError::TransportError(msg) => AuthenticationError::HttpTransportError(msg),
            HttpClientError::InvalidResponse(msg) => AuthenticationError::DeserializeError(msg),
        }
    }
}

/// Exchanges credentials for tokens against an identity provider.
pub trait Authenticator {
    fn authenticate(&self, req: InitiateAuthRequest)
    -> Result<AuthenticationResult, AuthenticationError>;
}

/// Talks the Cognito `InitiateAuth` JSON protocol over a [HttpClient].
#[derive(Debug)]
pub struct HttpAuthenticator<C> {
    http_client: C,
    /// Identity provider endpoint, e.g. `https://cognito-idp.eu-west-1.amazonaws.com/`
    url: Uri,
}

impl<C> HttpAuthenticator<C> {
    pub fn new(http_client: C, url: Uri) -> Self {
        Self { http_client, url }
    }

    fn build_request(
        &self,
        req: &InitiateAuthRequest,
    ) -> Result<Request<Vec<u8>>, AuthenticationError> {
        let body = serde_json::to_vec(req)
            .map_err(|e| AuthenticationError::SerializeError(e.to_string()))?;

        Request::builder()
            .uri(&self.url)
            .method("POST")
            .header(CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .header(AMZ_TARGET_HEADER, INITIATE_AUTH_TARGET)
            .body(body)
            .map_err(|e| AuthenticationError::SerializeError(e.to_string()))
    }
}

impl<C> Authenticator for HttpAuthenticator<C>
where
    C: HttpClient,
{
    /// Executes a single `InitiateAuth` call and returns the nested `AuthenticationResult`.
    fn authenticate(
        &self,
        req: InitiateAuthRequest,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if req.client_id.trim().is_empty() {
            return Err(AuthenticationError::InvalidClientId);
        }

        debug!(endpoint = %self.url, flow = ?req.auth_flow, "initiating authentication");
        let request = self.build_request(&req)?;

        let response = self.http_client.send(request)?;

        let body = String::from_utf8(response.body().clone()).map_err(|e| {
            AuthenticationError::DeserializeError(format!("invalid utf8 response: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(provider_error(response.status().as_u16(), &body));
        }

        let response: InitiateAuthResponse = serde_json::from_str(&body)
            .map_err(|e| AuthenticationError::DeserializeError(e.to_string()))?;

        match (response.authentication_result, response.challenge_name) {
            (Some(result), _) => Ok(result),
            (None, Some(challenge)) => Err(AuthenticationError::ChallengeRequired(challenge)),
            (None, None) => Err(AuthenticationError::MissingToken),
        }
    }
}

/// Maps a provider rejection to an error, keyed by the exception name in `__type`.
fn provider_error(status: u16, body: &str) -> AuthenticationError {
    let Ok(error) = serde_json::from_str::<ProviderErrorBody>(body) else {
        return AuthenticationError::IdentityProvider(
            status,
            "Unknown".to_string(),
            body.to_string(),
        );
    };

    // `__type` may come namespaced, as in `com.amazonaws.cognito#NotAuthorizedException`
    let kind = error
        .kind
        .rsplit_once('#')
        .map(|(_, kind)| kind)
        .unwrap_or(error.kind.as_str());

    match kind {
        "NotAuthorizedException"
        | "UserNotFoundException"
        | "UserNotConfirmedException"
        | "PasswordResetRequiredException" => {
            AuthenticationError::InvalidCredentials(error.message)
        }
        "ResourceNotFoundException" | "InvalidParameterException" => {
            AuthenticationError::InvalidClient(error.message)
        }
        _ => AuthenticationError::IdentityProvider(status, kind.to_string(), error.message),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthFlow {
    #[serde(rename = "USER_PASSWORD_AUTH")]
    UserPassword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthParameters {
    #[serde(rename = "USERNAME")]
    pub username: String,
    #[serde(rename = "PASSWORD")]
    pub password: Password,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthRequest {
    pub auth_flow: AuthFlow,
    pub auth_parameters: AuthParameters,
    pub client_id: ClientID,
}

impl InitiateAuthRequest {
    pub fn user_password(credentials: &Credentials, client_id: ClientID) -> Self {
        Self {
            auth_flow: AuthFlow::UserPassword,
            auth_parameters: AuthParameters {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            },
            client_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

/// Tokens issued by the provider. Only `IdToken` is used afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    /// Lifetime in seconds of the issued tokens.
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(rename = "__type")]
    kind: String,
    #[serde(default, alias = "Message")]
    message: String,
}
