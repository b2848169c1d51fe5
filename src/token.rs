use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::authenticator::{AuthenticationError, AuthenticationResult};

/// Opaque identity token issued by the user pool. Sent verbatim as the `Authorization` value.
#[derive(Clone, PartialEq)]
pub struct IdToken(String);

impl IdToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdToken {
    fn from(value: String) -> Self {
        IdToken(value)
    }
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdToken: redacted")
    }
}

/// Identity token plus what the provider told about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    id_token: IdToken,
    token_type: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(
        id_token: IdToken,
        token_type: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id_token,
            token_type,
            expires_at,
        }
    }

    pub fn id_token(&self) -> &IdToken {
        &self.id_token
    }

    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl TryFrom<AuthenticationResult> for Token {
    type Error = AuthenticationError;

    fn try_from(result: AuthenticationResult) -> Result<Self, Self::Error> {
        let id_token = result
            .id_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthenticationError::MissingToken)?;

        let expires_at = result
            .expires_in
            .map(|secs| {
                let delta = TimeDelta::from_std(Duration::from_secs(secs))
                    .map_err(|e| AuthenticationError::DeserializeError(e.to_string()))?;
                Utc::now().checked_add_signed(delta).ok_or_else(|| {
                    AuthenticationError::DeserializeError(
                        "token expiration is out of range".to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Token::new(
            IdToken::from(id_token),
            result.token_type,
            expires_at,
        ))
    }
}
