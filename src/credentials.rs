use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_USERNAME: &str = "test-user";
pub const DEFAULT_PASSWORD: &str = "Asdf!234";

/// Username and password of the user pool member the probe logs in as.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: Password,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<Password>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl<S: AsRef<str>> From<S> for Password {
    fn from(password: S) -> Self {
        Password(password.as_ref().to_string())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password: redacted")
    }
}
