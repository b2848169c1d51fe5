//! Logs a user into a Cognito user pool with the `USER_PASSWORD_AUTH` flow and requests an API
//! endpoint twice, without and with the issued identity token, so both responses can be compared.

pub mod authenticator;
pub mod config;
pub mod credentials;
pub mod fetcher;
pub mod http;
pub mod http_client;
pub mod parameters;
pub mod pipeline;
pub mod report;
pub mod token;

/// App client id of the user pool.
pub type ClientID = String;
