use http::header::AUTHORIZATION;
use http::{HeaderValue, Request, Uri};
use thiserror::Error;
use tracing::debug;

use crate::http_client::{HttpClient, HttpClientError};
use crate::token::IdToken;

#[derive(Error, Debug, Clone)]
pub enum RequestError {
    #[error("invalid request: `{0}`")]
    InvalidRequest(String),
    #[error("http transport error: `{0}`")]
    Transport(String),
    #[error("unsuccessful response: Status code: `{0}`, Body: `{1}`")]
    UnsuccessfulResponse(u16, String),
    #[error("invalid response: `{0}`")]
    InvalidResponse(String),
}

impl From<HttpClientError> for RequestError {
    fn from(err: HttpClientError) -> Self {
        match err {
            HttpClientError::TransportError(msg) => RequestError::Transport(msg),
            HttpClientError::InvalidResponse(msg) => RequestError::InvalidResponse(msg),
        }
    }
}

impl RequestError {
    /// Body the server answered with, if the request got that far.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            RequestError::UnsuccessfulResponse(_, body) => Some(body),
            _ => None,
        }
    }
}

/// Status and body of a successful GET.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: String,
}

/// Issues GET requests against the API endpoint, optionally presenting an identity token.
#[derive(Debug)]
pub struct ResourceFetcher<C> {
    http_client: C,
    url: Uri,
}

impl<C> ResourceFetcher<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C, url: Uri) -> Self {
        Self { http_client, url }
    }

    /// GETs the endpoint. With a token, its raw value becomes the `Authorization` header.
    pub fn fetch(&self, token: Option<&IdToken>) -> Result<FetchedResponse, RequestError> {
        let request = build_request(&self.url, token)?;

        debug!(url = %self.url, authenticated = token.is_some(), "requesting resource");
        let response = self.http_client.send(request)?;

        let status = response.status();
        let body = String::from_utf8(response.into_body())
            .map_err(|e| RequestError::InvalidResponse(format!("invalid utf8 body: {e}")))?;
        debug!(status = status.as_u16(), "resource responded");

        if !status.is_success() {
            return Err(RequestError::UnsuccessfulResponse(status.as_u16(), body));
        }

        Ok(FetchedResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn build_request(url: &Uri, token: Option<&IdToken>) -> Result<Request<Vec<u8>>, RequestError> {
    let mut builder = Request::get(url);

    if let Some(token) = token {
        let mut header = HeaderValue::from_str(token.as_str()).map_err(|_| {
            RequestError::InvalidRequest(
                "identity token is not a valid Authorization header value".to_string(),
            )
        })?;
        header.set_sensitive(true);
        builder = builder.header(AUTHORIZATION, header);
    }

    builder
        .body(Vec::new())
        .map_err(|e| RequestError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use http::Method;
    use httpmock::{Method::GET, MockServer};

    use super::*;
    use crate::http::client::HttpClient as ReqwestHttpClient;
    use crate::http::config::HttpConfig;
    use crate::http_client::tests::{MockHttpClient, response};

    fn api_url() -> Uri {
        Uri::from_static("https://api.example.com/")
    }

    #[test]
    fn build_request_without_token() {
        let uri = Uri::from_static("https://api.example.com/prod/hello");

        let request = build_request(&uri, None).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri(), &uri);
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert!(request.body().is_empty());
    }

    #[test]
    fn build_request_uses_the_token_verbatim() {
        let uri = Uri::from_static("https://api.example.com/prod/hello");
        let token = IdToken::from("eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiIxMjMifQ.c2ln".to_string());

        let request = build_request(&uri, Some(&token)).unwrap();

        let header = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(header.as_bytes(), token.as_str().as_bytes());
        assert!(header.is_sensitive());
    }

    #[test]
    fn token_with_invalid_header_characters() {
        let uri = Uri::from_static("https://api.example.com/");
        let token = IdToken::from("line\nbreak".to_string());

        assert_matches!(
            build_request(&uri, Some(&token)),
            Err(RequestError::InvalidRequest(_))
        );
    }

    #[test]
    fn fetch_success() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| req.headers().get(AUTHORIZATION).is_some_and(|v| v == "tok"))
            .returning(|_| Ok(response(200, r#"{"message":"Hello, test-user"}"#)));
        let fetcher = ResourceFetcher::new(http_client, api_url());

        let fetched = fetcher
            .fetch(Some(&IdToken::from("tok".to_string())))
            .unwrap();

        assert_eq!(
            fetched,
            FetchedResponse {
                status: 200,
                body: r#"{"message":"Hello, test-user"}"#.to_string()
            }
        );
    }

    #[test]
    fn unsuccessful_status_keeps_the_body() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| req.headers().get(AUTHORIZATION).is_none())
            .returning(|_| Ok(response(401, r#"{"message":"Unauthorized"}"#)));
        let fetcher = ResourceFetcher::new(http_client, api_url());

        let error = fetcher.fetch(None).unwrap_err();

        assert_eq!(error.response_body(), Some(r#"{"message":"Unauthorized"}"#));
        assert_matches!(error, RequestError::UnsuccessfulResponse(401, _));
    }

    #[test]
    fn transport_error() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_send().once().returning(|_| {
            Err(HttpClientError::TransportError(
                "Connection refused".to_string(),
            ))
        });
        let fetcher = ResourceFetcher::new(http_client, api_url());

        let error = fetcher.fetch(None).unwrap_err();

        assert_eq!(error.response_body(), None);
        assert_matches!(error, RequestError::Transport(msg) => {
            assert_eq!(msg, "Connection refused")
        });
    }

    #[test]
    fn non_utf8_body() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_send().once().returning(|_| {
            Ok(http::Response::builder()
                .status(200)
                .body(vec![0xff, 0xfe])
                .unwrap())
        });
        let fetcher = ResourceFetcher::new(http_client, api_url());

        assert_matches!(fetcher.fetch(None), Err(RequestError::InvalidResponse(_)));
    }

    #[test]
    fn fetch_against_a_server() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/prod/hello")
                .header("authorization", "raw-id-token");
            then.status(200).body(r#"{"message":"Hello, test-user"}"#);
        });
        let http_client = ReqwestHttpClient::new(HttpConfig::default()).unwrap();
        let fetcher =
            ResourceFetcher::new(http_client, server.url("/prod/hello").parse().unwrap());

        let fetched = fetcher
            .fetch(Some(&IdToken::from("raw-id-token".to_string())))
            .unwrap();

        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body, r#"{"message":"Hello, test-user"}"#);
        mock.assert();
    }

    #[test]
    fn unreachable_endpoint() {
        let http_client = ReqwestHttpClient::new(HttpConfig::new(
            Duration::from_millis(500),
            Duration::from_millis(500),
            Default::default(),
        ))
        .unwrap();
        // Nothing listens on port 9 locally
        let fetcher = ResourceFetcher::new(http_client, Uri::from_static("http://127.0.0.1:9/"));

        assert_matches!(fetcher.fetch(None), Err(RequestError::Transport(_)));
    }
}
