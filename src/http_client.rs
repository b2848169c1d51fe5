use http::{Request, Response};

#[derive(thiserror::Error, Debug)]
pub enum HttpClientError {
    /// The request never produced a response (DNS, connection refused, timeout...).
    #[error("HTTP transport error: `{0}`")]
    TransportError(String),
    /// A response arrived but could not be read.
    #[error("invalid http response: `{0}`")]
    InvalidResponse(String),
}

/// Blocking HTTP transport used by both the identity exchange and the resource fetcher.
pub trait HttpClient {
    /// Sends the request as is. Method, url and headers are taken from the `Request`.
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>;
}

// Closures can stand in for a client
impl<F> HttpClient for F
where
    F: Fn(Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>,
{
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        self(req)
    }
}
