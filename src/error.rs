//! Errors raised by the remote host clients.

use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The host answered with a non-success status.
    #[error("{method} {url} was unsuccessful. Status code: {status}. Response body: {body}")]
    Status {
        method: Method,
        url: Url,
        status: StatusCode,
        body: String,
    },

    /// The request never produced a response (connection, TLS, timeout, body read).
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("`{0}` cannot be used as a base url")]
    BaseUrl(Url),

    /// Building the client or a request failed before anything was sent.
    #[error("http client error: {0}")]
    Client(#[source] reqwest::Error),
}
