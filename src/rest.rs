//! Plumbing shared by both host clients: endpoint urls, status checks and JSON decoding.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("gitport/", env!("CARGO_PKG_VERSION"));

/// Turns a configured host into a base url. Hosts without a scheme are reached over https.
pub fn base_url(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    let url = if host.contains("://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("https://{host}", host = host))?
    };

    if url.cannot_be_a_base() {
        return Err(Error::BaseUrl(url));
    }

    Ok(url)
}

/// Joins a base url and a path returned by a host, with exactly one slash between them.
pub fn join_path(base: &Url, path: &str) -> String {
    format!(
        "{base}/{path}",
        base = base.as_str().trim_end_matches('/'),
        path = path.trim_start_matches('/')
    )
}

/// Path segments of an endpoint under one of the host's API roots.
pub(crate) fn api_path<'a>(root: &[&'a str], parts: &[&'a str]) -> Vec<&'a str> {
    root.iter().chain(parts).copied().collect()
}

#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(base_url: Url) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::BaseUrl(base_url));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Client)?;

        Ok(Self { http, base_url })
    }

    /// Appends `segments` (percent-encoded one by one) to the base url and adds `query`.
    pub fn endpoint<I>(&self, segments: I, query: &[(&str, String)]) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::BaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Sends the request and fails on anything but a 2xx status.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let (_, _, response) = self.send(builder).await?;
        Ok(response)
    }

    /// Sends the request and decodes a 2xx JSON body into `T`.
    pub async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let (method, url, response) = self.send(builder).await?;

        let body = response.text().await.map_err(|source| Error::Transport {
            method,
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| Error::Decode { url, source })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(Method, Url, Response)> {
        let request = builder.build().map_err(Error::Client)?;
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!(%method, %url, "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| Error::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                method,
                url,
                status,
                body,
            });
        }

        Ok((method, url, response))
    }
}
