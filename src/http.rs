// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use url::Url;

/// HTTP response with status, headers, and the full body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction for testability
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET a URL with extra request headers and query parameters
    async fn fetch(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> Result<HttpResponse, reqwest::Error>;

    /// HEAD a URL. The returned body is always empty.
    async fn fetch_head(&self, url: &str) -> Result<HttpResponse, reqwest::Error>;
}

/// Append query parameters to a URL, keeping any parameters it already has.
///
/// Falls back to the unmodified URL when it cannot be parsed so the transport
/// gets to report the problem.
pub fn url_with_params(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    match Url::parse_with_params(url, params) {
        Ok(url) => url.to_string(),
        Err(_) => url.to_string(),
    }
}

/// Default HTTP client implementation using reqwest
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new ReqwestClient with default settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a new ReqwestClient with a custom reqwest::Client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut request = self.client.get(url_with_params(url, params));
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    async fn fetch_head(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let response = self.client.head(url).send().await?;

        Ok(HttpResponse {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            body: Bytes::new(),
        })
    }
}
