//! Async HTTP client wrapping reqwest.
//!
//! One attempt per request: no retries and no backoff. A failure surfaces as a
//! [`SourceError`] and the calling adapter yields nothing for that name.

use crate::error::{SourceError, SourceResult};
use serde_json::Value;
use std::time::{Duration, Instant};

/// User agent sent with every request. Wikimedia APIs reject generic agents.
pub const USER_AGENT: &str = concat!(
    "HonoreeBot/",
    env!("CARGO_PKG_VERSION"),
    " (memorial biography research; https://github.com/honoree-project/honoree)"
);

/// Response from an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Requested URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`SourceError::Http`].
    pub fn error_for_status(self) -> SourceResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SourceError::Http {
                status: self.status,
                url: self.url,
            })
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> SourceResult<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client shared by the knowledge-base and summary adapters.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client with the given per-request timeout.
    pub fn new(timeout_ms: u64) -> SourceResult<Self> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// GET a URL with optional query parameters.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> SourceResult<HttpResponse> {
        let builder = self.client.get(url).timeout(self.timeout);
        let builder = if query.is_empty() {
            builder
        } else {
            builder.query(query)
        };
        self.send(url, builder).await
    }

    /// GET a URL and parse a successful response as JSON.
    pub async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> SourceResult<Value> {
        self.get(url, query).await?.error_for_status()?.json()
    }

    /// POST a JSON body with a bearer token.
    pub async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> SourceResult<HttpResponse> {
        let mut builder = self.client.post(url).timeout(self.timeout).json(body);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        self.send(url, builder).await
    }

    async fn send(&self, url: &str, builder: reqwest::RequestBuilder) -> SourceResult<HttpResponse> {
        let start = Instant::now();
        let r = builder.send().await?;

        let status = r.status().as_u16();
        let body = r.text().await?;

        tracing::debug!(
            "HTTP {status} {url} ({} bytes, {}ms)",
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}
