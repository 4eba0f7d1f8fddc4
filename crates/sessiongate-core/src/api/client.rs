//! HTTP client for the backend API.
//!
//! Every request built here passes through the `RequestAuthenticator` before it
//! is sent, mirroring an interceptor installed on the transport.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, Request, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{ApiError, RequestAuthenticator};
use crate::config::Config;

/// API client with the authenticator composed ahead of transmission.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    authenticator: RequestAuthenticator,
}

impl ApiClient {
    pub fn new(config: &Config, authenticator: RequestAuthenticator) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            authenticator,
        })
    }

    /// Resolve a request path against the base URL. Absolute URLs are used
    /// as-is; anything else is appended to the base URL, keeping its path.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let full = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };
        Url::parse(&full).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", full, e)))
    }

    /// Build an authenticated request without a body
    pub fn build(&self, method: Method, path: &str) -> Result<Request> {
        let url = self.url(path)?;
        self.finish(self.client.request(method, url))
    }

    /// Build an authenticated request with a JSON body
    pub fn build_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<Request> {
        let url = self.url(path)?;
        self.finish(self.client.request(method, url).json(body))
    }

    fn finish(&self, builder: RequestBuilder) -> Result<Request> {
        let request = builder.build().context("Failed to build request")?;
        Ok(self.authenticator.augment(request))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    pub async fn send(&self, request: Request) -> Result<Response> {
        let url = request.url().clone();
        debug!(method = %request.method(), url = %url, "Sending request");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send request to {}", url))?;
        Self::check_response(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.build(Method::GET, path)?;
        let url = request.url().clone();
        self.send(request)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.build_json(Method::POST, path, body)?;
        let url = request.url().clone();
        self.send(request)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}
