//! Transport gateway: all outbound HTTP traffic to upstream media servers.
//!
//! Every request carries the configured browser identity headers so upstreams
//! that gate on User-Agent/Referer serve us like a normal player. Redirects
//! are followed by reqwest's default policy.

use crate::config::Config;
use crate::error::{ProxyError, Result};
use axum::body::Bytes;
use axum::http::HeaderValue;
use reqwest::{Client, RequestBuilder, Response, header};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Shared outbound HTTP client plus the spoofed browser identity.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: Arc<Config>,
}

impl UpstreamClient {
    /// Build the pooled client used for all upstream fetches.
    pub fn new(config: Arc<Config>) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Attach the configured browser identity headers to a request.
    fn spoofed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(header::ACCEPT, &self.config.accept)
            .header(header::ACCEPT_LANGUAGE, &self.config.accept_language)
            .header(header::ORIGIN, &self.config.origin_header)
            .header(header::REFERER, &self.config.referer)
    }

    /// Fetch a text resource (playlist/manifest).
    ///
    /// Non-success upstream statuses are errors here: a playlist body we
    /// cannot rewrite is useless to the player.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.spoofed(self.client.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream returned {} for {}", status, url);
            return Err(ProxyError::UpstreamStatus(status));
        }

        Ok(response.text().await?)
    }

    /// Fetch a binary resource for transparent relay, forwarding the
    /// player's `Range` header when present.
    ///
    /// The upstream status is relayed as-is (including 206 and 404), so
    /// only network-level failures produce an error.
    pub async fn fetch_raw(&self, url: &str, range: Option<&HeaderValue>) -> Result<Response> {
        let mut request = self.spoofed(self.client.get(url));
        if let Some(range) = range {
            request = request.header(header::RANGE, range.clone());
        }

        Ok(request.send().await?)
    }

    /// Forward a request body upstream (DRM license exchange), injecting a
    /// bearer token when the caller supplied one.
    pub async fn post(
        &self,
        url: &str,
        body: Bytes,
        content_type: Option<&HeaderValue>,
        bearer: Option<&str>,
    ) -> Result<Response> {
        let mut request = self.spoofed(self.client.post(url)).body(body);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type.clone());
        }
        if let Some(key) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }

        Ok(request.send().await?)
    }
}
