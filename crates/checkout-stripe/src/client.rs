//! # Session Endpoint Client
//!
//! `reqwest` transport for the checkout session endpoint. In the browser
//! reqwest rides on `fetch`, so same-origin cookies travel with the request.

use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult, Page, SessionClient, CSRF_HEADER_NAME};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, error, instrument};

/// `SessionClient` backed by a reqwest `Client`
#[derive(Debug, Clone, Default)]
pub struct HttpSessionClient {
    client: Client,
    base_url: Option<Url>,
}

impl HttpSessionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Resolve relative checkout URLs against `base`
    pub fn with_base_url(mut self, base: &str) -> CheckoutResult<Self> {
        let url = Url::parse(base).map_err(|e| {
            CheckoutError::Configuration(format!("Invalid base URL {}: {}", base, e))
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Client resolving relative URLs against the page's own location
    pub fn for_page<P: Page + ?Sized>(page: &P) -> CheckoutResult<Self> {
        Self::new().with_base_url(&page.location()?)
    }

    pub fn resolve(&self, checkout_url: &str) -> CheckoutResult<Url> {
        let resolved = match &self.base_url {
            Some(base) => base.join(checkout_url),
            None => Url::parse(checkout_url),
        };
        resolved.map_err(|e| {
            CheckoutError::Configuration(format!("Invalid checkout URL {}: {}", checkout_url, e))
        })
    }
}

#[async_trait(?Send)]
impl SessionClient for HttpSessionClient {
    #[instrument(skip(self, csrf_token))]
    async fn request_session(
        &self,
        checkout_url: &str,
        csrf_token: Option<&str>,
    ) -> CheckoutResult<Value> {
        let url = self.resolve(checkout_url)?;

        let mut request = self.client.post(url);
        if let Some(token) = csrf_token {
            request = request.header(CSRF_HEADER_NAME, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Session endpoint error: status={}, body={}", status, body);
            return Err(CheckoutError::SessionRejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "session endpoint answered");
        serde_json::from_str(&body).map_err(|e| {
            CheckoutError::InvalidResponse(format!("Failed to parse session response: {}", e))
        })
    }
}
