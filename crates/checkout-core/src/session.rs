//! # Session Endpoint
//!
//! The server-side checkout endpoint is an external collaborator: a bare
//! `POST` carrying the anti-forgery header, answered with one of three JSON
//! shapes depending on the presentation mode.

use crate::error::CheckoutResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Transport for session requests.
#[async_trait(?Send)]
pub trait SessionClient {
    /// `POST checkout_url` with `X-CSRFToken` when a token is known, no body.
    async fn request_session(
        &self,
        checkout_url: &str,
        csrf_token: Option<&str>,
    ) -> CheckoutResult<Value>;
}

/// `{clientSecret}` as returned for the embedded checkout widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretSession {
    pub client_secret: String,
}

/// `{clientSecret, appearance}` as returned for a payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentSession {
    pub client_secret: String,
    /// Opaque styling descriptor forwarded to the provider
    #[serde(default)]
    pub appearance: Option<Value>,
}

/// `{checkoutSessionURL}` as returned for a hosted checkout page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedSession {
    #[serde(rename = "checkoutSessionURL")]
    pub checkout_session_url: String,
}

/// Request a session and decode it into the shape the caller expects.
pub async fn fetch_session<T, C>(
    client: &C,
    checkout_url: &str,
    csrf_token: Option<&str>,
) -> CheckoutResult<T>
where
    T: DeserializeOwned,
    C: SessionClient + ?Sized,
{
    let body = client.request_session(checkout_url, csrf_token).await?;
    debug!(checkout_url, "session response received");
    Ok(serde_json::from_value(body)?)
}
