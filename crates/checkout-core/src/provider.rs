//! # Payment Provider Port
//!
//! The SDK surface the strategies consume. The provider is a black box: it
//! owns the card fields, authorization, and the post-confirmation redirect.
//! We only hand it session tokens and DOM selectors.

use crate::error::CheckoutResult;
use crate::settings::Layout;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// One-shot closure the embedded widget calls to obtain its session token.
pub type ClientSecretFetcher = Rc<dyn Fn() -> LocalBoxFuture<'static, CheckoutResult<String>>>;

/// Options for `stripe.elements(...)`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementsOptions {
    pub client_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<Value>,
}

/// Options for `elements.create("payment", ...)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentElementOptions {
    pub layout: Layout,
}

/// `confirmParams` for `stripe.confirmPayment(...)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmParams {
    pub return_url: String,
}

/// Error object the provider resolves a failed confirmation with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderErrorPayload {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProviderErrorPayload {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Message worth showing to the customer, if the provider sent one
    pub fn user_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// What `confirmPayment` resolves with when it does not redirect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderErrorPayload>,
}

impl ConfirmOutcome {
    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            error: Some(ProviderErrorPayload::with_message(message)),
        }
    }
}

/// Payment provider SDK as seen from the checkout page.
#[async_trait(?Send)]
pub trait PaymentProvider {
    /// Elements group handle, shared between mount and confirmation
    type Elements: Clone + 'static;
    /// A UI element created from an elements group
    type Element;
    /// Embedded checkout widget handle
    type EmbeddedCheckout;

    fn elements(&self, options: &ElementsOptions) -> CheckoutResult<Self::Elements>;

    fn create_payment_element(
        &self,
        elements: &Self::Elements,
        options: &PaymentElementOptions,
    ) -> CheckoutResult<Self::Element>;

    fn mount_element(&self, element: &Self::Element, selector: &str) -> CheckoutResult<()>;

    async fn init_embedded_checkout(
        &self,
        fetch_client_secret: ClientSecretFetcher,
    ) -> CheckoutResult<Self::EmbeddedCheckout>;

    fn mount_embedded_checkout(
        &self,
        checkout: &Self::EmbeddedCheckout,
        selector: &str,
    ) -> CheckoutResult<()>;

    async fn confirm_payment(
        &self,
        elements: &Self::Elements,
        params: &ConfirmParams,
    ) -> CheckoutResult<ConfirmOutcome>;
}
