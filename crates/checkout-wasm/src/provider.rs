//! # Stripe.js Provider
//!
//! `PaymentProvider` on top of the raw bindings. Option structs cross the
//! boundary as plain JS objects through `serde-wasm-bindgen`.

use crate::bindings::{new_stripe, JsElements, JsEmbeddedCheckout, JsStripe, JsStripeElement};
use async_trait::async_trait;
use checkout_core::{
    CheckoutError, CheckoutResult, ClientSecretFetcher, ConfirmOutcome, ConfirmParams,
    ElementsOptions, PaymentElementOptions, PaymentProvider,
};
use checkout_stripe::PublishableKey;
use js_sys::{Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

/// Stripe.js client bound to one publishable key
#[derive(Debug, Clone)]
pub struct StripeJsProvider {
    stripe: JsStripe,
}

impl StripeJsProvider {
    pub fn new(key: &PublishableKey) -> CheckoutResult<Self> {
        let stripe = new_stripe(key.as_str()).map_err(|e| provider_error("Stripe()", e))?;
        Ok(Self { stripe })
    }
}

#[async_trait(?Send)]
impl PaymentProvider for StripeJsProvider {
    type Elements = JsElements;
    type Element = JsStripeElement;
    type EmbeddedCheckout = JsEmbeddedCheckout;

    fn elements(&self, options: &ElementsOptions) -> CheckoutResult<JsElements> {
        self.stripe
            .elements(&to_js(options)?)
            .map_err(|e| provider_error("elements", e))
    }

    fn create_payment_element(
        &self,
        elements: &JsElements,
        options: &PaymentElementOptions,
    ) -> CheckoutResult<JsStripeElement> {
        elements
            .create_element("payment", &to_js(options)?)
            .map_err(|e| provider_error("elements.create", e))
    }

    fn mount_element(&self, element: &JsStripeElement, selector: &str) -> CheckoutResult<()> {
        element
            .mount(selector)
            .map_err(|e| provider_error("element.mount", e))
    }

    async fn init_embedded_checkout(
        &self,
        fetch_client_secret: ClientSecretFetcher,
    ) -> CheckoutResult<JsEmbeddedCheckout> {
        // Stripe may call this more than once over the widget's lifetime
        let callback = Closure::<dyn FnMut() -> Promise>::new(move || {
            let fetch = fetch_client_secret.clone();
            future_to_promise(async move {
                fetch()
                    .await
                    .map(JsValue::from)
                    .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))
            })
        });

        let options = Object::new();
        set(&options, "fetchClientSecret", &callback.into_js_value())?;

        let promise = self
            .stripe
            .init_embedded_checkout(&options)
            .map_err(|e| provider_error("initEmbeddedCheckout", e))?;
        let checkout = JsFuture::from(promise)
            .await
            .map_err(|e| provider_error("initEmbeddedCheckout", e))?;

        Ok(checkout.unchecked_into())
    }

    fn mount_embedded_checkout(
        &self,
        checkout: &JsEmbeddedCheckout,
        selector: &str,
    ) -> CheckoutResult<()> {
        checkout
            .mount_checkout(selector)
            .map_err(|e| provider_error("checkout.mount", e))
    }

    async fn confirm_payment(
        &self,
        elements: &JsElements,
        params: &ConfirmParams,
    ) -> CheckoutResult<ConfirmOutcome> {
        let options = Object::new();
        set(&options, "elements", elements)?;
        set(&options, "confirmParams", &to_js(params)?)?;

        let promise = self
            .stripe
            .confirm_payment(&options)
            .map_err(|e| provider_error("confirmPayment", e))?;
        let result = JsFuture::from(promise)
            .await
            .map_err(|e| provider_error("confirmPayment", e))?;

        serde_wasm_bindgen::from_value(result)
            .map_err(|e| CheckoutError::Provider(format!("confirmPayment result: {}", e)))
    }
}

fn to_js<T: Serialize>(value: &T) -> CheckoutResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| CheckoutError::Provider(e.to_string()))
}

fn set(target: &Object, key: &str, value: &JsValue) -> CheckoutResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| provider_error(key, e))
}

pub(crate) fn describe_js_error(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

fn provider_error(call: &str, value: JsValue) -> CheckoutError {
    CheckoutError::Provider(format!("{} failed: {}", call, describe_js_error(&value)))
}
