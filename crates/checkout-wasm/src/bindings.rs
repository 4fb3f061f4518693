//! Raw wasm-bindgen bindings to Stripe.js v3.
//!
//! Only the calls the checkout strategies make. Stripe.js is loaded by the
//! page from `https://js.stripe.com/v3/` and exposes a global `Stripe`.

use js_sys::Promise;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `Stripe` client instance
    #[wasm_bindgen(js_name = Stripe)]
    #[derive(Debug, Clone)]
    pub type JsStripe;

    /// Elements group returned by `stripe.elements()`
    #[derive(Debug, Clone)]
    pub type JsElements;

    /// Single UI element returned by `elements.create()`
    #[derive(Debug, Clone)]
    pub type JsStripeElement;

    /// Widget resolved from `stripe.initEmbeddedCheckout()`
    #[derive(Debug, Clone)]
    pub type JsEmbeddedCheckout;

    /// `Stripe("pk_...")`
    #[wasm_bindgen(catch, js_name = Stripe, js_namespace = window)]
    pub fn new_stripe(publishable_key: &str) -> Result<JsStripe, JsValue>;

    /// `stripe.elements({ clientSecret, appearance })`
    #[wasm_bindgen(method, catch)]
    pub fn elements(this: &JsStripe, options: &JsValue) -> Result<JsElements, JsValue>;

    /// `elements.create("payment", { layout })`
    #[wasm_bindgen(method, catch, js_name = create)]
    pub fn create_element(
        this: &JsElements,
        element_type: &str,
        options: &JsValue,
    ) -> Result<JsStripeElement, JsValue>;

    /// `element.mount(selector)`
    #[wasm_bindgen(method, catch, js_name = mount)]
    pub fn mount(this: &JsStripeElement, selector: &str) -> Result<(), JsValue>;

    /// `stripe.initEmbeddedCheckout({ fetchClientSecret })` → `Promise<EmbeddedCheckout>`
    #[wasm_bindgen(method, catch, js_name = initEmbeddedCheckout)]
    pub fn init_embedded_checkout(this: &JsStripe, options: &JsValue) -> Result<Promise, JsValue>;

    /// `checkout.mount(selector)`
    #[wasm_bindgen(method, catch, js_name = mount)]
    pub fn mount_checkout(this: &JsEmbeddedCheckout, selector: &str) -> Result<(), JsValue>;

    /// `stripe.confirmPayment({ elements, confirmParams })` → `Promise<{ error? }>`
    #[wasm_bindgen(method, catch, js_name = confirmPayment)]
    pub fn confirm_payment(this: &JsStripe, options: &JsValue) -> Result<Promise, JsValue>;
}
