//! # checkout-wasm
//!
//! Browser entry points for the checkout page.
//!
//! This crate provides:
//! - `boot_checkout()` - read `#checkout-settings`, wire up the configured strategy
//! - `handle_checkout(strategy, settings)` - the same from a JS settings object
//! - `get_cookie(name)` and `show_spinner(show)` page utilities
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { boot_checkout, handle_checkout } from './pkg/checkout_wasm.js';
//!
//! await init();
//!
//! // Config rendered by the template into <script id="checkout-settings">
//! await boot_checkout();
//!
//! // Or explicitly
//! await handle_checkout('embedded', {
//!   checkoutUrl: '/checkout/embedded/',
//!   checkoutElementSelector: '#checkout',
//!   confirmationBtnSelector: '#checkout-btn',
//! });
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web crates/checkout-wasm
//! ```

pub mod bindings;
pub mod browser;
pub mod logging;
pub mod provider;

use browser::BrowserPage;
use checkout_core::{CheckoutError, CheckoutResult, PageConfig, Settings, Spinner, StrategyKind};
use checkout_stripe::{mount_from_page, read_page_config, HttpSessionClient};
use provider::StripeJsProvider;
use serde::Deserialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Wire up the strategy described by the page's `#checkout-settings` script.
#[wasm_bindgen]
pub async fn boot_checkout() -> Result<(), JsValue> {
    let page = BrowserPage::new().map_err(to_js_error)?;
    let config = read_page_config(&page).map_err(to_js_error)?;
    logging::init_logging(&config.log_level);

    mount(page, config).await.map_err(to_js_error)
}

/// Settings object accepted by `handle_checkout`, with an optional
/// `logLevel` alongside the strategy settings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutOptions {
    #[serde(default)]
    log_level: Option<String>,
    #[serde(flatten)]
    settings: Settings,
}

/// Dispatch `strategy` ("elements", "custom", "embedded" or "hosted") with a
/// settings object.
#[wasm_bindgen]
pub async fn handle_checkout(strategy: String, settings: JsValue) -> Result<(), JsValue> {
    let options: CheckoutOptions = serde_wasm_bindgen::from_value(settings)
        .map_err(|e| to_js_error(CheckoutError::InvalidSettings(e.to_string())))?;
    let config = page_config(&strategy, options).map_err(to_js_error)?;
    logging::init_logging(&config.log_level);

    let page = BrowserPage::new().map_err(to_js_error)?;
    mount(page, config).await.map_err(to_js_error)
}

/// Value of cookie `name` on the current document
#[wasm_bindgen]
pub fn get_cookie(name: &str) -> Result<Option<String>, JsValue> {
    use checkout_core::Page;

    let page = BrowserPage::new().map_err(to_js_error)?;
    let cookies = page.cookies().map_err(to_js_error)?;
    Ok(checkout_core::get_cookie(&cookies, name))
}

/// Toggle `#spinner` and `#payNowButton` between loading and idle
#[wasm_bindgen]
pub fn show_spinner(show: bool) -> Result<(), JsValue> {
    let page = BrowserPage::new().map_err(to_js_error)?;
    Spinner::default().show(&page, show).map_err(to_js_error)
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

async fn mount(page: BrowserPage, config: PageConfig) -> CheckoutResult<()> {
    let page = Rc::new(page);
    let client = Rc::new(HttpSessionClient::for_page(&*page)?);

    mount_from_page(page, client, &config, |key| {
        Ok(Rc::new(StripeJsProvider::new(key)?))
    })
    .await
}

fn page_config(strategy: &str, options: CheckoutOptions) -> CheckoutResult<PageConfig> {
    let kind: StrategyKind = strategy.parse()?;
    let mut config = PageConfig::new(kind, options.settings);
    if let Some(level) = options.log_level {
        config.log_level = level;
    }
    Ok(config)
}

fn to_js_error(err: CheckoutError) -> JsValue {
    tracing::error!(error = %err, "checkout setup failed");
    js_sys::Error::new(&err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: serde_json::Value) -> CheckoutOptions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_page_config_accepts_custom_alias() {
        let config = page_config("custom", options(json!({"checkoutUrl": "/checkout/"}))).unwrap();
        assert_eq!(config.strategy, StrategyKind::Elements);
        assert_eq!(config.public_key_selector, "#payment-form");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_page_config_takes_log_level() {
        let config = page_config(
            "hosted",
            options(json!({
                "checkoutUrl": "/checkout/",
                "confirmationBtnSelector": "#checkout-btn",
                "logLevel": "checkout_stripe=debug"
            })),
        )
        .unwrap();

        assert_eq!(config.log_level, "checkout_stripe=debug");
        assert_eq!(
            config.settings.confirmation_btn_selector.as_deref(),
            Some("#checkout-btn")
        );
    }

    #[test]
    fn test_page_config_rejects_unknown_strategy() {
        let err = page_config("redirect", options(json!({"checkoutUrl": "/checkout/"})))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownStrategy { .. }));
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
