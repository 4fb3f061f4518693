//! # Checkout Settings
//!
//! The configuration record handed to a strategy at dispatch time, and the
//! page-level envelope that selects the strategy.
//!
//! Field names follow the camelCase keys the checkout templates emit:
//!
//! ```json
//! {
//!   "strategy": "elements",
//!   "checkoutUrl": "/checkout/",
//!   "layout": "accordion",
//!   "paymentElementSelector": "#payment-element",
//!   "confirmPaymentElementSelector": "#submit",
//!   "returnUrl": "https://shop.example/checkout/return/"
//! }
//! ```

use crate::cookie::{get_cookie, CSRF_COOKIE_NAME};
use crate::error::{CheckoutError, CheckoutResult};
use crate::page::Spinner;
use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};

/// Visual arrangement hint for the payment element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Tabs,
    Accordion,
    Auto,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Tabs => "tabs",
            Layout::Accordion => "accordion",
            Layout::Auto => "auto",
        }
    }
}

/// Settings passed into a strategy. Immutable once dispatched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Anti-forgery token sent as `X-CSRFToken`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,

    /// Endpoint that issues the checkout session
    pub checkout_url: String,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_element_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_payment_element_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_element_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_btn_selector: Option<String>,

    /// Where the provider sends the customer after confirmation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,

    /// Order summary removed once the embedded widget takes over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items_selector: Option<String>,

    /// Loading affordance toggled around the elements flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spinner: Option<Spinner>,
}

impl Settings {
    pub fn new(checkout_url: impl Into<String>) -> Self {
        Self {
            checkout_url: checkout_url.into(),
            ..Default::default()
        }
    }

    /// Decode settings from a JSON document
    pub fn from_json(json: &str) -> CheckoutResult<Self> {
        serde_json::from_str(json).map_err(|e| CheckoutError::InvalidSettings(e.to_string()))
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_payment_element_selector(mut self, selector: impl Into<String>) -> Self {
        self.payment_element_selector = Some(selector.into());
        self
    }

    pub fn with_confirm_payment_element_selector(mut self, selector: impl Into<String>) -> Self {
        self.confirm_payment_element_selector = Some(selector.into());
        self
    }

    pub fn with_checkout_element_selector(mut self, selector: impl Into<String>) -> Self {
        self.checkout_element_selector = Some(selector.into());
        self
    }

    pub fn with_confirmation_btn_selector(mut self, selector: impl Into<String>) -> Self {
        self.confirmation_btn_selector = Some(selector.into());
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    pub fn with_line_items_selector(mut self, selector: impl Into<String>) -> Self {
        self.line_items_selector = Some(selector.into());
        self
    }

    pub fn with_spinner(mut self, spinner: Spinner) -> Self {
        self.spinner = Some(spinner);
        self
    }

    pub fn payment_element_selector(&self) -> CheckoutResult<&str> {
        required(&self.payment_element_selector, "paymentElementSelector")
    }

    pub fn confirm_payment_element_selector(&self) -> CheckoutResult<&str> {
        required(
            &self.confirm_payment_element_selector,
            "confirmPaymentElementSelector",
        )
    }

    pub fn checkout_element_selector(&self) -> CheckoutResult<&str> {
        required(&self.checkout_element_selector, "checkoutElementSelector")
    }

    pub fn confirmation_btn_selector(&self) -> CheckoutResult<&str> {
        required(&self.confirmation_btn_selector, "confirmationBtnSelector")
    }

    pub fn return_url(&self) -> CheckoutResult<&str> {
        required(&self.return_url, "returnUrl")
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> CheckoutResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(CheckoutError::MissingSetting { name })
}

/// Page-level configuration, usually rendered into a JSON `<script>` tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Which presentation mode to dispatch
    pub strategy: StrategyKind,

    /// Form carrying the provider publishable key in `data-public`
    #[serde(default = "default_public_key_selector")]
    pub public_key_selector: String,

    /// Cookie consulted when `csrfToken` is not supplied
    #[serde(default = "default_csrf_cookie_name")]
    pub csrf_cookie_name: String,

    /// `EnvFilter` directive for the console logger
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(flatten)]
    pub settings: Settings,
}

fn default_public_key_selector() -> String {
    "#payment-form".to_string()
}

fn default_csrf_cookie_name() -> String {
    CSRF_COOKIE_NAME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PageConfig {
    /// Config for `strategy` with default selectors and log level
    pub fn new(strategy: StrategyKind, settings: Settings) -> Self {
        Self {
            strategy,
            public_key_selector: default_public_key_selector(),
            csrf_cookie_name: default_csrf_cookie_name(),
            log_level: default_log_level(),
            settings,
        }
    }

    pub fn from_json(json: &str) -> CheckoutResult<Self> {
        serde_json::from_str(json).map_err(|e| CheckoutError::InvalidSettings(e.to_string()))
    }

    /// Settings with the CSRF token resolved from the cookie jar when absent
    pub fn settings_with_cookies(&self, cookie_string: &str) -> Settings {
        let mut settings = self.settings.clone();
        if settings.csrf_token.is_none() {
            settings.csrf_token = get_cookie(cookie_string, &self.csrf_cookie_name);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_json() {
        let settings = Settings::from_json(
            r##"{
                "csrfToken": "tok",
                "checkoutUrl": "/checkout/",
                "layout": "accordion",
                "paymentElementSelector": "#payment-element",
                "confirmPaymentElementSelector": "#submit",
                "returnUrl": "http://localhost:8000/checkout/return/"
            }"##,
        )
        .unwrap();

        assert_eq!(settings.csrf_token.as_deref(), Some("tok"));
        assert_eq!(settings.layout, Layout::Accordion);
        assert_eq!(settings.payment_element_selector().unwrap(), "#payment-element");
        assert_eq!(
            settings.return_url().unwrap(),
            "http://localhost:8000/checkout/return/"
        );
        assert!(settings.spinner.is_none());
    }

    #[test]
    fn test_missing_checkout_url_is_rejected() {
        let err = Settings::from_json(r#"{"layout": "tabs"}"#).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidSettings(_)));
    }

    #[test]
    fn test_required_selector() {
        let settings = Settings::new("/checkout/").with_checkout_element_selector("");

        assert!(matches!(
            settings.checkout_element_selector(),
            Err(CheckoutError::MissingSetting {
                name: "checkoutElementSelector"
            })
        ));
        assert!(matches!(
            settings.confirmation_btn_selector(),
            Err(CheckoutError::MissingSetting {
                name: "confirmationBtnSelector"
            })
        ));
    }

    #[test]
    fn test_layout_default() {
        assert_eq!(Settings::new("/c/").layout, Layout::Tabs);
        assert_eq!(Layout::Accordion.as_str(), "accordion");
    }

    #[test]
    fn test_page_config_defaults() {
        let config =
            PageConfig::from_json(r##"{"strategy": "hosted", "checkoutUrl": "/checkout/"}"##)
                .unwrap();

        assert_eq!(config.strategy, StrategyKind::Hosted);
        assert_eq!(config.public_key_selector, "#payment-form");
        assert_eq!(config.csrf_cookie_name, "csrftoken");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.settings.checkout_url, "/checkout/");
    }

    #[test]
    fn test_page_config_new_matches_json_defaults() {
        let parsed =
            PageConfig::from_json(r##"{"strategy": "elements", "checkoutUrl": "/checkout/"}"##)
                .unwrap();
        let built = PageConfig::new(StrategyKind::Elements, Settings::new("/checkout/"));
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_csrf_token_falls_back_to_cookie() {
        let config = PageConfig::from_json(
            r##"{"strategy": "embedded", "checkoutUrl": "/checkout/"}"##,
        )
        .unwrap();

        let settings = config.settings_with_cookies("sessionid=abc; csrftoken=xyz789");
        assert_eq!(settings.csrf_token.as_deref(), Some("xyz789"));
    }

    #[test]
    fn test_explicit_csrf_token_wins() {
        let config = PageConfig::from_json(
            r##"{"strategy": "embedded", "checkoutUrl": "/checkout/", "csrfToken": "inline"}"##,
        )
        .unwrap();

        let settings = config.settings_with_cookies("csrftoken=cookie");
        assert_eq!(settings.csrf_token.as_deref(), Some("inline"));
    }
}
