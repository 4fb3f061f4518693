//! # Page Bootstrap
//!
//! Everything between "the page has loaded" and "a strategy is listening":
//! read the page config, load the publishable key, build the provider,
//! resolve the CSRF token and dispatch.

use crate::config::{PublishableKey, StripeClientConfig};
use crate::elements::StripeElementsStrategy;
use crate::embedded::StripeEmbeddedStrategy;
use crate::hosted::StripeHostedStrategy;
use checkout_core::{
    CheckoutError, CheckoutResult, Page, PageConfig, PaymentProvider, SessionClient,
    StrategySelector,
};
use std::rc::Rc;
use tracing::{info, instrument, warn};

/// JSON `<script>` element carrying the `PageConfig`
pub const SETTINGS_SCRIPT_SELECTOR: &str = "#checkout-settings";

/// Decode the page config rendered into [`SETTINGS_SCRIPT_SELECTOR`].
pub fn read_page_config<D: Page + ?Sized>(page: &D) -> CheckoutResult<PageConfig> {
    let json = page
        .text_content(SETTINGS_SCRIPT_SELECTOR)?
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            CheckoutError::Configuration(format!("{} is empty", SETTINGS_SCRIPT_SELECTOR))
        })?;

    PageConfig::from_json(&json)
}

/// Registry holding all three Stripe presentation modes
pub fn stripe_strategies<P, C, D>(provider: Rc<P>, client: Rc<C>, page: Rc<D>) -> StrategySelector
where
    P: PaymentProvider + 'static,
    C: SessionClient + 'static,
    D: Page + 'static,
{
    StrategySelector::new()
        .with_strategy(Rc::new(StripeElementsStrategy::new(
            Rc::clone(&provider),
            Rc::clone(&client),
            Rc::clone(&page),
        )))
        .with_strategy(Rc::new(StripeEmbeddedStrategy::new(
            provider,
            Rc::clone(&client),
            Rc::clone(&page),
        )))
        .with_strategy(Rc::new(StripeHostedStrategy::new(client, page)))
}

/// Wire up the strategy named by `config`.
///
/// `make_provider` receives the validated publishable key and is not called
/// when the key is missing or malformed.
#[instrument(skip_all, fields(strategy = %config.strategy))]
pub async fn mount_from_page<P, C, D, F>(
    page: Rc<D>,
    client: Rc<C>,
    config: &PageConfig,
    make_provider: F,
) -> CheckoutResult<()>
where
    P: PaymentProvider + 'static,
    C: SessionClient + 'static,
    D: Page + 'static,
    F: FnOnce(&PublishableKey) -> CheckoutResult<Rc<P>>,
{
    let stripe = StripeClientConfig::from_page(&*page, &config.public_key_selector)?;
    if stripe.publishable_key.is_test_mode() {
        info!("using Stripe test mode key");
    }
    let provider = make_provider(&stripe.publishable_key)?;

    let settings = config.settings_with_cookies(&page.cookies()?);
    if settings.csrf_token.is_none() {
        warn!(
            cookie = %config.csrf_cookie_name,
            "no CSRF token found, session requests go out without X-CSRFToken"
        );
    }

    let selector = stripe_strategies(provider, client, page);
    selector.dispatch(config.strategy, &settings).await?;

    info!(checkout_url = %settings.checkout_url, "checkout ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::testing::{MockPage, MockProvider, MockSessionClient, ProviderCall};
    use checkout_core::StrategyKind;
    use serde_json::json;
    use std::cell::Cell;

    const HOSTED_CONFIG: &str = r##"{
        "strategy": "hosted",
        "checkoutUrl": "/checkout/hosted/",
        "confirmationBtnSelector": "#checkout-btn"
    }"##;

    #[test]
    fn test_read_page_config() {
        let page = MockPage::new().with_text(SETTINGS_SCRIPT_SELECTOR, HOSTED_CONFIG);
        let config = read_page_config(&page).unwrap();

        assert_eq!(config.strategy, StrategyKind::Hosted);
        assert_eq!(
            config.settings.confirmation_btn_selector.as_deref(),
            Some("#checkout-btn")
        );
    }

    #[test]
    fn test_read_page_config_errors() {
        let err = read_page_config(&MockPage::new()).unwrap_err();
        assert!(matches!(err, CheckoutError::ElementNotFound { .. }));

        let page = MockPage::new().with_text(SETTINGS_SCRIPT_SELECTOR, "  ");
        assert!(read_page_config(&page).unwrap_err().is_configuration());

        let page = MockPage::new().with_text(
            SETTINGS_SCRIPT_SELECTOR,
            r#"{"strategy": "redirect", "checkoutUrl": "/c/"}"#,
        );
        assert!(matches!(
            read_page_config(&page).unwrap_err(),
            CheckoutError::InvalidSettings(_)
        ));
    }

    #[test]
    fn test_registry_has_every_kind() {
        let selector = stripe_strategies(
            Rc::new(MockProvider::new()),
            Rc::new(MockSessionClient::new(json!({}))),
            Rc::new(MockPage::new()),
        );

        for kind in StrategyKind::ALL {
            assert!(selector.has_strategy(kind));
        }
    }

    #[tokio::test]
    async fn test_hosted_flow_uses_cookie_token() {
        let page = Rc::new(
            MockPage::new()
                .with_attribute("#payment-form", "data-public", "pk_test_abc123")
                .with_element("#checkout-btn")
                .with_cookies("sessionid=s1; csrftoken=cookie-tok"),
        );
        let client = Rc::new(MockSessionClient::new(
            json!({"checkoutSessionURL": "https://pay.example/s/1"}),
        ));
        let config = PageConfig::from_json(HOSTED_CONFIG).unwrap();

        mount_from_page(page.clone(), client.clone(), &config, |key| {
            assert_eq!(key.as_str(), "pk_test_abc123");
            Ok(Rc::new(MockProvider::new()))
        })
        .await
        .unwrap();

        page.click("#checkout-btn").await.unwrap();

        let requests = client.requests();
        assert_eq!(requests[0].checkout_url, "/checkout/hosted/");
        assert_eq!(requests[0].csrf_token.as_deref(), Some("cookie-tok"));
        assert_eq!(page.navigations(), vec!["https://pay.example/s/1".to_string()]);
    }

    #[tokio::test]
    async fn test_embedded_flow() {
        let page = Rc::new(
            MockPage::new()
                .with_attribute("#payment-form", "data-public", "pk_live_abc123")
                .with_element("#checkout")
                .with_element("#checkout-btn"),
        );
        let provider = Rc::new(MockProvider::new());
        let config = PageConfig::from_json(
            r##"{
                "strategy": "embedded",
                "checkoutUrl": "/checkout/embedded/",
                "checkoutElementSelector": "#checkout",
                "confirmationBtnSelector": "#checkout-btn"
            }"##,
        )
        .unwrap();

        mount_from_page(
            page.clone(),
            Rc::new(MockSessionClient::new(json!({"clientSecret": "cs_test_1"}))),
            &config,
            |_| Ok(Rc::clone(&provider)),
        )
        .await
        .unwrap();

        page.click("#checkout-btn").await.unwrap();
        assert_eq!(
            provider.count(|c| matches!(c, ProviderCall::MountEmbeddedCheckout { .. })),
            1
        );
    }

    #[tokio::test]
    async fn test_invalid_key_skips_provider() {
        let page = Rc::new(
            MockPage::new()
                .with_attribute("#payment-form", "data-public", "sk_live_secret")
                .with_element("#checkout-btn"),
        );
        let config = PageConfig::from_json(HOSTED_CONFIG).unwrap();
        let called = Cell::new(false);

        let err = mount_from_page(
            page.clone(),
            Rc::new(MockSessionClient::new(json!({}))),
            &config,
            |_| {
                called.set(true);
                Ok(Rc::new(MockProvider::new()))
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_configuration());
        assert!(!called.get());
        assert_eq!(page.listener_count("#checkout-btn"), 0);
    }
}
