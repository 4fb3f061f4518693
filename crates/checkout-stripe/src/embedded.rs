//! # Embedded Checkout Strategy
//!
//! Stripe-rendered checkout form mounted inside one of our containers when
//! the customer clicks the confirmation button.

use async_trait::async_trait;
use checkout_core::{
    fetch_session, CheckoutError, CheckoutResult, CheckoutStrategy, ClickHandler,
    ClientSecretFetcher, ClientSecretSession, Page, PaymentProvider, SessionClient, Settings,
    StrategyKind,
};
use futures::FutureExt;
use std::rc::Rc;
use tracing::{debug, info, instrument};

/// Stripe embedded checkout strategy
pub struct StripeEmbeddedStrategy<P, C, D> {
    provider: Rc<P>,
    client: Rc<C>,
    page: Rc<D>,
}

/// What one click needs, captured when the listener is attached
#[derive(Clone)]
struct MountTarget {
    container: String,
    line_items: Option<String>,
    checkout_url: String,
    csrf_token: Option<String>,
}

impl<P, C, D> StripeEmbeddedStrategy<P, C, D>
where
    P: PaymentProvider + 'static,
    C: SessionClient + 'static,
    D: Page + 'static,
{
    pub fn new(provider: Rc<P>, client: Rc<C>, page: Rc<D>) -> Self {
        Self {
            provider,
            client,
            page,
        }
    }

    fn mount_handler(&self, target: MountTarget) -> ClickHandler {
        let provider = Rc::clone(&self.provider);
        let client = Rc::clone(&self.client);
        let page = Rc::clone(&self.page);

        Rc::new(move || {
            let provider = Rc::clone(&provider);
            let page = Rc::clone(&page);
            let target = target.clone();
            let fetcher = client_secret_fetcher(
                Rc::clone(&client),
                target.checkout_url.clone(),
                target.csrf_token.clone(),
            );

            async move {
                page.clear_contents(&target.container)?;

                let checkout = provider.init_embedded_checkout(fetcher).await?;

                if let Some(line_items) = &target.line_items {
                    // Already gone after the first mount
                    match page.remove_element(line_items) {
                        Err(CheckoutError::ElementNotFound { .. }) => {}
                        other => other?,
                    }
                }

                provider.mount_embedded_checkout(&checkout, &target.container)?;
                info!(selector = %target.container, "embedded checkout mounted");
                Ok(())
            }
            .boxed_local()
        })
    }
}

/// Token fetcher handed to the widget; it calls this itself when it needs a session.
fn client_secret_fetcher<C>(
    client: Rc<C>,
    checkout_url: String,
    csrf_token: Option<String>,
) -> ClientSecretFetcher
where
    C: SessionClient + 'static,
{
    Rc::new(move || {
        let client = Rc::clone(&client);
        let checkout_url = checkout_url.clone();
        let csrf_token = csrf_token.clone();

        async move {
            let session: ClientSecretSession =
                fetch_session(&*client, &checkout_url, csrf_token.as_deref()).await?;
            Ok(session.client_secret)
        }
        .boxed_local()
    })
}

#[async_trait(?Send)]
impl<P, C, D> CheckoutStrategy for StripeEmbeddedStrategy<P, C, D>
where
    P: PaymentProvider + 'static,
    C: SessionClient + 'static,
    D: Page + 'static,
{
    #[instrument(skip(self, settings), fields(strategy = "embedded", checkout_url = %settings.checkout_url))]
    async fn handle(&self, settings: &Settings) -> CheckoutResult<()> {
        let container = settings.checkout_element_selector()?;
        let button = settings.confirmation_btn_selector()?;

        let handler = self.mount_handler(MountTarget {
            container: container.to_string(),
            line_items: settings.line_items_selector.clone(),
            checkout_url: settings.checkout_url.clone(),
            csrf_token: settings.csrf_token.clone(),
        });
        self.page.on_click(button, handler)?;
        debug!(selector = button, "embedded checkout listener attached");

        Ok(())
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Embedded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::testing::{MockPage, MockProvider, MockSessionClient, ProviderCall};
    use serde_json::json;

    fn settings() -> Settings {
        Settings::new("/checkout/")
            .with_csrf_token("tok")
            .with_checkout_element_selector("#checkout")
            .with_confirmation_btn_selector("#checkout-btn")
    }

    fn page() -> Rc<MockPage> {
        Rc::new(
            MockPage::new()
                .with_element("#checkout")
                .with_element("#checkout-btn")
                .with_element("#checkout-line-items"),
        )
    }

    fn session() -> Rc<MockSessionClient> {
        Rc::new(MockSessionClient::new(json!({"clientSecret": "cs_test_1"})))
    }

    fn inits(provider: &MockProvider) -> usize {
        provider.count(|c| matches!(c, ProviderCall::InitEmbeddedCheckout))
    }

    #[tokio::test]
    async fn test_nothing_happens_before_click() {
        let provider = Rc::new(MockProvider::new());
        let client = session();
        let page = page();
        let strategy = StripeEmbeddedStrategy::new(provider.clone(), client.clone(), page.clone());

        strategy.handle(&settings()).await.unwrap();

        assert_eq!(page.listener_count("#checkout-btn"), 1);
        assert!(provider.calls().is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_click_initializes_once_and_mounts() {
        let provider = Rc::new(MockProvider::new());
        let client = session();
        let page = page();
        let strategy = StripeEmbeddedStrategy::new(provider.clone(), client.clone(), page.clone());

        strategy.handle(&settings()).await.unwrap();
        page.click("#checkout-btn").await.unwrap();

        assert_eq!(page.clear_count("#checkout"), 1);
        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::InitEmbeddedCheckout,
                ProviderCall::MountEmbeddedCheckout {
                    selector: "#checkout".into(),
                    client_secret: "cs_test_1".into(),
                },
            ]
        );
        assert_eq!(client.requests()[0].csrf_token.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_each_click_initializes_again() {
        let provider = Rc::new(MockProvider::new());
        let page = page();
        let strategy = StripeEmbeddedStrategy::new(provider.clone(), session(), page.clone());

        strategy.handle(&settings()).await.unwrap();
        page.click("#checkout-btn").await.unwrap();
        page.click("#checkout-btn").await.unwrap();

        assert_eq!(inits(&provider), 2);
        assert_eq!(page.clear_count("#checkout"), 2);
    }

    #[tokio::test]
    async fn test_double_click_overlaps_requests() {
        let provider = Rc::new(MockProvider::new());
        let client = session();
        let page = page();
        let strategy = StripeEmbeddedStrategy::new(provider.clone(), client.clone(), page.clone());

        strategy.handle(&settings()).await.unwrap();
        let (first, second) =
            futures::join!(page.click("#checkout-btn"), page.click("#checkout-btn"));
        first.unwrap();
        second.unwrap();

        // No reentrancy guard: both fetches are outstanding at the same time
        assert_eq!(client.requests().len(), 2);
        assert_eq!(client.max_in_flight(), 2);
        assert_eq!(inits(&provider), 2);
    }

    #[tokio::test]
    async fn test_line_items_removed_on_mount() {
        let page = page();
        let strategy =
            StripeEmbeddedStrategy::new(Rc::new(MockProvider::new()), session(), page.clone());

        strategy
            .handle(&settings().with_line_items_selector("#checkout-line-items"))
            .await
            .unwrap();
        page.click("#checkout-btn").await.unwrap();
        assert!(page.is_removed("#checkout-line-items"));

        page.click("#checkout-btn").await.unwrap();
    }

    #[tokio::test]
    async fn test_session_failure_skips_mount() {
        let provider = Rc::new(MockProvider::new());
        let page = page();
        let strategy = StripeEmbeddedStrategy::new(
            provider.clone(),
            Rc::new(MockSessionClient::failing("offline")),
            page.clone(),
        );

        strategy.handle(&settings()).await.unwrap();
        let err = page.click("#checkout-btn").await.unwrap_err();

        assert!(matches!(err, CheckoutError::Network(_)));
        assert_eq!(
            provider.count(|c| matches!(c, ProviderCall::MountEmbeddedCheckout { .. })),
            0
        );
    }

    #[tokio::test]
    async fn test_missing_container_setting() {
        let strategy =
            StripeEmbeddedStrategy::new(Rc::new(MockProvider::new()), session(), page());

        let settings = Settings::new("/checkout/").with_confirmation_btn_selector("#checkout-btn");
        let err = strategy.handle(&settings).await.unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::MissingSetting {
                name: "checkoutElementSelector"
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_button_element() {
        let page = Rc::new(MockPage::new().with_element("#checkout"));
        let strategy = StripeEmbeddedStrategy::new(Rc::new(MockProvider::new()), session(), page);

        let err = strategy.handle(&settings()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::ElementNotFound { selector } if selector == "#checkout-btn"));
    }
}
