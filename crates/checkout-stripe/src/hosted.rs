//! # Hosted Checkout Strategy
//!
//! Full redirect to the Stripe-hosted checkout page. No client-side state
//! survives the click.

use async_trait::async_trait;
use checkout_core::{
    fetch_session, CheckoutResult, CheckoutStrategy, ClickHandler, HostedSession, Page,
    SessionClient, Settings, StrategyKind,
};
use futures::FutureExt;
use std::rc::Rc;
use tracing::{debug, info, instrument};

/// Stripe hosted checkout strategy
pub struct StripeHostedStrategy<C, D> {
    client: Rc<C>,
    page: Rc<D>,
}

impl<C, D> StripeHostedStrategy<C, D>
where
    C: SessionClient + 'static,
    D: Page + 'static,
{
    pub fn new(client: Rc<C>, page: Rc<D>) -> Self {
        Self { client, page }
    }

    fn redirect_handler(&self, checkout_url: String, csrf_token: Option<String>) -> ClickHandler {
        let client = Rc::clone(&self.client);
        let page = Rc::clone(&self.page);

        Rc::new(move || {
            let client = Rc::clone(&client);
            let page = Rc::clone(&page);
            let checkout_url = checkout_url.clone();
            let csrf_token = csrf_token.clone();

            async move {
                let session: HostedSession =
                    fetch_session(&*client, &checkout_url, csrf_token.as_deref()).await?;
                info!(url = %session.checkout_session_url, "redirecting to hosted checkout");
                page.replace_location(&session.checkout_session_url)
            }
            .boxed_local()
        })
    }
}

#[async_trait(?Send)]
impl<C, D> CheckoutStrategy for StripeHostedStrategy<C, D>
where
    C: SessionClient + 'static,
    D: Page + 'static,
{
    #[instrument(skip(self, settings), fields(strategy = "hosted", checkout_url = %settings.checkout_url))]
    async fn handle(&self, settings: &Settings) -> CheckoutResult<()> {
        let button = settings.confirmation_btn_selector()?;

        let handler =
            self.redirect_handler(settings.checkout_url.clone(), settings.csrf_token.clone());
        self.page.on_click(button, handler)?;
        debug!(selector = button, "hosted checkout listener attached");

        Ok(())
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Hosted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::testing::{MockPage, MockSessionClient};
    use checkout_core::CheckoutError;
    use serde_json::json;

    fn settings() -> Settings {
        Settings::new("/checkout/")
            .with_csrf_token("tok")
            .with_confirmation_btn_selector("#checkout-btn")
    }

    fn page() -> Rc<MockPage> {
        Rc::new(MockPage::new().with_element("#checkout-btn"))
    }

    fn session() -> Rc<MockSessionClient> {
        Rc::new(MockSessionClient::new(
            json!({"checkoutSessionURL": "https://pay.example/s/1"}),
        ))
    }

    #[tokio::test]
    async fn test_click_redirects_to_session_url() {
        let client = session();
        let page = page();
        let strategy = StripeHostedStrategy::new(client.clone(), page.clone());

        strategy.handle(&settings()).await.unwrap();
        assert!(client.requests().is_empty());

        page.click("#checkout-btn").await.unwrap();

        assert_eq!(page.navigations(), vec!["https://pay.example/s/1".to_string()]);
        assert_eq!(page.dom_mutations(), 0);
        assert!(page.alerts().is_empty());
        assert_eq!(client.requests()[0].checkout_url, "/checkout/");
    }

    #[tokio::test]
    async fn test_network_failure_stays_on_page() {
        let page = page();
        let strategy =
            StripeHostedStrategy::new(Rc::new(MockSessionClient::failing("offline")), page.clone());

        strategy.handle(&settings()).await.unwrap();
        let err = page.click("#checkout-btn").await.unwrap_err();

        assert!(err.is_transport());
        assert!(page.navigations().is_empty());
        assert!(page.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_session_response() {
        let page = page();
        let strategy = StripeHostedStrategy::new(
            Rc::new(MockSessionClient::new(json!({"clientSecret": "cs_test_1"}))),
            page.clone(),
        );

        strategy.handle(&settings()).await.unwrap();
        let err = page.click("#checkout-btn").await.unwrap_err();

        assert!(matches!(err, CheckoutError::InvalidResponse(_)));
        assert!(page.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_double_click_sends_two_requests() {
        let client = session();
        let page = page();
        let strategy = StripeHostedStrategy::new(client.clone(), page.clone());

        strategy.handle(&settings()).await.unwrap();
        let (first, second) =
            futures::join!(page.click("#checkout-btn"), page.click("#checkout-btn"));
        first.unwrap();
        second.unwrap();

        assert_eq!(client.max_in_flight(), 2);
        assert_eq!(page.navigations().len(), 2);
    }
}
