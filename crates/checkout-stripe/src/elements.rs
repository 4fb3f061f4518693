//! # Payment Element Strategy
//!
//! Custom checkout built from Stripe Elements: the page hosts the payment
//! element and its own confirm button.
//!
//! Flow:
//! 1. `POST checkoutUrl` → `{clientSecret, appearance}`
//! 2. `stripe.elements({appearance, clientSecret})`
//! 3. `elements.create("payment", {layout}).mount(paymentElementSelector)`
//! 4. click on `confirmPaymentElementSelector` → `stripe.confirmPayment(...)`
//!
//! The elements handle is moved into the click listener when it is built;
//! there is no shared mutable binding between mount and confirmation.

use async_trait::async_trait;
use checkout_core::{
    fetch_session, CheckoutResult, CheckoutStrategy, ClickHandler, ConfirmOutcome, ConfirmParams,
    ElementsOptions, Page, PaymentElementOptions, PaymentIntentSession, PaymentProvider,
    SessionClient, Settings, Spinner, StrategyKind,
};
use futures::FutureExt;
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};

/// Stripe Elements strategy
pub struct StripeElementsStrategy<P, C, D> {
    provider: Rc<P>,
    client: Rc<C>,
    page: Rc<D>,
}

impl<P, C, D> StripeElementsStrategy<P, C, D>
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

    /// Fetch the payment intent session and mount the payment element.
    async fn initialize(
        &self,
        settings: &Settings,
        payment_selector: &str,
    ) -> CheckoutResult<P::Elements> {
        let session: PaymentIntentSession = fetch_session(
            &*self.client,
            &settings.checkout_url,
            settings.csrf_token.as_deref(),
        )
        .await?;

        let elements = self.provider.elements(&ElementsOptions {
            client_secret: session.client_secret,
            appearance: session.appearance,
        })?;
        let payment_element = self.provider.create_payment_element(
            &elements,
            &PaymentElementOptions {
                layout: settings.layout,
            },
        )?;
        self.provider.mount_element(&payment_element, payment_selector)?;

        Ok(elements)
    }

    fn confirm_handler(
        &self,
        elements: P::Elements,
        params: ConfirmParams,
        spinner: Option<Spinner>,
    ) -> ClickHandler {
        let provider = Rc::clone(&self.provider);
        let page = Rc::clone(&self.page);

        Rc::new(move || {
            let provider = Rc::clone(&provider);
            let page = Rc::clone(&page);
            let elements = elements.clone();
            let params = params.clone();
            let spinner = spinner.clone();

            async move {
                confirm_payment(&*provider, &*page, &elements, &params, spinner.as_ref()).await
            }
            .boxed_local()
        })
    }
}

async fn confirm_payment<P, D>(
    provider: &P,
    page: &D,
    elements: &P::Elements,
    params: &ConfirmParams,
    spinner: Option<&Spinner>,
) -> CheckoutResult<()>
where
    P: PaymentProvider,
    D: Page,
{
    if let Some(spinner) = spinner {
        spinner.show(page, true)?;
    }
    let outcome = provider.confirm_payment(elements, params).await;
    let restored = restore_spinner(page, spinner);

    // The decline still reaches the customer when the spinner cannot be restored
    report_outcome(page, outcome?);
    restored
}

fn restore_spinner<D: Page + ?Sized>(page: &D, spinner: Option<&Spinner>) -> CheckoutResult<()> {
    spinner.map_or(Ok(()), |spinner| spinner.show(page, false))
}

/// Surface a failed confirmation to the customer.
///
/// A resolved outcome without `error` means the provider accepted the
/// confirmation and is redirecting to the return URL itself.
fn report_outcome<D: Page + ?Sized>(page: &D, outcome: ConfirmOutcome) {
    let Some(error) = outcome.error else {
        debug!("payment confirmed, provider handles the redirect");
        return;
    };

    match error.user_message() {
        Some(message) => {
            error!(code = ?error.code, kind = ?error.kind, "payment confirmation failed: {}", message);
            page.alert(message);
        }
        None => {
            warn!(code = ?error.code, kind = ?error.kind, "payment confirmation failed without a message");
        }
    }
}

#[async_trait(?Send)]
impl<P, C, D> CheckoutStrategy for StripeElementsStrategy<P, C, D>
where
    P: PaymentProvider + 'static,
    C: SessionClient + 'static,
    D: Page + 'static,
{
    #[instrument(skip(self, settings), fields(strategy = "elements", checkout_url = %settings.checkout_url))]
    async fn handle(&self, settings: &Settings) -> CheckoutResult<()> {
        let payment_selector = settings.payment_element_selector()?;
        let confirm_selector = settings.confirm_payment_element_selector()?;
        let params = ConfirmParams {
            return_url: settings.return_url()?.to_string(),
        };

        if let Some(spinner) = &settings.spinner {
            spinner.show(&*self.page, true)?;
        }
        let initialized = self.initialize(settings, payment_selector).await;
        let restored = restore_spinner(&*self.page, settings.spinner.as_ref());
        let elements = initialized?;
        restored?;
        info!(selector = payment_selector, "payment element mounted");

        let handler = self.confirm_handler(elements, params, settings.spinner.clone());
        self.page.on_click(confirm_selector, handler)?;
        debug!(selector = confirm_selector, "confirm listener attached");

        Ok(())
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Elements
    }
}
