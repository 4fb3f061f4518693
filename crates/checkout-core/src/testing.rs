//! In-memory doubles for the page, provider, and session ports.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! downstream crates' tests.

use crate::error::{CheckoutError, CheckoutResult};
use crate::page::{ClickHandler, Page};
use crate::provider::{
    ClientSecretFetcher, ConfirmOutcome, ConfirmParams, ElementsOptions, PaymentElementOptions,
    PaymentProvider,
};
use crate::session::SessionClient;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Recorded state of one element on a `MockPage`
#[derive(Debug, Clone, Default)]
pub struct ElementState {
    pub disabled: bool,
    pub styles: HashMap<String, String>,
    pub attributes: HashMap<String, String>,
    pub text: Option<String>,
    pub clear_count: usize,
    pub removed: bool,
}

/// Page double keyed by selector
pub struct MockPage {
    elements: RefCell<HashMap<String, ElementState>>,
    handlers: RefCell<HashMap<String, Vec<ClickHandler>>>,
    alerts: RefCell<Vec<String>>,
    navigations: RefCell<Vec<String>>,
    mutations: Cell<usize>,
    cookies: String,
    location: String,
    rejected_disabled: Option<(String, bool)>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            elements: RefCell::new(HashMap::new()),
            handlers: RefCell::new(HashMap::new()),
            alerts: RefCell::new(Vec::new()),
            navigations: RefCell::new(Vec::new()),
            mutations: Cell::new(0),
            cookies: String::new(),
            location: "http://localhost:8000/checkout/".to_string(),
            rejected_disabled: None,
        }
    }

    pub fn with_element(self, selector: &str) -> Self {
        self.elements
            .borrow_mut()
            .entry(selector.to_string())
            .or_default();
        self
    }

    pub fn with_attribute(self, selector: &str, name: &str, value: &str) -> Self {
        self.elements
            .borrow_mut()
            .entry(selector.to_string())
            .or_default()
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(self, selector: &str, text: &str) -> Self {
        self.elements
            .borrow_mut()
            .entry(selector.to_string())
            .or_default()
            .text = Some(text.to_string());
        self
    }

    pub fn with_cookies(mut self, cookies: &str) -> Self {
        self.cookies = cookies.to_string();
        self
    }

    pub fn with_location(mut self, url: &str) -> Self {
        self.location = url.to_string();
        self
    }

    /// Make `set_disabled(selector, disabled)` fail with a DOM error
    pub fn rejecting_disabled(mut self, selector: &str, disabled: bool) -> Self {
        self.rejected_disabled = Some((selector.to_string(), disabled));
        self
    }

    /// Fire every listener registered on `selector` and wait for them in
    /// registration order. The returned future owns its handlers, so several
    /// clicks can be in flight at once.
    pub fn click(&self, selector: &str) -> LocalBoxFuture<'static, CheckoutResult<()>> {
        let handlers = self
            .handlers
            .borrow()
            .get(selector)
            .cloned()
            .unwrap_or_default();
        Box::pin(async move {
            for handler in handlers {
                handler().await?;
            }
            Ok(())
        })
    }

    pub fn listener_count(&self, selector: &str) -> usize {
        self.handlers
            .borrow()
            .get(selector)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn element(&self, selector: &str) -> Option<ElementState> {
        self.elements.borrow().get(selector).cloned()
    }

    pub fn is_disabled(&self, selector: &str) -> bool {
        self.element(selector).map(|e| e.disabled).unwrap_or(false)
    }

    pub fn style(&self, selector: &str, property: &str) -> Option<String> {
        self.element(selector)
            .and_then(|e| e.styles.get(property).cloned())
    }

    pub fn clear_count(&self, selector: &str) -> usize {
        self.element(selector).map(|e| e.clear_count).unwrap_or(0)
    }

    pub fn is_removed(&self, selector: &str) -> bool {
        self.element(selector).map(|e| e.removed).unwrap_or(false)
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    /// Number of clear/remove/disable/style operations applied so far
    pub fn dom_mutations(&self) -> usize {
        self.mutations.get()
    }

    fn with_live<T>(
        &self,
        selector: &str,
        f: impl FnOnce(&mut ElementState) -> T,
    ) -> CheckoutResult<T> {
        let mut elements = self.elements.borrow_mut();
        match elements.get_mut(selector) {
            Some(element) if !element.removed => Ok(f(element)),
            _ => Err(CheckoutError::element_not_found(selector)),
        }
    }

    fn mutate(
        &self,
        selector: &str,
        f: impl FnOnce(&mut ElementState),
    ) -> CheckoutResult<()> {
        self.with_live(selector, f)?;
        self.mutations.set(self.mutations.get() + 1);
        Ok(())
    }
}

impl Page for MockPage {
    fn on_click(&self, selector: &str, handler: ClickHandler) -> CheckoutResult<()> {
        self.with_live(selector, |_| ())?;
        self.handlers
            .borrow_mut()
            .entry(selector.to_string())
            .or_default()
            .push(handler);
        Ok(())
    }

    fn clear_contents(&self, selector: &str) -> CheckoutResult<()> {
        self.mutate(selector, |e| e.clear_count += 1)
    }

    fn remove_element(&self, selector: &str) -> CheckoutResult<()> {
        self.mutate(selector, |e| e.removed = true)
    }

    fn set_disabled(&self, selector: &str, disabled: bool) -> CheckoutResult<()> {
        if let Some((rejected, value)) = &self.rejected_disabled {
            if rejected == selector && *value == disabled {
                return Err(CheckoutError::Dom(format!(
                    "{} refused disabled={}",
                    selector, disabled
                )));
            }
        }
        self.mutate(selector, |e| e.disabled = disabled)
    }

    fn set_style(&self, selector: &str, property: &str, value: &str) -> CheckoutResult<()> {
        self.mutate(selector, |e| {
            e.styles.insert(property.to_string(), value.to_string());
        })
    }

    fn attribute(&self, selector: &str, name: &str) -> CheckoutResult<Option<String>> {
        self.with_live(selector, |e| e.attributes.get(name).cloned())
    }

    fn text_content(&self, selector: &str) -> CheckoutResult<Option<String>> {
        self.with_live(selector, |e| e.text.clone())
    }

    fn cookies(&self) -> CheckoutResult<String> {
        Ok(self.cookies.clone())
    }

    fn location(&self) -> CheckoutResult<String> {
        Ok(self.location.clone())
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn replace_location(&self, url: &str) -> CheckoutResult<()> {
        self.navigations.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// Calls observed by `MockProvider`, in order
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Elements(ElementsOptions),
    CreatePaymentElement(PaymentElementOptions),
    MountElement(String),
    InitEmbeddedCheckout,
    MountEmbeddedCheckout {
        selector: String,
        client_secret: String,
    },
    ConfirmPayment {
        client_secret: String,
        return_url: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockElements {
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockPaymentElement;

#[derive(Debug, Clone, PartialEq)]
pub struct MockEmbeddedCheckout {
    pub client_secret: String,
}

/// Provider double that records calls and resolves confirmations with a
/// configurable outcome.
#[derive(Default)]
pub struct MockProvider {
    calls: RefCell<Vec<ProviderCall>>,
    confirm_outcome: RefCell<ConfirmOutcome>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirm_outcome(self, outcome: ConfirmOutcome) -> Self {
        *self.confirm_outcome.borrow_mut() = outcome;
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, predicate: impl Fn(&ProviderCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl PaymentProvider for MockProvider {
    type Elements = MockElements;
    type Element = MockPaymentElement;
    type EmbeddedCheckout = MockEmbeddedCheckout;

    fn elements(&self, options: &ElementsOptions) -> CheckoutResult<MockElements> {
        self.record(ProviderCall::Elements(options.clone()));
        Ok(MockElements {
            client_secret: options.client_secret.clone(),
        })
    }

    fn create_payment_element(
        &self,
        _elements: &MockElements,
        options: &PaymentElementOptions,
    ) -> CheckoutResult<MockPaymentElement> {
        self.record(ProviderCall::CreatePaymentElement(*options));
        Ok(MockPaymentElement)
    }

    fn mount_element(&self, _element: &MockPaymentElement, selector: &str) -> CheckoutResult<()> {
        self.record(ProviderCall::MountElement(selector.to_string()));
        Ok(())
    }

    async fn init_embedded_checkout(
        &self,
        fetch_client_secret: ClientSecretFetcher,
    ) -> CheckoutResult<MockEmbeddedCheckout> {
        self.record(ProviderCall::InitEmbeddedCheckout);
        let client_secret = fetch_client_secret().await?;
        Ok(MockEmbeddedCheckout { client_secret })
    }

    fn mount_embedded_checkout(
        &self,
        checkout: &MockEmbeddedCheckout,
        selector: &str,
    ) -> CheckoutResult<()> {
        self.record(ProviderCall::MountEmbeddedCheckout {
            selector: selector.to_string(),
            client_secret: checkout.client_secret.clone(),
        });
        Ok(())
    }

    async fn confirm_payment(
        &self,
        elements: &MockElements,
        params: &ConfirmParams,
    ) -> CheckoutResult<ConfirmOutcome> {
        self.record(ProviderCall::ConfirmPayment {
            client_secret: elements.client_secret.clone(),
            return_url: params.return_url.clone(),
        });
        tokio::task::yield_now().await;
        Ok(self.confirm_outcome.borrow().clone())
    }
}

/// A session request seen by `MockSessionClient`
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub checkout_url: String,
    pub csrf_token: Option<String>,
}

/// Session endpoint double. Each request yields to the runtime once before
/// answering so that overlapping requests are observable.
pub struct MockSessionClient {
    response: Value,
    failure: Option<String>,
    requests: RefCell<Vec<SessionRequest>>,
    in_flight: Cell<usize>,
    max_in_flight: Cell<usize>,
}

impl MockSessionClient {
    pub fn new(response: Value) -> Self {
        Self {
            response,
            failure: None,
            requests: RefCell::new(Vec::new()),
            in_flight: Cell::new(0),
            max_in_flight: Cell::new(0),
        }
    }

    /// Every request fails with a network error
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Value::Null)
        }
    }

    pub fn requests(&self) -> Vec<SessionRequest> {
        self.requests.borrow().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.get()
    }
}

#[async_trait(?Send)]
impl SessionClient for MockSessionClient {
    async fn request_session(
        &self,
        checkout_url: &str,
        csrf_token: Option<&str>,
    ) -> CheckoutResult<Value> {
        self.requests.borrow_mut().push(SessionRequest {
            checkout_url: checkout_url.to_string(),
            csrf_token: csrf_token.map(str::to_owned),
        });

        let in_flight = self.in_flight.get() + 1;
        self.in_flight.set(in_flight);
        self.max_in_flight.set(self.max_in_flight.get().max(in_flight));

        tokio::task::yield_now().await;

        self.in_flight.set(self.in_flight.get() - 1);
        match &self.failure {
            Some(message) => Err(CheckoutError::Network(message.clone())),
            None => Ok(self.response.clone()),
        }
    }
}
