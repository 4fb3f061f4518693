//! # checkout-core
//!
//! Core types and traits for the checkout-glue page layer.
//!
//! This crate provides:
//! - `CheckoutStrategy` trait and `StrategySelector` for presentation modes
//! - `Settings` and `PageConfig` for the configuration handed over by the page
//! - `Page`, `PaymentProvider`, and `SessionClient` ports to the browser,
//!   the provider SDK, and the session endpoint
//! - `get_cookie` and `Spinner` page utilities
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{PageConfig, StrategySelector};
//!
//! let config = PageConfig::from_json(&script_text)?;
//! let settings = config.settings_with_cookies(&page.cookies()?);
//!
//! // Strategies are registered by the provider crate
//! selector.dispatch(config.strategy, &settings).await?;
//! ```

pub mod cookie;
pub mod error;
pub mod page;
pub mod provider;
pub mod session;
pub mod settings;
pub mod strategy;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports for convenience
pub use cookie::{get_cookie, CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
pub use error::{CheckoutError, CheckoutResult};
pub use page::{ClickHandler, Page, Spinner, SpinnerState};
pub use provider::{
    ClientSecretFetcher, ConfirmOutcome, ConfirmParams, ElementsOptions, PaymentElementOptions,
    PaymentProvider, ProviderErrorPayload,
};
pub use session::{
    fetch_session, ClientSecretSession, HostedSession, PaymentIntentSession, SessionClient,
};
pub use settings::{Layout, PageConfig, Settings};
pub use strategy::{BoxedCheckoutStrategy, CheckoutStrategy, StrategyKind, StrategySelector};
