//! # checkout-stripe
//!
//! Stripe presentation modes for the checkout page.
//!
//! This crate provides three strategies, one per checkout template:
//!
//! 1. **StripeElementsStrategy** - Payment Element on our own page
//!    - Mounted at page load
//!    - `confirmPayment` on the page's submit button
//!    - Best for: custom checkout forms
//!
//! 2. **StripeEmbeddedStrategy** - Embedded Checkout
//!    - Stripe-rendered form inside one of our containers
//!    - Initialized on click, fresh session per click
//!
//! 3. **StripeHostedStrategy** - Hosted Checkout
//!    - Full redirect to checkout.stripe.com
//!
//! All three talk to the session endpoint through [`HttpSessionClient`] and
//! to Stripe.js through a `PaymentProvider` supplied by the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_stripe::{mount_from_page, read_page_config, HttpSessionClient};
//! use std::rc::Rc;
//!
//! let config = read_page_config(&*page)?;
//! let client = Rc::new(HttpSessionClient::for_page(&*page)?);
//!
//! mount_from_page(page, client, &config, |key| {
//!     Ok(Rc::new(StripeJsProvider::new(key.as_str())?))
//! })
//! .await?;
//! ```

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod elements;
pub mod embedded;
pub mod hosted;

// Re-exports
pub use bootstrap::{mount_from_page, read_page_config, stripe_strategies, SETTINGS_SCRIPT_SELECTOR};
pub use client::HttpSessionClient;
pub use config::{PublishableKey, PublishableKeyError, StripeClientConfig, PUBLIC_KEY_ATTRIBUTE};
pub use elements::StripeElementsStrategy;
pub use embedded::StripeEmbeddedStrategy;
pub use hosted::StripeHostedStrategy;
