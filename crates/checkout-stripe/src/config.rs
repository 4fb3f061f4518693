//! # Stripe Client Configuration
//!
//! The browser side only ever sees the publishable key. The server renders
//! it into the payment form's `data-public` attribute.

use checkout_core::{CheckoutError, CheckoutResult, Page};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Attribute on the payment form carrying the publishable key
pub const PUBLIC_KEY_ATTRIBUTE: &str = "data-public";

/// Publishable key validation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishableKeyError {
    #[error("publishable key is empty")]
    Empty,

    #[error("publishable key must start with pk_test_ or pk_live_")]
    InvalidPrefix,

    #[error("publishable key may only contain ASCII letters and digits after its prefix")]
    InvalidCharacters,
}

impl From<PublishableKeyError> for CheckoutError {
    fn from(err: PublishableKeyError) -> Self {
        CheckoutError::Configuration(err.to_string())
    }
}

/// Stripe publishable key (pk_test_... or pk_live_...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishableKey(String);

impl PublishableKey {
    pub fn parse(raw: &str) -> Result<Self, PublishableKeyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PublishableKeyError::Empty);
        }

        let rest = raw
            .strip_prefix("pk_test_")
            .or_else(|| raw.strip_prefix("pk_live_"))
            .ok_or(PublishableKeyError::InvalidPrefix)?;

        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PublishableKeyError::InvalidCharacters);
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.0.starts_with("pk_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.0.starts_with("pk_live_")
    }
}

impl FromStr for PublishableKey {
    type Err = PublishableKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PublishableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-side Stripe configuration
#[derive(Debug, Clone)]
pub struct StripeClientConfig {
    pub publishable_key: PublishableKey,
}

impl StripeClientConfig {
    pub fn new(publishable_key: PublishableKey) -> Self {
        Self { publishable_key }
    }

    /// Load the publishable key from `data-public` on the element matched by
    /// `form_selector`.
    pub fn from_page<P: Page + ?Sized>(page: &P, form_selector: &str) -> CheckoutResult<Self> {
        let raw = page
            .attribute(form_selector, PUBLIC_KEY_ATTRIBUTE)?
            .ok_or_else(|| {
                CheckoutError::Configuration(format!(
                    "{} has no {} attribute",
                    form_selector, PUBLIC_KEY_ATTRIBUTE
                ))
            })?;

        Ok(Self::new(PublishableKey::parse(&raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::testing::MockPage;

    #[test]
    fn test_key_validation() {
        let key = PublishableKey::parse("pk_test_xyz789").unwrap();
        assert!(key.is_test_mode());
        assert!(!key.is_live_mode());

        let key: PublishableKey = "pk_live_ABC123".parse().unwrap();
        assert!(key.is_live_mode());
        assert_eq!(key.to_string(), "pk_live_ABC123");
    }

    #[test]
    fn test_invalid_keys() {
        assert_eq!(PublishableKey::parse("  "), Err(PublishableKeyError::Empty));
        assert_eq!(
            PublishableKey::parse("sk_test_abc123"),
            Err(PublishableKeyError::InvalidPrefix)
        );
        assert_eq!(
            PublishableKey::parse("pk_test_"),
            Err(PublishableKeyError::InvalidCharacters)
        );
        assert_eq!(
            PublishableKey::parse("pk_test_abc 123"),
            Err(PublishableKeyError::InvalidCharacters)
        );
    }

    #[test]
    fn test_from_page() {
        let page = MockPage::new().with_attribute("#payment-form", "data-public", "pk_test_abc");
        let config = StripeClientConfig::from_page(&page, "#payment-form").unwrap();
        assert_eq!(config.publishable_key.as_str(), "pk_test_abc");
    }

    #[test]
    fn test_from_page_missing_attribute() {
        let page = MockPage::new().with_element("#payment-form");
        let err = StripeClientConfig::from_page(&page, "#payment-form").unwrap_err();
        assert!(err.is_configuration());

        let err = StripeClientConfig::from_page(&page, "#other-form").unwrap_err();
        assert!(matches!(err, CheckoutError::ElementNotFound { .. }));
    }
}
