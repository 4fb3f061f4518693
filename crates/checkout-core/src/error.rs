//! # Checkout Error Types
//!
//! Typed error handling for the checkout page layer.
//! All strategy and port operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing publishable key, bad page config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A setting required by the selected strategy was not supplied
    #[error("Missing setting: {name}")]
    MissingSetting { name: &'static str },

    /// Settings payload could not be decoded
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// No strategy registered under the requested kind
    #[error("Unknown checkout strategy: {kind}")]
    UnknownStrategy { kind: String },

    /// Selector did not match any element on the page
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    /// DOM operation failed
    #[error("DOM error: {0}")]
    Dom(String),

    /// Network/transport error talking to the session endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Session endpoint answered with a non-success status
    #[error("Session request rejected with status {status}")]
    SessionRejected { status: u16, body: String },

    /// Session endpoint answered with a body we could not decode
    #[error("Invalid session response: {0}")]
    InvalidResponse(String),

    /// The payment provider SDK threw or rejected
    #[error("Provider error: {0}")]
    Provider(String),

    /// Browser navigation failed
    #[error("Navigation error: {0}")]
    Navigation(String),
}

impl CheckoutError {
    /// Returns true for failures of the fetch round trip to the session endpoint
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CheckoutError::Network(_)
                | CheckoutError::SessionRejected { .. }
                | CheckoutError::InvalidResponse(_)
        )
    }

    /// Returns true for errors caused by how the page was set up
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CheckoutError::Configuration(_)
                | CheckoutError::MissingSetting { .. }
                | CheckoutError::InvalidSettings(_)
                | CheckoutError::UnknownStrategy { .. }
        )
    }

    pub fn element_not_found(selector: impl Into<String>) -> Self {
        CheckoutError::ElementNotFound {
            selector: selector.into(),
        }
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::InvalidResponse(err.to_string())
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
