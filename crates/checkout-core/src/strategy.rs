//! # Checkout Strategy Trait
//!
//! Core Strategy pattern trait for checkout presentation modes.
//!
//! ## Design Pattern
//!
//! Each presentation mode implements `CheckoutStrategy`; the page picks one
//! by `StrategyKind` at load time without knowing the concrete type.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CheckoutStrategy (trait)                   │
//! │  ├── handle(settings)                                       │
//! │  └── kind()                                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!  ┌───────┴───────┐ ┌───────┴───────┐ ┌───────┴───────┐
//!  │   Elements    │ │   Embedded    │ │    Hosted     │
//!  │   Strategy    │ │   Strategy    │ │   Strategy    │
//!  └───────────────┘ └───────────────┘ └───────────────┘
//! ```

use crate::error::{CheckoutError, CheckoutResult};
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Checkout presentation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Payment element mounted in the page, confirmed from our own button
    #[serde(alias = "custom")]
    Elements,
    /// Provider-rendered checkout widget embedded in a container
    Embedded,
    /// Full redirect to a provider-hosted checkout page
    Hosted,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Elements,
        StrategyKind::Embedded,
        StrategyKind::Hosted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Elements => "elements",
            StrategyKind::Embedded => "embedded",
            StrategyKind::Hosted => "hosted",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elements" | "custom" => Ok(StrategyKind::Elements),
            "embedded" => Ok(StrategyKind::Embedded),
            "hosted" => Ok(StrategyKind::Hosted),
            other => Err(CheckoutError::UnknownStrategy {
                kind: other.to_string(),
            }),
        }
    }
}

/// A checkout flow the page can run.
///
/// `handle` validates the settings it needs, performs whatever setup the mode
/// requires, and wires click listeners. Everything it does is a side effect on
/// the page or the provider.
#[async_trait(?Send)]
pub trait CheckoutStrategy {
    async fn handle(&self, settings: &Settings) -> CheckoutResult<()>;

    fn kind(&self) -> StrategyKind;
}

/// Type alias for a shared strategy (dynamic dispatch)
pub type BoxedCheckoutStrategy = Rc<dyn CheckoutStrategy>;

/// Registry of strategies keyed by kind
#[derive(Clone, Default)]
pub struct StrategySelector {
    strategies: HashMap<StrategyKind, BoxedCheckoutStrategy>,
}

impl StrategySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy, replacing any previous one of the same kind
    pub fn register(&mut self, strategy: BoxedCheckoutStrategy) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    /// Register with builder pattern
    pub fn with_strategy(mut self, strategy: BoxedCheckoutStrategy) -> Self {
        self.register(strategy);
        self
    }

    pub fn get(&self, kind: StrategyKind) -> Option<&BoxedCheckoutStrategy> {
        self.strategies.get(&kind)
    }

    pub fn has_strategy(&self, kind: StrategyKind) -> bool {
        self.strategies.contains_key(&kind)
    }

    /// Registered kinds in declaration order
    pub fn kinds(&self) -> Vec<StrategyKind> {
        StrategyKind::ALL
            .into_iter()
            .filter(|k| self.has_strategy(*k))
            .collect()
    }

    /// Run the strategy registered for `kind`
    pub async fn dispatch(&self, kind: StrategyKind, settings: &Settings) -> CheckoutResult<()> {
        let strategy = self
            .get(kind)
            .cloned()
            .ok_or_else(|| CheckoutError::UnknownStrategy {
                kind: kind.to_string(),
            })?;
        tracing::debug!(strategy = %kind, "dispatching checkout strategy");
        strategy.handle(settings).await
    }
}

impl fmt::Debug for StrategySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategySelector")
            .field("kinds", &self.kinds())
            .finish()
    }
}
