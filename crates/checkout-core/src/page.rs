//! # Page Port
//!
//! The slice of the browser page the strategies touch: click listeners,
//! container clearing, element styling, alerts, and navigation.
//!
//! The browser adapter lives in `checkout-wasm`; tests use the in-memory
//! `MockPage` from the `testing` module.

use crate::error::CheckoutResult;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::warn;

/// Work started by a click. Every click produces a fresh future and nothing
/// stops a second click from starting another one while the first is pending.
pub type ClickHandler = Rc<dyn Fn() -> LocalBoxFuture<'static, CheckoutResult<()>>>;

/// DOM operations used by the checkout strategies.
///
/// Element lookups go through CSS selectors; a selector that matches nothing
/// is reported as `CheckoutError::ElementNotFound`.
pub trait Page {
    /// Attach `handler` to the click event of the first match of `selector`.
    fn on_click(&self, selector: &str, handler: ClickHandler) -> CheckoutResult<()>;

    /// Drop all children of the matched element.
    fn clear_contents(&self, selector: &str) -> CheckoutResult<()>;

    /// Detach the matched element from the document.
    fn remove_element(&self, selector: &str) -> CheckoutResult<()>;

    fn set_disabled(&self, selector: &str, disabled: bool) -> CheckoutResult<()>;

    fn set_style(&self, selector: &str, property: &str, value: &str) -> CheckoutResult<()>;

    fn attribute(&self, selector: &str, name: &str) -> CheckoutResult<Option<String>>;

    fn text_content(&self, selector: &str) -> CheckoutResult<Option<String>>;

    /// Raw `document.cookie` string
    fn cookies(&self) -> CheckoutResult<String>;

    /// Absolute URL of the current document
    fn location(&self) -> CheckoutResult<String>;

    /// Blocking user-facing message
    fn alert(&self, message: &str);

    /// Navigate away without leaving a history entry
    fn replace_location(&self, url: &str) -> CheckoutResult<()>;
}

/// Loading state of the submit control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerState {
    Loading,
    Idle,
}

impl SpinnerState {
    pub fn from_flag(show: bool) -> Self {
        if show {
            SpinnerState::Loading
        } else {
            SpinnerState::Idle
        }
    }

    pub fn button_disabled(&self) -> bool {
        matches!(self, SpinnerState::Loading)
    }

    pub fn spinner_display(&self) -> &'static str {
        match self {
            SpinnerState::Loading => "inline-block",
            SpinnerState::Idle => "none",
        }
    }

    pub fn button_opacity(&self) -> &'static str {
        match self {
            SpinnerState::Loading => "0.5",
            SpinnerState::Idle => "1",
        }
    }
}

/// Spinner element plus the submit button it decorates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spinner {
    #[serde(default = "default_spinner_selector")]
    pub spinner_selector: String,
    #[serde(default = "default_button_selector")]
    pub button_selector: String,
}

fn default_spinner_selector() -> String {
    "#spinner".to_string()
}

fn default_button_selector() -> String {
    "#payNowButton".to_string()
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            spinner_selector: default_spinner_selector(),
            button_selector: default_button_selector(),
        }
    }
}

impl Spinner {
    pub fn new(spinner_selector: impl Into<String>, button_selector: impl Into<String>) -> Self {
        Self {
            spinner_selector: spinner_selector.into(),
            button_selector: button_selector.into(),
        }
    }

    /// Flip between loading and idle in one step.
    pub fn show<P: Page + ?Sized>(&self, page: &P, show: bool) -> CheckoutResult<()> {
        self.apply(page, SpinnerState::from_flag(show))
    }

    /// Apply `state`. A loading state that fails partway is rolled back to
    /// idle so the button is never left disabled.
    pub fn apply<P: Page + ?Sized>(&self, page: &P, state: SpinnerState) -> CheckoutResult<()> {
        let applied = self.apply_steps(page, state);
        if applied.is_err() && state == SpinnerState::Loading {
            self.reset(page);
        }
        applied
    }

    fn apply_steps<P: Page + ?Sized>(&self, page: &P, state: SpinnerState) -> CheckoutResult<()> {
        page.set_disabled(&self.button_selector, state.button_disabled())?;
        page.set_style(&self.spinner_selector, "display", state.spinner_display())?;
        page.set_style(&self.button_selector, "opacity", state.button_opacity())
    }

    /// Best-effort return to idle; every step is attempted.
    fn reset<P: Page + ?Sized>(&self, page: &P) {
        let idle = SpinnerState::Idle;
        let steps = [
            page.set_disabled(&self.button_selector, idle.button_disabled()),
            page.set_style(&self.spinner_selector, "display", idle.spinner_display()),
            page.set_style(&self.button_selector, "opacity", idle.button_opacity()),
        ];
        for err in steps.into_iter().filter_map(Result::err) {
            warn!(error = %err, "spinner reset incomplete");
        }
    }
}
