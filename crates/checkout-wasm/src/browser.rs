//! # Browser Page
//!
//! `Page` implemented on `web-sys`. Selectors resolve through
//! `document.querySelector`, so only the first match is ever touched.

use crate::provider::describe_js_error;
use checkout_core::{CheckoutError, CheckoutResult, ClickHandler, Page};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlDocument, HtmlElement, Window};

/// Live DOM of the current window
#[derive(Debug, Clone)]
pub struct BrowserPage {
    window: Window,
    document: Document,
}

impl BrowserPage {
    pub fn new() -> CheckoutResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| CheckoutError::Dom("no global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| CheckoutError::Dom("window has no document".to_string()))?;
        Ok(Self { window, document })
    }

    fn query(&self, selector: &str) -> CheckoutResult<Element> {
        self.document
            .query_selector(selector)
            .map_err(|e| dom_error(selector, e))?
            .ok_or_else(|| CheckoutError::element_not_found(selector))
    }

    fn query_html(&self, selector: &str) -> CheckoutResult<HtmlElement> {
        self.query(selector)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| CheckoutError::Dom(format!("{} is not an HTML element", selector)))
    }
}

impl Page for BrowserPage {
    fn on_click(&self, selector: &str, handler: ClickHandler) -> CheckoutResult<()> {
        let element = self.query(selector)?;
        let target = selector.to_string();

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();

            let work = handler();
            let target = target.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = work.await {
                    tracing::error!(selector = %target, error = %err, "checkout action failed");
                }
            });
        });

        element
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(|e| dom_error(selector, e))?;
        // Listener lives as long as the page
        closure.forget();

        Ok(())
    }

    fn clear_contents(&self, selector: &str) -> CheckoutResult<()> {
        self.query(selector)?.set_inner_html("");
        Ok(())
    }

    fn remove_element(&self, selector: &str) -> CheckoutResult<()> {
        self.query(selector)?.remove();
        Ok(())
    }

    fn set_disabled(&self, selector: &str, disabled: bool) -> CheckoutResult<()> {
        // `disabled` lives on the concrete element interfaces, not on HtmlElement
        let element = self.query(selector)?;
        js_sys::Reflect::set(
            &element,
            &JsValue::from_str("disabled"),
            &JsValue::from_bool(disabled),
        )
        .map(|_| ())
        .map_err(|e| dom_error(selector, e))
    }

    fn set_style(&self, selector: &str, property: &str, value: &str) -> CheckoutResult<()> {
        self.query_html(selector)?
            .style()
            .set_property(property, value)
            .map_err(|e| dom_error(selector, e))
    }

    fn attribute(&self, selector: &str, name: &str) -> CheckoutResult<Option<String>> {
        Ok(self.query(selector)?.get_attribute(name))
    }

    fn text_content(&self, selector: &str) -> CheckoutResult<Option<String>> {
        Ok(self.query(selector)?.text_content())
    }

    fn cookies(&self) -> CheckoutResult<String> {
        self.document
            .clone()
            .dyn_into::<HtmlDocument>()
            .map_err(|_| CheckoutError::Dom("document is not an HTML document".to_string()))?
            .cookie()
            .map_err(|e| dom_error("document.cookie", e))
    }

    fn location(&self) -> CheckoutResult<String> {
        self.window
            .location()
            .href()
            .map_err(|e| dom_error("location.href", e))
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            tracing::warn!(error = %describe_js_error(&e), "alert failed");
        }
    }

    fn replace_location(&self, url: &str) -> CheckoutResult<()> {
        self.window
            .location()
            .replace(url)
            .map_err(|e| CheckoutError::Navigation(format!("{}: {}", url, describe_js_error(&e))))
    }
}

fn dom_error(context: &str, value: JsValue) -> CheckoutError {
    CheckoutError::Dom(format!("{}: {}", context, describe_js_error(&value)))
}
