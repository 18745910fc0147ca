#![forbid(unsafe_code)]

//! Fullscreen API dispatch across vendor prefixes.
//!
//! The typed `web-sys` surface only covers the standard names, so the
//! prefixed variants (`webkitRequestFullscreen`, `msRequestFullscreen`, …)
//! are resolved reflectively from the name tables in
//! [`gridfall_core::fullscreen`]. The standard request path returns a
//! promise whose rejection must be caught — a user gesture requirement
//! violation is a log line, not an uncaught rejection.

use gridfall_core::fullscreen::{CHANGE_EVENT_NAMES, FullscreenVendor};
use js_sys::Reflect;
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

use crate::dom::console_error;

fn method_on(target: &JsValue, name: &str) -> Option<js_sys::Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
}

/// Pick the first vendor whose request method exists on the root element.
#[must_use]
pub fn detect_vendor(document: &Document) -> Option<FullscreenVendor> {
    let root = document.document_element()?;
    let vendor = FullscreenVendor::ALL
        .into_iter()
        .find(|vendor| method_on(root.as_ref(), vendor.api().request_method).is_some());
    debug!(?vendor, "fullscreen vendor detected");
    vendor
}

/// Request fullscreen on the root element.
pub fn enter_fullscreen(document: &Document, vendor: FullscreenVendor) -> Result<(), JsValue> {
    let root: Element = document
        .document_element()
        .ok_or_else(|| JsValue::from_str("document has no root element"))?;
    let api = vendor.api();
    let request = method_on(root.as_ref(), api.request_method)
        .ok_or_else(|| JsValue::from_str(api.request_method))?;
    let value = request.call0(root.as_ref())?;

    // The standard variant returns a promise that rejects when the browser
    // refuses (no user gesture, iframe policy).
    if let Some(promise) = value.dyn_ref::<js_sys::Promise>() {
        let report = Closure::once_into_js(move |err: JsValue| {
            console_error(&format!("Erreur plein écran: {err:?}"));
        });
        let _ = promise.catch(report.unchecked_ref());
    }
    Ok(())
}

/// Exit fullscreen via the document.
pub fn exit_fullscreen(document: &Document, vendor: FullscreenVendor) -> Result<(), JsValue> {
    let api = vendor.api();
    let exit = method_on(document.as_ref(), api.exit_method)
        .ok_or_else(|| JsValue::from_str(api.exit_method))?;
    exit.call0(document.as_ref())?;
    Ok(())
}

/// Whether any vendor reports a current fullscreen element.
#[must_use]
pub fn is_fullscreen(document: &Document) -> bool {
    FullscreenVendor::ALL.into_iter().any(|vendor| {
        Reflect::get(
            document.as_ref(),
            &JsValue::from_str(vendor.api().element_property),
        )
        .map(|value| !value.is_null() && !value.is_undefined())
        .unwrap_or(false)
    })
}

/// Register `callback` for every known fullscreen change event.
pub fn add_change_listeners(
    document: &Document,
    callback: &js_sys::Function,
) -> Result<(), JsValue> {
    for event_name in CHANGE_EVENT_NAMES {
        document.add_event_listener_with_callback(event_name, callback)?;
    }
    Ok(())
}
