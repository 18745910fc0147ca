#![forbid(unsafe_code)]

//! DOM executor: applies [`UiCommand`] lists to the page.
//!
//! Missing elements are never an error — the page may omit the status line
//! or the gravity hint entirely — they degrade to a `tracing` warning and
//! the command is skipped. Nothing here panics on page shape.

use gridfall_core::render::{CELL_BASE_CLASS, DROP_ANIMATION_CLASS, UiCommand};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Document, Element, HtmlElement};

use crate::page;
use gridfall_core::fullscreen::FullscreenUiPatch;

/// Log to the browser console without requiring the `console` web-sys
/// feature; resolves `console.error` reflectively so a stripped-down global
/// (workers, tests) degrades to a no-op.
pub fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = js_sys::Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = js_sys::Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &wasm_bindgen::JsValue::from_str(msg));
}

/// Route panic messages to `console.error`. Installed once per page.
pub fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            // Keep it simple and robust: always print something useful.
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// The page's document, if the global scope has one.
#[must_use]
pub fn document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

/// Set an element's `display` style.
pub fn set_display(element: &HtmlElement, value: &str) {
    if element.style().set_property("display", value).is_err() {
        warn!(value, "failed to set display");
    }
}

fn query_cell(document: &Document, row: u16, col: u16) -> Option<Element> {
    match document.query_selector(&page::cell_selector(row, col)) {
        Ok(Some(element)) => Some(element),
        Ok(None) => {
            warn!(row, col, "no cell element for coordinates");
            None
        }
        Err(_) => {
            warn!(row, col, "cell selector query failed");
            None
        }
    }
}

fn set_cell(document: &Document, row: u16, col: u16, state: gridfall_core::board::CellState) {
    let Some(cell) = query_cell(document, row, col) else {
        return;
    };
    cell.set_text_content(Some(state.mark()));
    cell.set_class_name(CELL_BASE_CLASS);
    if let Some(class) = state.css_class()
        && cell.class_list().add_1(class).is_err()
    {
        warn!(row, col, class, "failed to add owner class");
    }
}

fn animate_drop(document: &Document, row: u16, col: u16) {
    let Some(cell) = query_cell(document, row, col) else {
        return;
    };
    if cell.class_list().add_1(DROP_ANIMATION_CLASS).is_err() {
        warn!(row, col, "failed to add drop animation class");
        return;
    }

    // Remove the class once the animation finishes so the next drop into the
    // same cell replays it.
    let animated = cell.clone();
    let cleanup = Closure::once_into_js(move |_event: web_sys::Event| {
        let _ = animated.class_list().remove_1(DROP_ANIMATION_CLASS);
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    if cell
        .add_event_listener_with_callback_and_add_event_listener_options(
            "animationend",
            cleanup.unchecked_ref(),
            &options,
        )
        .is_err()
    {
        warn!(row, col, "failed to register animationend cleanup");
    }
}

fn set_text_by_id(document: &Document, id: &str, text: &str) {
    match document.get_element_by_id(id) {
        Some(element) => element.set_text_content(Some(text)),
        None => warn!(id, "no such element"),
    }
}

fn show_end_overlay(document: &Document, message: &str) {
    let Some(overlay) = document.get_element_by_id(page::END_OVERLAY_ID) else {
        warn!(id = page::END_OVERLAY_ID, "no end overlay element");
        return;
    };
    match overlay.query_selector(page::END_OVERLAY_TEXT_SELECTOR) {
        Ok(Some(text)) => text.set_text_content(Some(message)),
        _ => warn!(
            selector = page::END_OVERLAY_TEXT_SELECTOR,
            "no overlay text element"
        ),
    }
    if let Some(html) = overlay.dyn_ref::<HtmlElement>() {
        set_display(html, page::DISPLAY_BLOCK);
    }
}

fn set_columns_enabled(document: &Document, enabled: bool) {
    let Ok(buttons) = document.query_selector_all(page::COLUMN_BUTTON_SELECTOR) else {
        warn!("column button query failed");
        return;
    };
    for idx in 0..buttons.length() {
        let Some(node) = buttons.get(idx) else {
            continue;
        };
        if let Some(button) = node.dyn_ref::<web_sys::HtmlButtonElement>() {
            button.set_disabled(!enabled);
        }
    }
}

/// Apply a command list in order.
pub fn apply_commands(document: &Document, commands: &[UiCommand]) {
    debug!(count = commands.len(), "applying commands");
    for command in commands {
        match command {
            UiCommand::SetCell { row, col, state } => set_cell(document, *row, *col, *state),
            UiCommand::AnimateDrop { row, col } => animate_drop(document, *row, *col),
            UiCommand::SetStatus { text } => set_text_by_id(document, page::STATUS_ID, text),
            UiCommand::SetGravityHint { inverted } => {
                let text = if *inverted { page::GRAVITY_HINT_TEXT } else { "" };
                set_text_by_id(document, page::GRAVITY_HINT_ID, text);
            }
            UiCommand::ShowEndOverlay { message } => show_end_overlay(document, message),
            UiCommand::SetColumnsEnabled { enabled } => set_columns_enabled(document, *enabled),
        }
    }
}

/// Apply a floating-widget visibility patch.
pub fn apply_fullscreen_patch(document: &Document, patch: FullscreenUiPatch) {
    toggle_by_id(
        document,
        page::FULLSCREEN_BUTTON_ID,
        patch.button_visible,
        page::DISPLAY_FLEX,
    );
    toggle_by_id(
        document,
        page::FULLSCREEN_HINT_ID,
        patch.hint_visible,
        page::DISPLAY_FLEX,
    );
}

fn toggle_by_id(document: &Document, id: &str, visible: bool, shown_display: &str) {
    let Some(element) = document.get_element_by_id(id) else {
        warn!(id, "no such element");
        return;
    };
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        set_display(
            html,
            if visible { shown_display } else { page::DISPLAY_NONE },
        );
    }
}

/// Ensure the floating fullscreen button and the Esc hint exist, creating
/// them when the page does not already carry them. Returns the button so the
/// caller can wire its click handler.
pub fn ensure_fullscreen_widgets(
    document: &Document,
) -> Result<HtmlElement, wasm_bindgen::JsValue> {
    let body = document
        .body()
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("document has no body"))?;

    if document.get_element_by_id(page::FULLSCREEN_HINT_ID).is_none() {
        let hint = document.create_element("div")?;
        hint.set_id(page::FULLSCREEN_HINT_ID);
        hint.set_class_name(page::FULLSCREEN_HINT_CLASS);
        hint.set_inner_html(page::FULLSCREEN_HINT_HTML);
        if let Some(html) = hint.dyn_ref::<HtmlElement>() {
            set_display(html, page::DISPLAY_NONE);
        }
        body.append_child(&hint)?;
    }

    let button = match document.get_element_by_id(page::FULLSCREEN_BUTTON_ID) {
        Some(existing) => existing,
        None => {
            let button = document.create_element("button")?;
            button.set_id(page::FULLSCREEN_BUTTON_ID);
            button.set_class_name(page::FULLSCREEN_BUTTON_CLASS);
            button.set_inner_html(page::FULLSCREEN_BUTTON_GLYPH);
            if let Some(html) = button.dyn_ref::<HtmlElement>() {
                html.set_title(page::FULLSCREEN_BUTTON_TITLE);
            }
            body.append_child(&button)?;
            button
        }
    };
    button
        .dyn_into::<HtmlElement>()
        .map_err(|_| wasm_bindgen::JsValue::from_str("fullscreen button is not an HtmlElement"))
}
