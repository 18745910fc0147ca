#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the gridfall client.
//!
//! [`GridfallClient`] is the page's single entry point: construct it, call
//! `attach()`, and the column buttons, Escape handling, fullscreen change
//! events and floating widgets are wired. Every decision is delegated to
//! `gridfall-core`; this module shuttles events in and executes the
//! resulting commands and actions.

use std::cell::RefCell;
use std::rc::Rc;

use gridfall_core::board::BoardSnapshot;
use gridfall_core::flow::{MoveAction, MoveEvent, MoveFlow};
use gridfall_core::fullscreen::{ESCAPE_RECHECK_DELAY_MS, FullscreenUi, FullscreenVendor};
use gridfall_core::protocol::{
    MoveRequest, PLAY_ENDPOINT, ProtocolError, decode_error_body, decode_reply,
};
use gridfall_core::render::{UiCommand, plan_reply};
use js_sys::{Array, Object, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, KeyboardEvent};

use crate::{
    GRIDFALL_JS_API_VERSION, GRIDFALL_JS_PUBLIC_METHODS, dom, fullscreen_glue, net, page,
};

fn js_array_from_strings(items: &[&str]) -> Array {
    let arr = Array::new_with_length(items.len() as u32);
    for (idx, item) in items.iter().enumerate() {
        arr.set(idx as u32, JsValue::from_str(item));
    }
    arr
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

struct ClientInner {
    endpoint: String,
    shadow: Option<BoardSnapshot>,
    flow: MoveFlow,
    fullscreen_ui: FullscreenUi,
    vendor: Option<FullscreenVendor>,
    attached: bool,
}

impl ClientInner {
    fn new() -> Self {
        Self {
            endpoint: PLAY_ENDPOINT.to_owned(),
            shadow: None,
            flow: MoveFlow::new(),
            fullscreen_ui: FullscreenUi::new(),
            vendor: None,
            attached: false,
        }
    }
}

/// Browser-facing client surface.
#[wasm_bindgen]
pub struct GridfallClient {
    inner: Rc<RefCell<ClientInner>>,
}

impl Default for GridfallClient {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GridfallClient {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        dom::install_panic_hook();
        Self {
            inner: Rc::new(RefCell::new(ClientInner::new())),
        }
    }

    /// Override the `/play` endpoint (tests, reverse-proxy deployments).
    #[wasm_bindgen(js_name = setEndpoint)]
    pub fn set_endpoint(&self, endpoint: String) {
        self.inner.borrow_mut().endpoint = endpoint;
    }

    /// Wire all page listeners and create the floating fullscreen widgets.
    /// Idempotent: a second call is ignored.
    pub fn attach(&self) -> Result<(), JsValue> {
        let document =
            dom::document().ok_or_else(|| JsValue::from_str("no document in this scope"))?;

        {
            let mut inner = self.inner.borrow_mut();
            if inner.attached {
                warn!("attach called twice; ignoring");
                return Ok(());
            }
            inner.attached = true;
            inner.vendor = fullscreen_glue::detect_vendor(&document);
        }

        self.wire_column_buttons(&document)?;
        self.wire_fullscreen(&document)?;
        refresh_fullscreen_ui(&self.inner, &document);
        debug!("client attached");
        Ok(())
    }

    /// Submit a move for `col`, as if the user clicked that column button.
    #[wasm_bindgen(js_name = playColumn)]
    pub fn play_column(&self, col: u16) {
        submit_column(&self.inner, col);
    }

    /// Run a raw `/play` reply body through the full render pipeline without
    /// the network. Returns the executed commands as JSONL.
    #[wasm_bindgen(js_name = applyReplyJson)]
    pub fn apply_reply_json(&self, body: String) -> Result<String, JsValue> {
        apply_reply_body(&self.inner, &body).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Return to a playable state and force a full repaint on the next
    /// reply (new game; the grid may change size).
    pub fn reset(&self) {
        let actions = {
            let mut inner = self.inner.borrow_mut();
            inner.shadow = None;
            inner.flow.handle_event(MoveEvent::Reset)
        };
        run_actions(&self.inner, &actions);
    }

    #[wasm_bindgen(js_name = enterFullscreen)]
    pub fn enter_fullscreen(&self) {
        if let Some(document) = dom::document() {
            enter_fullscreen_inner(&self.inner, &document);
        }
    }

    #[wasm_bindgen(js_name = exitFullscreen)]
    pub fn exit_fullscreen(&self) {
        let Some(document) = dom::document() else {
            return;
        };
        let vendor = self.inner.borrow().vendor;
        let Some(vendor) = vendor else {
            warn!("fullscreen unsupported; nothing to exit");
            return;
        };
        if let Err(err) = fullscreen_glue::exit_fullscreen(&document, vendor) {
            dom::console_error(&format!("Erreur plein écran: {err:?}"));
        }
    }

    #[wasm_bindgen(js_name = isFullscreen)]
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        dom::document().is_some_and(|document| fullscreen_glue::is_fullscreen(&document))
    }

    /// Re-derive floating-widget visibility from the live fullscreen state.
    #[wasm_bindgen(js_name = refreshFullscreenUi)]
    pub fn refresh_fullscreen_ui(&self) {
        if let Some(document) = dom::document() {
            refresh_fullscreen_ui(&self.inner, &document);
        }
    }

    /// Drain the move-lifecycle transition trace as JSONL.
    #[wasm_bindgen(js_name = drainMoveTraceJsonl)]
    pub fn drain_move_trace_jsonl(&self) -> String {
        self.inner.borrow_mut().flow.drain_trace_jsonl()
    }

    /// JS-facing description of this build's API surface.
    #[wasm_bindgen(js_name = apiContract)]
    #[must_use]
    pub fn api_contract(&self) -> JsValue {
        let obj = Object::new();
        set_js(&obj, "apiVersion", JsValue::from_str(GRIDFALL_JS_API_VERSION));
        set_js(&obj, "packageName", JsValue::from_str(env!("CARGO_PKG_NAME")));
        set_js(
            &obj,
            "packageVersion",
            JsValue::from_str(env!("CARGO_PKG_VERSION")),
        );
        set_js(
            &obj,
            "methods",
            js_array_from_strings(&GRIDFALL_JS_PUBLIC_METHODS).into(),
        );
        let vendor = self.inner.borrow().vendor;
        set_js(
            &obj,
            "fullscreenVendor",
            match vendor {
                Some(vendor) => JsValue::from_str(vendor.api().request_method),
                None => JsValue::NULL,
            },
        );
        obj.into()
    }
}

impl GridfallClient {
    fn wire_column_buttons(&self, document: &Document) -> Result<(), JsValue> {
        let buttons = document.query_selector_all(page::COLUMN_BUTTON_SELECTOR)?;
        debug!(count = buttons.length(), "wiring column buttons");
        for idx in 0..buttons.length() {
            let Some(node) = buttons.get(idx) else {
                continue;
            };
            let Ok(button) = node.dyn_into::<web_sys::Element>() else {
                continue;
            };
            let inner = Rc::clone(&self.inner);
            let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(target) = event.current_target() else {
                    return;
                };
                let Ok(element) = target.dyn_into::<web_sys::Element>() else {
                    return;
                };
                let Some(raw) = element.get_attribute(page::DATA_COL_ATTR) else {
                    warn!("column button without data-col");
                    return;
                };
                match page::parse_data_col(&raw) {
                    Some(col) => submit_column(&inner, col),
                    None => warn!(raw = raw.as_str(), "unparseable data-col"),
                }
            });
            button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            // Listener lives for the page lifetime.
            on_click.forget();
        }
        Ok(())
    }

    fn wire_fullscreen(&self, document: &Document) -> Result<(), JsValue> {
        // Escape: the browser exits fullscreen on its own; re-derive the
        // widgets once the new state is observable.
        let inner = Rc::clone(&self.inner);
        let on_keydown = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = key_event.key();
            if key == "Escape" || key == "Esc" {
                schedule_fullscreen_recheck(&inner);
            }
        });
        document
            .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
        on_keydown.forget();

        let inner = Rc::clone(&self.inner);
        let on_change = Closure::<dyn FnMut()>::new(move || {
            if let Some(document) = dom::document() {
                refresh_fullscreen_ui(&inner, &document);
            }
        });
        fullscreen_glue::add_change_listeners(document, on_change.as_ref().unchecked_ref())?;
        on_change.forget();

        // Back/forward-cache restores skip `load`; re-derive on `pageshow`.
        let inner = Rc::clone(&self.inner);
        let on_pageshow = Closure::<dyn FnMut()>::new(move || {
            if let Some(document) = dom::document() {
                refresh_fullscreen_ui(&inner, &document);
            }
        });
        if let Some(window) = web_sys::window() {
            window.add_event_listener_with_callback(
                "pageshow",
                on_pageshow.as_ref().unchecked_ref(),
            )?;
        }
        on_pageshow.forget();

        let button = dom::ensure_fullscreen_widgets(document)?;
        let inner = Rc::clone(&self.inner);
        let on_enter = Closure::<dyn FnMut()>::new(move || {
            if let Some(document) = dom::document() {
                enter_fullscreen_inner(&inner, &document);
            }
        });
        button.add_event_listener_with_callback("click", on_enter.as_ref().unchecked_ref())?;
        on_enter.forget();
        Ok(())
    }
}

fn refresh_fullscreen_ui(inner: &Rc<RefCell<ClientInner>>, document: &Document) {
    let is_fullscreen = fullscreen_glue::is_fullscreen(document);
    let patch = inner.borrow_mut().fullscreen_ui.apply(is_fullscreen);
    if let Some(patch) = patch {
        dom::apply_fullscreen_patch(document, patch);
    }
}

fn schedule_fullscreen_recheck(inner: &Rc<RefCell<ClientInner>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let inner = Rc::clone(inner);
    let recheck = Closure::once_into_js(move || {
        if let Some(document) = dom::document() {
            refresh_fullscreen_ui(&inner, &document);
        }
    });
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            recheck.unchecked_ref(),
            ESCAPE_RECHECK_DELAY_MS,
        )
        .is_err()
    {
        warn!("failed to schedule fullscreen recheck");
    }
}

fn enter_fullscreen_inner(inner: &Rc<RefCell<ClientInner>>, document: &Document) {
    let vendor = inner.borrow().vendor;
    let Some(vendor) = vendor else {
        warn!("fullscreen unsupported by this browser");
        return;
    };
    if let Err(err) = fullscreen_glue::enter_fullscreen(document, vendor) {
        dom::console_error(&format!("Erreur plein écran: {err:?}"));
        return;
    }
    // Hide the button right away; the change event confirms shortly after.
    if let Some(button) = document.get_element_by_id(page::FULLSCREEN_BUTTON_ID)
        && let Some(html) = button.dyn_ref::<web_sys::HtmlElement>()
    {
        dom::set_display(html, page::DISPLAY_NONE);
    }
}

fn submit_column(inner: &Rc<RefCell<ClientInner>>, col: u16) {
    let actions = inner
        .borrow_mut()
        .flow
        .handle_event(MoveEvent::SubmitRequested { col });
    run_actions(inner, &actions);
}

fn run_actions(inner: &Rc<RefCell<ClientInner>>, actions: &[MoveAction]) {
    let document = dom::document();
    for action in actions {
        match action {
            MoveAction::DisableColumns => {
                if let Some(document) = &document {
                    dom::apply_commands(
                        document,
                        &[UiCommand::SetColumnsEnabled { enabled: false }],
                    );
                }
            }
            MoveAction::EnableColumns => {
                if let Some(document) = &document {
                    dom::apply_commands(
                        document,
                        &[UiCommand::SetColumnsEnabled { enabled: true }],
                    );
                }
            }
            MoveAction::SendRequest { col } => spawn_move_request(inner, *col),
        }
    }
}

fn spawn_move_request(inner: &Rc<RefCell<ClientInner>>, col: u16) {
    let endpoint = inner.borrow().endpoint.clone();
    let inner = Rc::clone(inner);
    wasm_bindgen_futures::spawn_local(async move {
        let request = MoveRequest { col };
        match net::post_play(&endpoint, &request).await {
            Ok(outcome) if outcome.ok => {
                if let Err(err) = apply_reply_body(&inner, &outcome.body) {
                    dom::console_error(&format!("Réponse serveur illisible: {err}"));
                    let actions = inner.borrow_mut().flow.handle_event(MoveEvent::ReplyRejected);
                    run_actions(&inner, &actions);
                }
            }
            Ok(outcome) => {
                let message = decode_error_body(&outcome.body, &outcome.status_text);
                dom::console_error(&format!("Erreur du serveur: {message}"));
                let actions = inner.borrow_mut().flow.handle_event(MoveEvent::ReplyRejected);
                run_actions(&inner, &actions);
            }
            Err(err) => {
                dom::console_error(&format!("Erreur fetch: {err:?}"));
                let actions = inner
                    .borrow_mut()
                    .flow
                    .handle_event(MoveEvent::TransportFailed);
                run_actions(&inner, &actions);
            }
        }
    });
}

fn apply_reply_body(
    inner: &Rc<RefCell<ClientInner>>,
    body: &str,
) -> Result<String, ProtocolError> {
    let reply = decode_reply(body)?;
    let plan = {
        let borrowed = inner.borrow();
        plan_reply(borrowed.shadow.as_ref(), &reply)
    };
    debug!(commands = plan.commands.len(), "reply planned");

    if let Some(document) = dom::document() {
        dom::apply_commands(&document, &plan.commands);
    }
    let jsonl = plan
        .commands
        .iter()
        .filter_map(|command| command.to_json_string().ok())
        .collect::<Vec<_>>()
        .join("\n");

    let actions = {
        let mut borrowed = inner.borrow_mut();
        borrowed.shadow = Some(plan.board);
        borrowed.flow.handle_event(MoveEvent::ReplyAccepted {
            finished: reply.game_over,
        })
    };
    run_actions(inner, &actions);
    Ok(jsonl)
}
