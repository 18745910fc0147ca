#![forbid(unsafe_code)]

//! `POST /play` over `fetch`.
//!
//! The outcome separates transport failure (the returned `Err`) from HTTP
//! rejection (`ok == false`): the caller routes them to different lifecycle
//! events.

use gridfall_core::protocol::{JSON_CONTENT_TYPE, MoveRequest};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// What came back from one `/play` round trip.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// POST one move and read the reply body as text.
pub async fn post_play(endpoint: &str, request: &MoveRequest) -> Result<FetchOutcome, JsValue> {
    let body = request
        .to_json_string()
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let headers = Headers::new()?;
    headers.set("Content-Type", JSON_CONTENT_TYPE)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(endpoint, &init)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;

    let text = JsFuture::from(response.text()?).await?;
    let outcome = FetchOutcome {
        ok: response.ok(),
        status: response.status(),
        status_text: response.status_text(),
        body: text.as_string().unwrap_or_default(),
    };
    debug!(status = outcome.status, ok = outcome.ok, "/play answered");
    Ok(outcome)
}
