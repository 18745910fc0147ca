#![forbid(unsafe_code)]

//! `gridfall-web` is the browser frontend for gridfall: `wasm-bindgen`
//! exports plus the `web-sys`/`js-sys` glue that wires the page to
//! [`gridfall_core`].
//!
//! Responsibilities:
//! - column-button capture and move submission (`POST /play`),
//! - executing the [`gridfall_core::render::UiCommand`] plans against the
//!   DOM,
//! - Fullscreen API dispatch across vendor prefixes, plus the floating
//!   enter-button / Esc-hint widgets.
//!
//! All decisions live in `gridfall-core`; this crate is an executor. The
//! only module that compiles on native is [`page`], which keeps the page's
//! naming (ids, classes, selectors) testable without a browser.

/// JS API version line. Bump on any breaking change to the exported surface.
pub const GRIDFALL_JS_API_VERSION: &str = "1";

/// Methods exported on `GridfallClient`, in the JS naming.
pub const GRIDFALL_JS_PUBLIC_METHODS: [&str; 11] = [
    "attach",
    "setEndpoint",
    "playColumn",
    "applyReplyJson",
    "reset",
    "enterFullscreen",
    "exitFullscreen",
    "isFullscreen",
    "refreshFullscreenUi",
    "drainMoveTraceJsonl",
    "apiContract",
];

pub mod page;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod fullscreen_glue;
#[cfg(target_arch = "wasm32")]
pub mod net;
#[cfg(target_arch = "wasm32")]
pub mod wasm;
