#![forbid(unsafe_code)]

//! `gridfall-core` is the deterministic core of the gridfall web client.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (the WASM frontend, or a
//!   test harness) feeds server reply bodies and user intents in; command
//!   lists and state transitions come out.
//! - **No platform bindings**: this crate never touches `web-sys` or
//!   `wasm-bindgen`, so every decision the client makes is testable on native.
//! - **The server is the oracle**: game rules live on the other side of
//!   `/play`. This crate mirrors whatever grid the reply carries and never
//!   second-guesses it.
//!
//! The crate splits along the seams of the page it drives:
//! - [`board`] — grid snapshot model and tolerant wire-cell decoding,
//! - [`protocol`] — the `/play` request/reply codec,
//! - [`render`] — reply → ordered [`render::UiCommand`] planning,
//! - [`flow`] — the move-submission lifecycle (double-click guard),
//! - [`fullscreen`] — vendor name tables and floating-widget visibility.

pub mod board;
pub mod flow;
pub mod fullscreen;
pub mod protocol;
pub mod render;
