//! # securechat
//!
//! Leptos + WASM browser client for the secure chat application.
//!
//! The backend owns every cipher, message and user record; this crate owns
//! the authentication-gated session core (token persistence, backend
//! validation, session derivation, route admission) and the pages wired on
//! top of it.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point: install panic/log hooks and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
