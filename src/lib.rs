pub mod app;
pub mod client;
pub mod components;
#[cfg(feature = "ssr")]
pub mod config;
pub mod consumer;
pub mod error;
pub mod fallback;
#[cfg(feature = "ssr")]
pub mod handlers;
pub mod history;
#[cfg(feature = "ssr")]
pub mod middleware;
pub mod server_fn;
#[cfg(feature = "ssr")]
pub mod services;
pub mod session;
pub mod state;
#[cfg(feature = "ssr")]
pub mod streaming;
pub mod types;
pub mod validation;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
