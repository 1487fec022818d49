//! Finnance browser client: sign-in flow and session view.
//!
//! ARCHITECTURE
//! ============
//! `state` holds plain, synchronously testable state machines. `net` wraps
//! the HTTP calls to the gateway. `pages` wires the two together with Leptos
//! signals. Everything browser-specific sits behind the `csr` feature so the
//! state layer builds and tests natively.

pub mod app;
pub mod net;
pub mod pages;
pub mod state;

/// WASM entry point.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::mount_to_body(app::App);
}
