//! Slackmate Web Frontend
//!
//! Leptos-based WASM frontend for the Slackmate console: landing page,
//! authentication, admin profile and the offer/checkout flow.

mod app;
mod auth;
mod components;
mod config;
mod pages;
mod stripe;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
