//! # client
//!
//! Browser behavior for server-rendered PrUnderground pages: preference
//! sync (theme and tile style), the navigation spinner and the iframe embed
//! bridge.
//!
//! Everything that touches `web-sys` is gated behind the `hydrate` feature.
//! Policy helpers and the network layer compile natively so they can be
//! tested without a browser.

pub mod net;
pub mod util;

#[cfg(feature = "hydrate")]
pub mod boot;

/// WASM entry point, run once the module is instantiated on a page.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    boot::start();
}
