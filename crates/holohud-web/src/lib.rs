//! HoloHUD Web - Browser front end for the overlay demos
//!
//! Picks the demo from the page URL, wires the start button to the staged
//! startup (vision session, then webcam) and feeds MediaPipe detections into
//! the shared Bevy scene.

mod app;
mod camera;
mod page;
mod runtime;
mod vision;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    app::run();
}
