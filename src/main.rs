//! Orbit Shooter entry point
//!
//! In the browser this wires the scene to the page. Natively there is no
//! window: the autopilot plays one game headless and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Orbit Shooter starting...");

    if let Err(e) = orbit_shooter::web::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use orbit_shooter::SceneConfig;
    use orbit_shooter::demo;

    env_logger::init();
    log::info!("Orbit Shooter (native) starting...");
    log::info!("Native mode plays headless - run with `trunk serve` for the web version");

    let config = SceneConfig::load();
    let seed = std::env::var("ORBIT_SHOOTER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    // Untimed modes may never end on their own
    let limit_ms = std::env::var("ORBIT_SHOOTER_LIMIT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(120_000.0);

    match demo::play(config, seed, limit_ms) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Cannot print summary: {}", e),
        },
        Err(e) => {
            log::error!("Invalid config: {}", e);
            std::process::exit(1);
        }
    }
}
