//! Storm Canvas core crate.
//!
//! Animated storm background for a web page: procedural lightning with a
//! self-rescheduling strike chain, a wind-driven rain field with splashes,
//! ripple "puddles" inside interactive containers and synthesized thunder.
//!
//! The simulation (`bolt`, `strike`, `rain`, `ripple`, `scene`) is plain Rust
//! driven by an explicit clock and an injected `rand::Rng`, drawing through
//! the [`surface::Surface`] trait. The browser glue lives in a private `web`
//! module and is exposed as [`start_storm`] / [`stop_storm`].

use wasm_bindgen::prelude::*;

pub mod audio;
pub mod bolt;
pub mod color;
pub mod config;
pub mod error;
pub mod rain;
pub mod ripple;
pub mod scene;
pub mod strike;
pub mod surface;
pub mod timer;

mod web;

pub use config::StormConfig;
pub use error::StormError;
pub use scene::{FrameReport, StormScene};
pub use web::{start_storm, stop_storm};
#[cfg(feature = "serde_json")]
pub use web::start_storm_with_config;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}
