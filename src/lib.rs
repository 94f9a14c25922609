#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Theme switching and decorative canvas effects for a portfolio site.
//!
//! A [`store::ThemeStore`] owns the current theme (`modern` or `retro`),
//! persists it and publishes changes on a [`bus::ThemeBus`]. Each effect
//! subscribes on its own:
//!
//! * [`backdrop::Backdrop`] draws the cursor torchlight or the star field
//!   on the page canvas;
//! * [`decorations::RetroDecorations`] toggles the CRT overlays, blinking
//!   text, pixel cursor and hit counter;
//! * [`embers::EmberLayer`] optionally renders a WebGL ember grid.
//!
//! Browser access goes through the [`page::Page`], [`storage::Storage`],
//! [`schedule::Scheduler`] and [`surface::Surface`] traits. The `wasm`
//! module implements them with `web-sys`; the `harness` module (behind the
//! `test-util` feature) implements them in memory so everything above runs
//! under plain `cargo test`.

pub mod backdrop;
pub mod bus;
pub mod config;
pub mod decorations;
pub mod embers;
pub mod error;
pub mod glow;
#[cfg(any(test, feature = "test-util"))]
pub mod harness;
pub mod hit_counter;
pub mod page;
pub mod schedule;
pub mod starfield;
pub mod storage;
pub mod store;
pub mod surface;
pub mod theme;
pub mod transition;

pub use error::{Error, Result};
pub use theme::Theme;

// Only compile browser bindings when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm {
    mod app;
    mod canvas;
    mod dom;
    mod log;
    mod render;
    mod timing;

    pub use app::{portfolio_fx, PortfolioFx};
    pub use canvas::CanvasSurface;
    pub use dom::{LocalStorage, WebPage};
    pub use render::WebGlEmbers;
    pub use timing::WebScheduler;
}
