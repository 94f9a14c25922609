#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use portfolio_fx::page::Page;
use portfolio_fx::storage::{load_theme, save_theme, Storage};
use portfolio_fx::surface::Surface;
use portfolio_fx::wasm::{CanvasSurface, LocalStorage, WebPage};
use portfolio_fx::Theme;

wasm_bindgen_test_configure!(run_in_browser);

fn page() -> WebPage {
    let document = web_sys::window().unwrap().document().unwrap();
    WebPage::new(document).expect("document element")
}

#[wasm_bindgen_test]
fn local_storage_round_trips_theme() {
    let window = web_sys::window().unwrap();
    let storage = LocalStorage::open(&window).expect("localStorage");
    save_theme(&storage, "portfolio-fx-test", Theme::Retro);
    assert_eq!(load_theme(&storage, "portfolio-fx-test"), Theme::Retro);
    storage.set("portfolio-fx-test", "bogus").unwrap();
    assert_eq!(load_theme(&storage, "portfolio-fx-test"), Theme::Modern);
}

#[wasm_bindgen_test]
fn page_classes_and_queries() {
    let page = page();
    let body = page.body().expect("body");
    let probe = page.create("span").unwrap();
    page.add_class(&probe, "fx-probe");
    page.append(&body, &probe).unwrap();

    assert!(page.query(".fx-probe").is_some());
    assert!(page.has_class(&probe, "fx-probe"));
    page.remove_class(&probe, "fx-probe");
    assert!(page.query(".fx-probe").is_none());

    page.remove(&probe);
    assert!(page.query_all("span.fx-probe").is_empty());
}

#[wasm_bindgen_test]
fn canvas_surface_tracks_size() {
    let page = page();
    let canvas = page
        .create("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    let mut surface = CanvasSurface::new(canvas).expect("2d context");
    surface.resize(320.0, 200.0);
    assert_eq!(surface.size(), (320.0, 200.0));
    surface.clear();
    surface.wash(portfolio_fx::theme::Rgba::new(0, 0, 51, 0.15));
}
