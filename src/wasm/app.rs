//! Page bootstrap: builds every subsystem and hooks it to browser events.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CustomEvent, CustomEventInit, Document, Event, EventTarget,
    HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, Window,
};

use super::canvas::CanvasSurface;
use super::dom::{describe, LocalStorage, WebPage};
use super::log;
use super::render::WebGlEmbers;
use super::timing::WebScheduler;
use crate::backdrop::Backdrop;
use crate::bus::ThemeBus;
use crate::config::{Config, Modifiers};
use crate::decorations::RetroDecorations;
use crate::embers::EmberLayer;
use crate::error::Error;
use crate::page::{selectors, Page};
use crate::schedule::Scheduler;
use crate::storage::{MemoryStorage, Storage};
use crate::store::{Outcome, StoreDeps, ThemeStore};
use crate::surface::Surface;

const FULL_VIEWPORT: [(&str, &str); 7] = [
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("pointer-events", "none"),
    ("z-index", "0"),
];

thread_local! {
    static STORE: RefCell<Option<Rc<ThemeStore<WebPage>>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    log::install_panic_hook();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let page = Rc::new(WebPage::new(document.clone()).ok_or("no document element")?);

    let config = load_config(&document);
    log::init(&config.log_level);

    let storage: Rc<dyn Storage> = match LocalStorage::open(&window) {
        Ok(storage) => Rc::new(storage),
        Err(err) => {
            tracing::warn!(%err, "falling back to in-memory storage");
            Rc::new(MemoryStorage::new())
        }
    };
    let scheduler: Rc<dyn Scheduler> = Rc::new(WebScheduler::new(window.clone()));
    let bus = ThemeBus::new();

    let store = Rc::new(ThemeStore::new(
        StoreDeps {
            page: Rc::clone(&page),
            storage: Rc::clone(&storage),
            scheduler: Rc::clone(&scheduler),
            bus: bus.clone(),
        },
        &config,
    ));

    forward_theme_events(&window, &bus);
    wire_toggle(page.as_ref(), &store)?;
    wire_shortcut(&document, &store, &config)?;

    let seed = config.seed.unwrap_or_else(random_seed);
    let backdrop = mount_backdrop(&window, &document, Rc::clone(&scheduler), &config, seed)?;
    if let Some(backdrop) = &backdrop {
        backdrop.attach(&bus).detach();
    }

    let decorations = Rc::new(RetroDecorations::new(
        Rc::clone(&page),
        storage,
        Rc::clone(&scheduler),
        backdrop,
        &config,
    ));
    decorations.attach(&bus).detach();

    if config.ember_grid {
        mount_embers(&window, &document, scheduler, &bus, seed)?;
    }

    STORE.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&store)));
    store.sync();
    Ok(())
}

/// Handle for page scripts, e.g. `portfolioFx()?.toggle()`.
#[wasm_bindgen]
pub struct PortfolioFx {
    store: Rc<ThemeStore<WebPage>>,
}

#[wasm_bindgen]
impl PortfolioFx {
    pub fn theme(&self) -> String {
        self.store.theme().as_str().to_owned()
    }

    /// Returns `false` when a transition was still running.
    pub fn toggle(&self) -> bool {
        self.store.toggle() == Outcome::Applied
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, name: &str, animate: Option<bool>) -> Result<bool, JsValue> {
        self.store
            .set_theme_named(name, animate.unwrap_or(true))
            .map(|outcome| outcome == Outcome::Applied)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = isTransitioning)]
    pub fn is_transitioning(&self) -> bool {
        self.store.is_transitioning()
    }
}

#[wasm_bindgen(js_name = portfolioFx)]
pub fn portfolio_fx() -> Option<PortfolioFx> {
    STORE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|store| PortfolioFx { store: Rc::clone(store) })
    })
}

fn to_js(err: Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Reads the optional JSON config block. Runs before tracing is set up,
/// so problems go straight to the console.
fn load_config(document: &Document) -> Config {
    let Some(raw) = document
        .query_selector(selectors::CONFIG)
        .ok()
        .flatten()
        .and_then(|element| element.text_content())
    else {
        return Config::default();
    };
    Config::from_json(&raw).unwrap_or_else(|err| {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "portfolio_fx: ignoring config block: {err}"
        )));
        Config::default()
    })
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

fn viewport(window: &Window) -> (f64, f64) {
    let read = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (read(window.inner_width()), read(window.inner_height()))
}

fn listen(
    target: &EventTarget,
    name: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn listen_passive(
    target: &EventTarget,
    name: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

/// Re-broadcasts theme changes as a window `themechange` event for page
/// scripts that are not part of this crate.
fn forward_theme_events(window: &Window, bus: &ThemeBus) {
    let window = window.clone();
    bus.subscribe(move |theme| {
        let detail = Object::new();
        let _ = Reflect::set(&detail, &"theme".into(), &theme.as_str().into());
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        let dispatched = CustomEvent::new_with_event_init_dict("themechange", &init)
            .and_then(|event| window.dispatch_event(&event));
        if let Err(err) = dispatched {
            tracing::warn!(err = %describe(&err), "could not dispatch themechange");
        }
    })
    .detach();
}

fn wire_toggle(page: &WebPage, store: &Rc<ThemeStore<WebPage>>) -> Result<(), JsValue> {
    let Some(toggle) = page.query(selectors::TOGGLE) else {
        tracing::warn!("theme toggle not found");
        return Ok(());
    };
    // Prefer the inner button so clicks on the container's padding do not
    // count; fall back to the container itself.
    let (target, inner) = match page.query_within(&toggle, selectors::TOGGLE_BUTTON) {
        Some(button) => (button, true),
        None => (toggle, false),
    };
    let store = Rc::clone(store);
    listen(&target, "click", move |event| {
        event.prevent_default();
        if inner {
            event.stop_propagation();
        }
        store.toggle();
    })
}

fn wire_shortcut(
    document: &Document,
    store: &Rc<ThemeStore<WebPage>>,
    config: &Config,
) -> Result<(), JsValue> {
    let store = Rc::clone(store);
    let shortcut = config.shortcut.clone();
    listen(document, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let mods = Modifiers {
            ctrl: key.ctrl_key(),
            alt: key.alt_key(),
            shift: key.shift_key(),
            meta: key.meta_key(),
        };
        if shortcut.matches(&key.key(), mods) {
            event.prevent_default();
            store.toggle();
        }
    })
}

fn pin_full_viewport(canvas: &HtmlCanvasElement) {
    let style = canvas.style();
    for (property, value) in FULL_VIEWPORT {
        let _ = style.set_property(property, value);
    }
}

fn mount_backdrop(
    window: &Window,
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    config: &Config,
    seed: u64,
) -> Result<Option<Backdrop>, JsValue> {
    let Some(canvas) = document
        .query_selector(selectors::CANVAS)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
    else {
        return Ok(None);
    };
    pin_full_viewport(&canvas);

    let surface = match CanvasSurface::new(canvas) {
        Ok(surface) => surface,
        Err(err) => {
            tracing::error!(%err, "canvas effects disabled");
            return Ok(None);
        }
    };
    let surface: Rc<RefCell<dyn Surface>> = Rc::new(RefCell::new(surface));
    let backdrop = Backdrop::new(surface, scheduler, config, seed);
    let (width, height) = viewport(window);
    backdrop.resize(width, height);

    {
        let backdrop = backdrop.clone();
        let win = window.clone();
        listen(window, "resize", move |_| {
            let (width, height) = viewport(&win);
            backdrop.resize(width, height);
        })?;
    }
    {
        let backdrop = backdrop.clone();
        listen(document, "mousemove", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                backdrop.pointer_moved(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
            }
        })?;
    }
    {
        let backdrop = backdrop.clone();
        listen_passive(document, "touchmove", move |event| {
            let touch = event
                .dyn_ref::<TouchEvent>()
                .and_then(|touch| touch.touches().item(0));
            if let Some(touch) = touch {
                backdrop.pointer_moved(f64::from(touch.client_x()), f64::from(touch.client_y()));
            }
        })?;
    }
    for name in ["mouseleave", "touchend"] {
        let backdrop = backdrop.clone();
        listen(document, name, move |_| backdrop.pointer_left())?;
    }
    Ok(Some(backdrop))
}

fn mount_embers(
    window: &Window,
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    bus: &ThemeBus,
    seed: u64,
) -> Result<(), JsValue> {
    let Some(body) = document.body() else {
        return Ok(());
    };
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.class_list().add_1("ember-canvas")?;
    pin_full_viewport(&canvas);
    body.prepend_with_node_1(&canvas)?;

    let renderer = match WebGlEmbers::new(canvas.clone()) {
        Ok(renderer) => renderer,
        Err(err) => {
            tracing::error!(%err, "ember grid disabled");
            canvas.remove();
            return Ok(());
        }
    };
    let (width, height) = viewport(window);
    let layer = Rc::new(EmberLayer::new(renderer, scheduler, width, height, seed));
    layer.resize(width, height);
    layer.attach(bus).detach();

    {
        let layer = Rc::clone(&layer);
        let win = window.clone();
        listen(window, "resize", move |_| {
            let (width, height) = viewport(&win);
            layer.resize(width, height);
        })?;
    }
    listen(window, "mousemove", move |event| {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            layer.aim(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
        }
    })?;
    tracing::info!("ember grid running");
    Ok(())
}
