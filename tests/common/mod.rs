#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use portfolio_fx::backdrop::Backdrop;
use portfolio_fx::bus::{Subscription, ThemeBus};
use portfolio_fx::config::Config;
use portfolio_fx::decorations::RetroDecorations;
use portfolio_fx::harness::{FakePage, ManualScheduler, NodeId, RecordingSurface};
use portfolio_fx::page::Page;
use portfolio_fx::storage::{MemoryStorage, Storage};
use portfolio_fx::store::{StoreDeps, ThemeStore};
use portfolio_fx::surface::Surface;
use portfolio_fx::Theme;

pub const TRANSITION: Duration = Duration::from_millis(800);

/// A page wired the way the browser bootstrap wires it.
pub struct Site {
    pub page: Rc<FakePage>,
    pub storage: Rc<MemoryStorage>,
    pub scheduler: Rc<ManualScheduler>,
    pub surface: Rc<RefCell<RecordingSurface>>,
    pub store: ThemeStore<FakePage>,
    pub backdrop: Backdrop,
    pub decorations: Rc<RetroDecorations<FakePage>>,
    pub counter: NodeId,
    pub blink_targets: Vec<NodeId>,
    _subscriptions: Vec<Subscription>,
}

impl Site {
    pub fn load() -> Self {
        Self::load_with(Rc::new(MemoryStorage::new()))
    }

    pub fn load_with(storage: Rc<MemoryStorage>) -> Self {
        let page = Rc::new(FakePage::new());
        let counter = page.insert_in_body("div", &["hit-counter"], None);
        let blink_targets = vec![
            page.insert_in_body("span", &["highlight"], None),
            page.insert_in_body("span", &["job-period"], None),
        ];
        page.insert_in_body("div", &[], Some("theme-toggle"));

        let scheduler = Rc::new(ManualScheduler::new());
        let surface = Rc::new(RefCell::new(RecordingSurface::new(1280.0, 720.0)));
        let bus = ThemeBus::new();
        let config = Config::default();

        let store = ThemeStore::new(
            StoreDeps {
                page: Rc::clone(&page),
                storage: storage.clone(),
                scheduler: scheduler.clone(),
                bus: bus.clone(),
            },
            &config,
        );

        let shared: Rc<RefCell<dyn Surface>> = surface.clone();
        let backdrop = Backdrop::new(shared, scheduler.clone(), &config, 42);
        let decorations = Rc::new(RetroDecorations::new(
            Rc::clone(&page),
            storage.clone(),
            scheduler.clone(),
            Some(backdrop.clone()),
            &config,
        ));
        let subscriptions = vec![backdrop.attach(&bus), decorations.attach(&bus)];

        store.sync();

        Self {
            page,
            storage,
            scheduler,
            surface,
            store,
            backdrop,
            decorations,
            counter,
            blink_targets,
            _subscriptions: subscriptions,
        }
    }

    pub fn persisted(&self) -> Option<String> {
        self.storage.get("portfolio-theme").unwrap()
    }

    pub fn theme_markers(&self) -> Vec<String> {
        self.page
            .classes(self.page.root())
            .into_iter()
            .filter(|class| Theme::ALL.iter().any(|t| t.marker_class() == class))
            .collect()
    }

    /// Lets any running transition finish.
    pub fn settle(&self) {
        self.scheduler.advance(TRANSITION);
    }

    pub fn drain_draws(&self) -> Vec<portfolio_fx::harness::DrawCall> {
        self.surface.borrow_mut().take_calls()
    }
}
