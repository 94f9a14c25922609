//! The single owner of the current theme.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::bus::ThemeBus;
use crate::config::Config;
use crate::error::Result;
use crate::page::{selectors, toggle_class, Page};
use crate::schedule::Scheduler;
use crate::storage::{load_theme, save_theme, Storage};
use crate::theme::Theme;
use crate::transition::run_transition;

/// Result of a theme change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A transition was still playing; the request was dropped.
    Ignored,
}

/// Services the store needs from its host.
pub struct StoreDeps<P> {
    pub page: Rc<P>,
    pub storage: Rc<dyn Storage>,
    pub scheduler: Rc<dyn Scheduler>,
    pub bus: ThemeBus,
}

/// Current theme, its persistence, and change notification.
///
/// Every accepted change marks the root element, persists the value and
/// publishes it on the bus before returning. Animated changes also lock
/// out further changes until the transition overlay is gone.
pub struct ThemeStore<P: Page> {
    page: Rc<P>,
    storage: Rc<dyn Storage>,
    scheduler: Rc<dyn Scheduler>,
    bus: ThemeBus,
    theme_key: String,
    transition: Duration,
    theme: Cell<Theme>,
    transitioning: Rc<Cell<bool>>,
}

impl<P: Page + 'static> ThemeStore<P> {
    /// Loads the persisted theme and marks the root element right away so
    /// the stylesheet applies before any subsystem is wired.
    pub fn new(deps: StoreDeps<P>, config: &Config) -> Self {
        let theme = load_theme(deps.storage.as_ref(), &config.theme_key);
        let root = deps.page.root();
        for known in Theme::ALL {
            deps.page.remove_class(&root, known.marker_class());
        }
        deps.page.add_class(&root, theme.marker_class());
        Self {
            page: deps.page,
            storage: deps.storage,
            scheduler: deps.scheduler,
            bus: deps.bus,
            theme_key: config.theme_key.clone(),
            transition: config.transition(),
            theme: Cell::new(theme),
            transitioning: Rc::new(Cell::new(false)),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning.get()
    }

    pub fn bus(&self) -> &ThemeBus {
        &self.bus
    }

    /// Re-applies the current theme without animation, once every
    /// subscriber is in place.
    pub fn sync(&self) -> Outcome {
        self.set_theme(self.theme(), false)
    }

    pub fn toggle(&self) -> Outcome {
        let next = self.theme().opposite();
        tracing::debug!(from = %self.theme(), to = %next, "toggling theme");
        self.set_theme(next, true)
    }

    /// Like [`ThemeStore::set_theme`] for a theme given by name.
    pub fn set_theme_named(&self, name: &str, animate: bool) -> Result<Outcome> {
        Ok(self.set_theme(name.parse()?, animate))
    }

    pub fn set_theme(&self, theme: Theme, animate: bool) -> Outcome {
        if self.transitioning.get() {
            tracing::debug!(%theme, "theme change ignored during transition");
            return Outcome::Ignored;
        }

        let root = self.page.root();
        if animate {
            self.begin_transition(theme);
        }

        for known in Theme::ALL {
            self.page.remove_class(&root, known.marker_class());
        }
        self.page.add_class(&root, theme.marker_class());
        if let Some(body) = self.page.body() {
            self.page.set_attribute(&body, "data-theme", theme.as_str());
        }

        self.theme.set(theme);
        save_theme(self.storage.as_ref(), &self.theme_key, theme);
        self.update_toggle();
        self.bus.publish(theme);

        tracing::info!(%theme, "theme switched");
        Outcome::Applied
    }

    fn begin_transition(&self, to: Theme) {
        let root = self.page.root();
        self.transitioning.set(true);
        self.page.add_class(&root, selectors::TRANSITIONING);

        if let Err(err) = run_transition(&self.page, self.scheduler.as_ref(), to, self.transition) {
            tracing::warn!(%err, "transition overlay failed");
        }

        let page = Rc::clone(&self.page);
        let transitioning = Rc::clone(&self.transitioning);
        let finish = move || {
            page.remove_class(&page.root(), selectors::TRANSITIONING);
            transitioning.set(false);
        };
        let scheduled = self.scheduler.set_timeout(self.transition, Box::new(finish));
        if let Err(err) = scheduled {
            // Without the timer the lock would never lift.
            tracing::warn!(%err, "could not schedule transition end");
            self.page.remove_class(&root, selectors::TRANSITIONING);
            self.transitioning.set(false);
        }
    }

    fn update_toggle(&self) {
        let Some(toggle) = self.page.query(selectors::TOGGLE) else {
            return;
        };
        let retro = self.theme() == Theme::Retro;
        toggle_class(self.page.as_ref(), &toggle, selectors::RETRO_ACTIVE, retro);
        toggle_class(self.page.as_ref(), &toggle, selectors::MODERN_ACTIVE, !retro);
        self.page
            .set_attribute(&toggle, "aria-label", self.theme().toggle_label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{BlockedStorage, FakePage, ManualScheduler};
    use crate::storage::MemoryStorage;

    fn store_with(storage: Rc<dyn Storage>) -> (Rc<FakePage>, ThemeStore<FakePage>) {
        let page = Rc::new(FakePage::new());
        let deps = StoreDeps {
            page: Rc::clone(&page),
            storage,
            scheduler: Rc::new(ManualScheduler::new()),
            bus: ThemeBus::new(),
        };
        (page, ThemeStore::new(deps, &Config::default()))
    }

    #[test]
    fn persisted_theme_marks_root_on_construction() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set("portfolio-theme", "retro").unwrap();
        let (page, store) = store_with(storage);
        assert_eq!(store.theme(), Theme::Retro);
        assert_eq!(page.classes(page.root()), vec!["theme-retro"]);
    }

    #[test]
    fn construction_replaces_a_stale_marker() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set("portfolio-theme", "retro").unwrap();
        let page = Rc::new(FakePage::new());
        page.add_class(&page.root(), "theme-modern");

        let store = ThemeStore::new(
            StoreDeps {
                page: Rc::clone(&page),
                storage,
                scheduler: Rc::new(ManualScheduler::new()),
                bus: ThemeBus::new(),
            },
            &Config::default(),
        );

        assert_eq!(store.theme(), Theme::Retro);
        assert_eq!(page.classes(page.root()), vec!["theme-retro"]);
    }

    #[test]
    fn unknown_name_is_rejected_without_side_effects() {
        let storage = Rc::new(MemoryStorage::new());
        let (page, store) = store_with(storage.clone());
        assert!(store.set_theme_named("sepia", true).is_err());
        assert_eq!(store.theme(), Theme::Modern);
        assert!(!store.is_transitioning());
        assert_eq!(storage.get("portfolio-theme").unwrap(), None);
        assert_eq!(page.classes(page.root()), vec!["theme-modern"]);
    }

    #[test]
    fn blocked_storage_still_switches() {
        let (page, store) = store_with(Rc::new(BlockedStorage));
        assert_eq!(store.set_theme(Theme::Retro, false), Outcome::Applied);
        assert_eq!(store.theme(), Theme::Retro);
        assert!(page.has_class(&page.root(), "theme-retro"));
    }

    #[test]
    fn toggle_control_reflects_theme() {
        let (page, store) = store_with(Rc::new(MemoryStorage::new()));
        let toggle = page.insert_in_body("div", &[], Some("theme-toggle"));

        store.set_theme(Theme::Retro, false);
        assert!(page.has_class(&toggle, "retro-active"));
        assert!(!page.has_class(&toggle, "modern-active"));
        assert_eq!(
            page.attribute(toggle, "aria-label").as_deref(),
            Some("Switch to Modern theme")
        );

        store.set_theme(Theme::Modern, false);
        assert!(page.has_class(&toggle, "modern-active"));
        assert!(!page.has_class(&toggle, "retro-active"));
    }
}
