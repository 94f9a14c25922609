//! Retro-only page decorations: CRT overlays, blinking text, the pixel
//! cursor and the hit counter.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::backdrop::Backdrop;
use crate::bus::{Subscription, ThemeBus};
use crate::config::{Config, HitConfig};
use crate::error::Result;
use crate::hit_counter::{counter_digits, increment, reveal_schedule};
use crate::page::{selectors, Page};
use crate::schedule::Scheduler;
use crate::storage::Storage;
use crate::theme::Theme;

pub struct RetroDecorations<P: Page> {
    page: Rc<P>,
    storage: Rc<dyn Storage>,
    scheduler: Rc<dyn Scheduler>,
    backdrop: Option<Backdrop>,
    hits_key: String,
    hits: HitConfig,
    active: Cell<bool>,
    /// Elements this instance marked as blinking, and only those.
    blinking: RefCell<Vec<P::Element>>,
}

impl<P: Page + 'static> RetroDecorations<P> {
    /// `backdrop` receives star-field start/stop requests when the page
    /// has a canvas.
    pub fn new(
        page: Rc<P>,
        storage: Rc<dyn Storage>,
        scheduler: Rc<dyn Scheduler>,
        backdrop: Option<Backdrop>,
        config: &Config,
    ) -> Self {
        Self {
            page,
            storage,
            scheduler,
            backdrop,
            hits_key: config.hits_key.clone(),
            hits: config.hits.clone(),
            active: Cell::new(false),
            blinking: RefCell::new(Vec::new()),
        }
    }

    #[must_use = "dropping the subscription detaches the decorations"]
    pub fn attach(self: &Rc<Self>, bus: &ThemeBus) -> Subscription {
        let decorations = Rc::clone(self);
        bus.subscribe(move |theme| match theme {
            Theme::Retro => decorations.activate(),
            Theme::Modern => decorations.deactivate(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn activate(&self) {
        if self.active.replace(true) {
            return;
        }
        self.inject_overlay(selectors::SCANLINES, selectors::SCANLINES_CLASS);
        self.inject_overlay(selectors::CRT, selectors::CRT_CLASS);
        self.bump_hit_counter();
        self.start_blinking();
        if let Some(body) = self.page.body() {
            self.page.add_class(&body, selectors::PIXEL_CURSOR);
        }
        if let Some(backdrop) = &self.backdrop {
            backdrop.activate_retro();
        }
        tracing::debug!("retro decorations on");
    }

    pub fn deactivate(&self) {
        if !self.active.replace(false) {
            return;
        }
        for selector in [selectors::SCANLINES, selectors::CRT] {
            if let Some(overlay) = self.page.query(selector) {
                self.page.remove(&overlay);
            }
        }
        for element in self.blinking.take() {
            self.page.remove_class(&element, selectors::BLINK);
        }
        if let Some(body) = self.page.body() {
            self.page.remove_class(&body, selectors::PIXEL_CURSOR);
        }
        if let Some(backdrop) = &self.backdrop {
            backdrop.deactivate_retro();
        }
        tracing::debug!("retro decorations off");
    }

    fn inject_overlay(&self, selector: &str, class: &str) {
        if self.page.query(selector).is_some() {
            return;
        }
        let Some(body) = self.page.body() else {
            return;
        };
        let injected = self.page.create("div").and_then(|overlay| {
            self.page.add_class(&overlay, class);
            self.page.append(&body, &overlay)
        });
        if let Err(err) = injected {
            tracing::warn!(%err, class, "could not add overlay");
        }
    }

    fn start_blinking(&self) {
        let mut blinking = self.blinking.borrow_mut();
        for element in self.page.query_all(selectors::BLINK_TARGETS) {
            if !self.page.has_class(&element, selectors::BLINK) {
                self.page.add_class(&element, selectors::BLINK);
                blinking.push(element);
            }
        }
    }

    fn bump_hit_counter(&self) {
        let Some(counter) = self.page.query(selectors::HIT_COUNTER) else {
            return;
        };
        let value = increment(self.storage.as_ref(), &self.hits_key, &self.hits);
        if let Err(err) = self.reveal(&counter, value) {
            tracing::warn!(%err, "hit counter animation failed");
        }
    }

    /// Rebuilds the counter as one `0` span per digit, then flips each
    /// span to its real digit on a stagger.
    fn reveal(&self, counter: &P::Element, value: u64) -> Result<()> {
        let digits = counter_digits(value, self.hits.width);
        self.page.clear_children(counter);
        for step in reveal_schedule(&digits, &self.hits) {
            let span = self.page.create("span")?;
            self.page.add_class(&span, selectors::COUNTER_DIGIT);
            self.page.set_text(&span, "0");
            self.page.set_style(
                &span,
                "animation-delay",
                &format!("{}ms", step.animation_delay.as_millis()),
            );
            self.page.append(counter, &span)?;

            let page = Rc::clone(&self.page);
            let digit = step.digit.to_string();
            self.scheduler.set_timeout(
                step.reveal_after,
                Box::new(move || page.set_text(&span, &digit)),
            )?;
        }
        Ok(())
    }
}
