//! The full-viewport canvas behind the page.
//!
//! One surface, two effects: the torchlight in the modern theme and the
//! star field in the retro theme. Each effect owns a [`FrameLoop`], and
//! switching modes stops both loops before starting the new one.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::bus::{Subscription, ThemeBus};
use crate::config::Config;
use crate::glow::{Pointer, Torchlight};
use crate::schedule::{FrameLoop, LoopControl, Scheduler};
use crate::starfield::StarField;
use crate::surface::Surface;
use crate::theme::Theme;

struct Shared {
    surface: Rc<RefCell<dyn Surface>>,
    torch: Torchlight,
    stars: Rc<RefCell<StarField>>,
    pointer: Rc<Cell<Pointer>>,
    mode: Rc<Cell<Theme>>,
    glow_loop: FrameLoop,
    star_loop: FrameLoop,
}

/// Cheap handle; clones drive the same canvas.
#[derive(Clone)]
pub struct Backdrop {
    shared: Rc<Shared>,
}

impl Backdrop {
    pub fn new(
        surface: Rc<RefCell<dyn Surface>>,
        scheduler: Rc<dyn Scheduler>,
        config: &Config,
        seed: u64,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                surface,
                torch: Torchlight::new(&config.glow),
                stars: Rc::new(RefCell::new(StarField::new(config.stars.clone(), seed))),
                pointer: Rc::new(Cell::new(Pointer::OFF_SCREEN)),
                mode: Rc::new(Cell::new(Theme::Modern)),
                glow_loop: FrameLoop::new("torchlight", Rc::clone(&scheduler)),
                star_loop: FrameLoop::new("star field", scheduler),
            }),
        }
    }

    /// Follows theme changes published on `bus`.
    #[must_use = "dropping the subscription detaches the backdrop"]
    pub fn attach(&self, bus: &ThemeBus) -> Subscription {
        let backdrop = self.clone();
        bus.subscribe(move |theme| backdrop.set_mode(theme))
    }

    pub fn mode(&self) -> Theme {
        self.shared.mode.get()
    }

    pub fn set_mode(&self, theme: Theme) {
        let shared = &self.shared;
        shared.glow_loop.stop();
        shared.star_loop.stop();
        shared.mode.set(theme);
        shared.surface.borrow_mut().clear();

        match theme {
            Theme::Modern => self.start_glow(),
            Theme::Retro => self.start_stars(),
        }
    }

    pub fn activate_retro(&self) {
        self.set_mode(Theme::Retro);
    }

    pub fn deactivate_retro(&self) {
        self.set_mode(Theme::Modern);
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.shared.surface.borrow_mut().resize(width, height);
        if self.mode() == Theme::Retro {
            self.shared.stars.borrow_mut().regenerate(width, height);
        }
    }

    pub fn pointer_moved(&self, x: f64, y: f64) {
        self.shared.pointer.set(Pointer::at(x, y));
    }

    pub fn pointer_left(&self) {
        self.shared.pointer.set(Pointer::OFF_SCREEN);
    }

    pub fn is_glowing(&self) -> bool {
        self.shared.glow_loop.is_running()
    }

    pub fn is_starry(&self) -> bool {
        self.shared.star_loop.is_running()
    }

    pub fn stars(&self) -> Ref<'_, StarField> {
        self.shared.stars.borrow()
    }

    fn start_glow(&self) {
        let surface = Rc::clone(&self.shared.surface);
        let pointer = Rc::clone(&self.shared.pointer);
        let mode = Rc::clone(&self.shared.mode);
        let torch = self.shared.torch.clone();
        self.shared.glow_loop.start(move || {
            if mode.get() != Theme::Modern {
                return LoopControl::Stop;
            }
            torch.draw(&mut *surface.borrow_mut(), pointer.get());
            LoopControl::Continue
        });
    }

    fn start_stars(&self) {
        let (width, height) = self.shared.surface.borrow().size();
        self.shared.stars.borrow_mut().regenerate(width, height);

        let surface = Rc::clone(&self.shared.surface);
        let stars = Rc::clone(&self.shared.stars);
        let mode = Rc::clone(&self.shared.mode);
        self.shared.star_loop.start(move || {
            if mode.get() != Theme::Retro {
                return LoopControl::Stop;
            }
            stars.borrow_mut().frame(&mut *surface.borrow_mut());
            LoopControl::Continue
        });
    }
}
