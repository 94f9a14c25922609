//! Frame and timer scheduling.
//!
//! Everything runs on the page's main thread. A frame callback runs to
//! completion and re-requests itself if it wants another frame.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::error::Result;

/// Identifier returned by `requestAnimationFrame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub i32);

pub type Callback = Box<dyn FnOnce()>;

/// Host event loop: animation frames and one-shot timers.
pub trait Scheduler {
    fn request_frame(&self, callback: Callback) -> Result<FrameId>;
    fn cancel_frame(&self, id: FrameId);
    fn set_timeout(&self, delay: Duration, callback: Callback) -> Result<()>;
}

/// Whether a loop step wants another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

type Step = Box<dyn FnMut() -> LoopControl>;

struct LoopState {
    name: &'static str,
    scheduler: Rc<dyn Scheduler>,
    handle: Cell<Option<FrameId>>,
    step: RefCell<Option<Step>>,
}

/// A render loop owning at most one pending frame request.
///
/// [`FrameLoop::start`] always cancels the pending request before
/// scheduling, so restarting can never leave two loops drawing.
pub struct FrameLoop {
    state: Rc<LoopState>,
}

impl FrameLoop {
    pub fn new(name: &'static str, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            state: Rc::new(LoopState {
                name,
                scheduler,
                handle: Cell::new(None),
                step: RefCell::new(None),
            }),
        }
    }

    /// Replaces the step function and runs it from the next frame on.
    pub fn start(&self, step: impl FnMut() -> LoopControl + 'static) {
        self.stop();
        match self.state.step.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(Box::new(step)),
            Err(_) => {
                tracing::warn!(name = self.state.name, "loop restarted from its own step");
                return;
            }
        }
        tracing::debug!(name = self.state.name, "loop started");
        schedule(&self.state);
    }

    /// Cancels the pending frame, if any.
    pub fn stop(&self) {
        if let Some(id) = self.state.handle.take() {
            self.state.scheduler.cancel_frame(id);
            tracing::debug!(name = self.state.name, "loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.handle.get().is_some()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule(state: &Rc<LoopState>) {
    let weak: Weak<LoopState> = Rc::downgrade(state);
    let requested = state.scheduler.request_frame(Box::new(move || {
        let Some(state) = weak.upgrade() else {
            return;
        };
        state.handle.set(None);
        let control = match state.step.try_borrow_mut() {
            Ok(mut slot) => match slot.as_mut() {
                Some(step) => step(),
                None => LoopControl::Stop,
            },
            Err(_) => LoopControl::Stop,
        };
        // `start` from inside the step already scheduled a frame.
        if control == LoopControl::Continue && state.handle.get().is_none() {
            schedule(&state);
        }
    }));
    match requested {
        Ok(id) => state.handle.set(Some(id)),
        Err(err) => tracing::warn!(name = state.name, %err, "could not schedule frame"),
    }
}
