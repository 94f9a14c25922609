use std::time::Duration;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use super::dom::describe;
use crate::error::{Error, Result};
use crate::schedule::{Callback, FrameId, Scheduler};

/// `requestAnimationFrame` and `setTimeout` on the page's window.
///
/// Callbacks are one-shot closures that free themselves when they run. A
/// cancelled frame leaks its closure; frames are only cancelled on theme
/// switches.
pub struct WebScheduler {
    window: Window,
}

impl WebScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for WebScheduler {
    fn request_frame(&self, callback: Callback) -> Result<FrameId> {
        let callback = Closure::once_into_js(move || callback());
        self.window
            .request_animation_frame(callback.unchecked_ref())
            .map(FrameId)
            .map_err(|err| Error::Scheduler(describe(&err)))
    }

    fn cancel_frame(&self, id: FrameId) {
        if let Err(err) = self.window.cancel_animation_frame(id.0) {
            tracing::warn!(err = %describe(&err), "cancelAnimationFrame failed");
        }
    }

    fn set_timeout(&self, delay: Duration, callback: Callback) -> Result<()> {
        let callback = Closure::once_into_js(move || callback());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
            .map(drop)
            .map_err(|err| Error::Scheduler(describe(&err)))
    }
}
