use std::rc::Rc;
use std::time::Duration;

use crate::error::Result;
use crate::page::{selectors, Page};
use crate::schedule::Scheduler;
use crate::theme::Theme;

/// Plays the full-viewport overlay that bridges two themes.
///
/// The overlay is appended without its `active` class and receives it on
/// the next animation frame, so the browser has committed the initial
/// style when the CSS transition starts. It is removed after `duration`.
pub fn run_transition<P: Page + 'static>(
    page: &Rc<P>,
    scheduler: &dyn Scheduler,
    to: Theme,
    duration: Duration,
) -> Result<()> {
    let Some(body) = page.body() else {
        return Ok(());
    };

    let overlay = page.create("div")?;
    page.add_class(&overlay, selectors::TRANSITION_OVERLAY);
    page.set_attribute(&overlay, "data-to-theme", to.as_str());
    page.append(&body, &overlay)?;

    let activate = {
        let page = Rc::clone(page);
        let overlay = overlay.clone();
        move || page.add_class(&overlay, selectors::ACTIVE)
    };
    scheduler.request_frame(Box::new(activate))?;

    let page = Rc::clone(page);
    scheduler.set_timeout(duration, Box::new(move || page.remove(&overlay)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{FakePage, ManualScheduler};

    #[test]
    fn overlay_activates_next_frame_and_leaves_after_duration() {
        let page = Rc::new(FakePage::new());
        let scheduler = ManualScheduler::new();

        run_transition(&page, &scheduler, Theme::Retro, Duration::from_millis(800)).unwrap();

        let overlay = page.query(".theme-transition-overlay").unwrap();
        assert_eq!(page.attribute(overlay, "data-to-theme").as_deref(), Some("retro"));
        assert!(!page.has_class(&overlay, "active"));

        scheduler.run_frame();
        assert!(page.has_class(&overlay, "active"));

        scheduler.advance(Duration::from_millis(799));
        assert_eq!(page.count(".theme-transition-overlay"), 1);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(page.count(".theme-transition-overlay"), 0);
    }

    #[test]
    fn without_body_nothing_happens() {
        let page = Rc::new(FakePage::without_body());
        let scheduler = ManualScheduler::new();
        run_transition(&page, &scheduler, Theme::Modern, Duration::from_millis(800)).unwrap();
        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(scheduler.pending_timers(), 0);
    }
}
