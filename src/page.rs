//! The slice of the DOM the effects touch.
//!
//! Lookups return `None` when an element is missing; callers treat that as
//! "feature not present on this page" and skip quietly.

use crate::error::Result;

/// Class names and selectors shared by the page markup and the stylesheet.
pub mod selectors {
    pub const TOGGLE: &str = "#theme-toggle";
    pub const TOGGLE_BUTTON: &str = ".toggle-btn";
    pub const CANVAS: &str = "#particle-canvas";
    pub const HIT_COUNTER: &str = ".hit-counter";
    pub const BLINK_TARGETS: &str = ".highlight, .job-period";
    pub const SCANLINES: &str = ".retro-scanlines";
    pub const CRT: &str = ".retro-crt";
    pub const CONFIG: &str = "#portfolio-fx-config";

    pub const TRANSITIONING: &str = "theme-transitioning";
    pub const TRANSITION_OVERLAY: &str = "theme-transition-overlay";
    pub const ACTIVE: &str = "active";
    pub const RETRO_ACTIVE: &str = "retro-active";
    pub const MODERN_ACTIVE: &str = "modern-active";
    pub const SCANLINES_CLASS: &str = "retro-scanlines";
    pub const CRT_CLASS: &str = "retro-crt";
    pub const BLINK: &str = "retro-blink";
    pub const PIXEL_CURSOR: &str = "retro-cursor";
    pub const COUNTER_DIGIT: &str = "counter-digit";
}

pub trait Page {
    type Element: Clone;

    /// The `<html>` element.
    fn root(&self) -> Self::Element;
    fn body(&self) -> Option<Self::Element>;
    /// First element matching a CSS selector.
    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    /// First descendant of `scope` matching a CSS selector.
    fn query_within(&self, scope: &Self::Element, selector: &str) -> Option<Self::Element>;

    /// Creates a detached element.
    fn create(&self, tag: &str) -> Result<Self::Element>;
    fn append(&self, parent: &Self::Element, child: &Self::Element) -> Result<()>;
    /// Detaches `element` from its parent.
    fn remove(&self, element: &Self::Element);
    fn clear_children(&self, element: &Self::Element);

    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);
    fn set_text(&self, element: &Self::Element, text: &str);
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);
}

/// Adds `class` when `on`, removes it otherwise.
pub fn toggle_class<P: Page + ?Sized>(page: &P, element: &P::Element, class: &str, on: bool) {
    if on {
        page.add_class(element, class);
    } else {
        page.remove_class(element, class);
    }
}
