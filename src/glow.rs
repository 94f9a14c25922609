//! Cursor-following torchlight for the modern theme.

use crate::config::GlowConfig;
use crate::surface::{ColorStop, Point, Surface};
use crate::theme::Rgba;

/// Last known cursor or touch position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer(Point);

impl Pointer {
    /// Where the pointer is parked once it leaves the page.
    pub const OFF_SCREEN: Pointer = Pointer(Point::new(-100.0, -100.0));

    pub fn at(x: f64, y: f64) -> Self {
        Pointer(Point::new(x, y))
    }

    pub fn position(self) -> Point {
        self.0
    }

    pub fn is_on_screen(self) -> bool {
        self.0.x > 0.0 && self.0.y > 0.0
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::OFF_SCREEN
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Torchlight {
    radius: f64,
    intensity: f64,
}

/// Edge colour of the light, fully transparent navy.
const FRINGE: Rgba = Rgba::new(10, 25, 47, 0.0);

impl Torchlight {
    pub fn new(config: &GlowConfig) -> Self {
        Self {
            radius: config.radius,
            intensity: config.intensity,
        }
    }

    pub fn stops(&self) -> [ColorStop; 4] {
        let alpha = self.intensity;
        [
            ColorStop::new(0.0, Rgba::WHITE.with_alpha(alpha)),
            ColorStop::new(0.25, Rgba::WHITE.with_alpha(alpha * 0.6)),
            ColorStop::new(0.5, Rgba::WHITE.with_alpha(alpha * 0.3)),
            ColorStop::new(1.0, FRINGE),
        ]
    }

    /// One frame: clear, then light the pointer if it is on the page.
    pub fn draw(&self, surface: &mut dyn Surface, pointer: Pointer) {
        surface.clear();
        if pointer.is_on_screen() {
            surface.radial_glow(pointer.position(), self.radius, &self.stops());
        }
    }
}
