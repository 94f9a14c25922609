//! 2D drawing target shared by the canvas effects.

use crate::theme::Rgba;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point `distance` away along `angle` (radians, canvas orientation).
    pub fn along(self, angle: f64, distance: f64) -> Point {
        Point::new(
            self.x + angle.cos() * distance,
            self.y + angle.sin() * distance,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Drawing primitives used by the glow and the star field.
pub trait Surface {
    /// Drawing buffer size in pixels.
    fn size(&self) -> (f64, f64);
    fn resize(&mut self, width: f64, height: f64);
    fn clear(&mut self);
    /// Fills the whole surface with a (usually translucent) colour.
    fn wash(&mut self, color: Rgba);
    /// Disc of `radius` filled with a radial gradient centred on `center`.
    fn radial_glow(&mut self, center: Point, radius: f64, stops: &[ColorStop]);
    /// Filled circle with a same-coloured shadow halo.
    fn glow_dot(&mut self, center: Point, radius: f64, color: Rgba, blur: f64);
    /// Line fading linearly from `head` at `from` to transparent at `to`.
    fn streak(&mut self, from: Point, to: Point, head: Rgba, width: f64);
}
