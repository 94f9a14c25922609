use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::dom::describe;
use crate::error::{Error, Result};
use crate::surface::{ColorStop, Point, Surface};
use crate::theme::Rgba;

/// [`Surface`] backed by a 2D canvas context.
///
/// Path and gradient calls only throw for negative radii or non-finite
/// offsets, which the effects never produce, so their errors are dropped.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|err| Error::Render(describe(&err)))?
            .ok_or_else(|| Error::Render("2d context not supported".to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Render("unexpected 2d context type".to_owned()))?;
        Ok(Self { canvas, ctx })
    }

    fn disc(&self, center: Point, radius: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU);
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
    }

    fn clear(&mut self) {
        let (width, height) = self.size();
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn wash(&mut self, color: Rgba) {
        let (width, height) = self.size();
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn radial_glow(&mut self, center: Point, radius: f64, stops: &[ColorStop]) {
        let Ok(gradient) = self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
        else {
            return;
        };
        for stop in stops {
            let _ = gradient.add_color_stop(stop.offset as f32, &stop.color.to_string());
        }
        self.disc(center, radius);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill();
    }

    fn glow_dot(&mut self, center: Point, radius: f64, color: Rgba, blur: f64) {
        let css = color.to_string();
        self.ctx.save();
        self.disc(center, radius);
        self.ctx.set_fill_style_str(&css);
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_color(&css);
        self.ctx.fill();
        self.ctx.restore();
    }

    fn streak(&mut self, from: Point, to: Point, head: Rgba, width: f64) {
        let gradient = self.ctx.create_linear_gradient(from.x, from.y, to.x, to.y);
        let _ = gradient.add_color_stop(0.0, &head.to_string());
        let _ = gradient.add_color_stop(1.0, &head.with_alpha(0.0).to_string());
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.set_stroke_style_canvas_gradient(&gradient);
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }
}
