//! Ember grid: a lattice of glowing points warmed by a light that trails
//! the cursor. Rendered with WebGL2 point sprites in the browser.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::bus::{Subscription, ThemeBus};
use crate::error::Result;
use crate::schedule::{FrameLoop, LoopControl, Scheduler};
use crate::theme::Theme;

const PITCH: f64 = 30.0;
const JITTER: f64 = 20.0;
const MAX_POINTS: usize = 2000;
const REACH: f64 = 80.0;
const EASE: f64 = 0.1;
const MIN_SIZE: f32 = 0.5;

/// Point positions are centred on the viewport, y pointing up.
pub struct EmberGrid {
    width: f64,
    height: f64,
    /// Interleaved `x, y` per point.
    positions: Vec<f32>,
    sizes: Vec<f32>,
    /// Interleaved `r, g, b` per point.
    colors: Vec<f32>,
    light: (f64, f64),
    target: (f64, f64),
}

impl EmberGrid {
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut positions = Vec::new();
        let mut sizes = Vec::new();
        let mut colors = Vec::new();

        let mut x = -width / 2.0;
        'grid: while x < width / 2.0 {
            let mut y = -height / 2.0;
            while y < height / 2.0 {
                if sizes.len() == MAX_POINTS {
                    break 'grid;
                }
                positions.push((x + (rng.random::<f64>() - 0.5) * JITTER) as f32);
                positions.push((y + (rng.random::<f64>() - 0.5) * JITTER) as f32);
                sizes.push(rng.random::<f32>() * 1.5 + MIN_SIZE);
                colors.extend([1.0, 0.5 + rng.random::<f32>() * 0.2, rng.random::<f32>() * 0.1]);
                y += PITCH;
            }
            x += PITCH;
        }

        Self {
            width,
            height,
            positions,
            sizes,
            colors,
            light: (0.0, 0.0),
            target: (0.0, 0.0),
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn light(&self) -> (f64, f64) {
        self.light
    }

    /// Points the light at a cursor position in client pixels.
    pub fn aim(&mut self, client_x: f64, client_y: f64) {
        self.target = (client_x - self.width / 2.0, -(client_y - self.height / 2.0));
    }

    /// Eases the light towards its target and re-lights every point.
    pub fn step(&mut self) {
        self.light.0 += (self.target.0 - self.light.0) * EASE;
        self.light.1 += (self.target.1 - self.light.1) * EASE;

        for i in 0..self.sizes.len() {
            let dx = f64::from(self.positions[i * 2]) - self.light.0;
            let dy = f64::from(self.positions[i * 2 + 1]) - self.light.1;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < REACH {
                let scale = (1.0 - distance / REACH) as f32;
                self.sizes[i] = MIN_SIZE + 4.0 * scale * scale;
                self.colors[i * 3 + 1] = 0.5 + 0.5 * scale;
                self.colors[i * 3 + 2] = 0.2 * scale;
            } else {
                self.sizes[i] = (self.sizes[i] * 0.99).max(MIN_SIZE);
                self.colors[i * 3 + 1] = 0.5;
                self.colors[i * 3 + 2] = 0.0;
            }
        }
    }
}

/// Something that can put an [`EmberGrid`] on screen.
pub trait EmberRenderer {
    fn resize(&mut self, width: f64, height: f64);
    fn draw(&mut self, grid: &EmberGrid) -> Result<()>;
    /// Wipes the drawing buffer.
    fn blank(&mut self);
}

/// Runs the grid while the modern theme is active.
pub struct EmberLayer<R: EmberRenderer> {
    grid: Rc<RefCell<EmberGrid>>,
    renderer: Rc<RefCell<R>>,
    frame_loop: FrameLoop,
    seed: u64,
}

impl<R: EmberRenderer + 'static> EmberLayer<R> {
    pub fn new(renderer: R, scheduler: Rc<dyn Scheduler>, width: f64, height: f64, seed: u64) -> Self {
        Self {
            grid: Rc::new(RefCell::new(EmberGrid::new(width, height, seed))),
            renderer: Rc::new(RefCell::new(renderer)),
            frame_loop: FrameLoop::new("ember grid", scheduler),
            seed,
        }
    }

    #[must_use = "dropping the subscription detaches the ember layer"]
    pub fn attach(self: &Rc<Self>, bus: &ThemeBus) -> Subscription {
        let layer = Rc::clone(self);
        bus.subscribe(move |theme| layer.set_mode(theme))
    }

    pub fn set_mode(&self, theme: Theme) {
        match theme {
            Theme::Modern => self.start(),
            Theme::Retro => {
                self.frame_loop.stop();
                self.renderer.borrow_mut().blank();
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn aim(&self, client_x: f64, client_y: f64) {
        self.grid.borrow_mut().aim(client_x, client_y);
    }

    /// Rebuilds the lattice for a new viewport.
    pub fn resize(&self, width: f64, height: f64) {
        self.renderer.borrow_mut().resize(width, height);
        *self.grid.borrow_mut() = EmberGrid::new(width, height, self.seed);
    }

    fn start(&self) {
        let grid = Rc::clone(&self.grid);
        let renderer = Rc::clone(&self.renderer);
        self.frame_loop.start(move || {
            let mut grid = grid.borrow_mut();
            grid.step();
            match renderer.borrow_mut().draw(&grid) {
                Ok(()) => LoopControl::Continue,
                Err(err) => {
                    tracing::error!(%err, "ember grid stopped");
                    LoopControl::Stop
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::ManualScheduler;

    #[test]
    fn lattice_covers_viewport_and_is_capped() {
        let small = EmberGrid::new(300.0, 150.0, 1);
        assert_eq!(small.len(), 10 * 5);
        assert_eq!(small.positions().len(), small.len() * 2);
        assert_eq!(small.colors().len(), small.len() * 3);

        let huge = EmberGrid::new(4000.0, 4000.0, 1);
        assert_eq!(huge.len(), 2000);
    }

    #[test]
    fn light_eases_towards_cursor() {
        let mut grid = EmberGrid::new(200.0, 200.0, 1);
        grid.aim(200.0, 0.0);
        grid.step();
        let (x, y) = grid.light();
        assert!((x - 10.0).abs() < 1e-9);
        assert!((y - 10.0).abs() < 1e-9);
        for _ in 0..200 {
            grid.step();
        }
        let (x, y) = grid.light();
        assert!((x - 100.0).abs() < 1e-3 && (y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn points_near_the_light_grow_and_others_settle() {
        let mut grid = EmberGrid::new(600.0, 600.0, 5);
        grid.aim(300.0, 300.0);
        for _ in 0..500 {
            grid.step();
        }
        for i in 0..grid.len() {
            let (x, y) = (grid.positions()[i * 2], grid.positions()[i * 2 + 1]);
            let near = f64::from(x).hypot(f64::from(y)) < 70.0;
            let far = f64::from(x).hypot(f64::from(y)) > 90.0;
            if near {
                assert!(grid.sizes()[i] > 0.5 + 4.0 * 0.0156);
            }
            if far {
                assert!(grid.sizes()[i] < 0.51);
                assert_eq!(grid.colors()[i * 3 + 2], 0.0);
            }
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        draws: Rc<std::cell::Cell<usize>>,
        blanks: Rc<std::cell::Cell<usize>>,
    }

    impl EmberRenderer for CountingRenderer {
        fn resize(&mut self, _width: f64, _height: f64) {}

        fn draw(&mut self, _grid: &EmberGrid) -> Result<()> {
            self.draws.set(self.draws.get() + 1);
            Ok(())
        }

        fn blank(&mut self) {
            self.blanks.set(self.blanks.get() + 1);
        }
    }

    #[test]
    fn runs_only_in_modern_theme() {
        let scheduler = Rc::new(ManualScheduler::new());
        let renderer = CountingRenderer::default();
        let draws = Rc::clone(&renderer.draws);
        let blanks = Rc::clone(&renderer.blanks);
        let layer = Rc::new(EmberLayer::new(renderer, scheduler.clone(), 300.0, 300.0, 1));
        let bus = ThemeBus::new();
        let _sub = layer.attach(&bus);

        bus.publish(Theme::Modern);
        scheduler.run_frames(3);
        assert_eq!(draws.get(), 3);
        assert!(layer.is_running());

        bus.publish(Theme::Retro);
        scheduler.run_frames(3);
        assert_eq!(draws.get(), 3);
        assert_eq!(blanks.get(), 1);
        assert!(!layer.is_running());
    }

    struct FailingRenderer {
        draws: Rc<std::cell::Cell<usize>>,
    }

    impl EmberRenderer for FailingRenderer {
        fn resize(&mut self, _width: f64, _height: f64) {}

        fn draw(&mut self, _grid: &EmberGrid) -> Result<()> {
            self.draws.set(self.draws.get() + 1);
            Err(crate::error::Error::Render("context lost".into()))
        }

        fn blank(&mut self) {}
    }

    #[test]
    fn draw_failure_stops_the_loop() {
        let scheduler = Rc::new(ManualScheduler::new());
        let draws = Rc::new(std::cell::Cell::new(0));
        let renderer = FailingRenderer {
            draws: Rc::clone(&draws),
        };
        let layer = EmberLayer::new(renderer, scheduler.clone(), 300.0, 300.0, 1);

        layer.set_mode(Theme::Modern);
        assert!(layer.is_running());
        scheduler.run_frame();
        assert!(!layer.is_running());

        scheduler.run_frames(3);
        assert_eq!(draws.get(), 1);
        assert_eq!(scheduler.pending_frames(), 0);
    }
}
