//! Falling, twinkling star field with the odd shooting star.

use std::f64::consts::{PI, TAU};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::StarConfig;
use crate::surface::{Point, Surface};
use crate::theme::Rgba;

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Pixels fallen per frame.
    pub speed: f64,
    /// Twinkle phase in radians.
    pub phase: f64,
    pub phase_speed: f64,
    pub color: Rgba,
}

impl Star {
    /// Current brightness in `[0, 1]`.
    pub fn brightness(&self) -> f64 {
        0.5 + self.phase.sin() * 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShootingStar {
    pub origin: Point,
    pub length: f64,
    pub speed: f64,
    pub angle: f64,
    /// Starts at 1 and decays every frame; the star is gone at 0.
    pub life: f64,
}

impl ShootingStar {
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

pub struct StarField {
    config: StarConfig,
    width: f64,
    height: f64,
    stars: Vec<Star>,
    shooting: Option<ShootingStar>,
    rng: SmallRng,
}

impl StarField {
    pub fn new(config: StarConfig, seed: u64) -> Self {
        Self {
            config,
            width: 0.0,
            height: 0.0,
            stars: Vec::new(),
            shooting: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn shooting_star(&self) -> Option<&ShootingStar> {
        self.shooting.as_ref()
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Replaces every star with a fresh one inside `width` x `height` and
    /// drops any shooting star in flight.
    pub fn regenerate(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.shooting = None;
        let count = self.config.count;
        let stars: Vec<Star> = (0..count).map(|_| self.random_star()).collect();
        self.stars = stars;
    }

    fn random_star(&mut self) -> Star {
        let rng = &mut self.rng;
        let x = rng.random::<f64>() * self.width;
        let y = rng.random::<f64>() * self.height;
        let size = rng.random::<f64>() * 2.0 + 0.5;
        let speed = rng.random::<f64>() * 0.3 + 0.1;
        let phase = rng.random::<f64>() * TAU;
        let phase_speed = rng.random::<f64>() * 0.03 + 0.01;
        let color = if rng.random::<f64>() > 0.7 {
            Rgba::CYAN
        } else if rng.random::<f64>() > 0.5 {
            Rgba::MAGENTA
        } else {
            Rgba::GREEN
        };
        Star {
            x,
            y,
            size,
            speed,
            phase,
            phase_speed,
            color,
        }
    }

    /// Advances and paints one frame.
    pub fn frame(&mut self, surface: &mut dyn Surface) {
        surface.wash(self.config.trail);

        let blur = self.config.glow_blur;
        let rng = &mut self.rng;
        for star in &mut self.stars {
            star.phase += star.phase_speed;
            star.y += star.speed;
            if star.y > self.height {
                star.y = 0.0;
                star.x = rng.random::<f64>() * self.width;
            }
            surface.glow_dot(
                Point::new(star.x, star.y),
                star.size * star.brightness(),
                star.color,
                blur,
            );
        }

        self.advance_shooting_star(surface);

        let idle = !matches!(&self.shooting, Some(s) if s.is_alive());
        if idle && self.rng.random::<f64>() < self.config.shooting_chance {
            self.spawn_shooting_star();
        }
    }

    fn advance_shooting_star(&mut self, surface: &mut dyn Surface) {
        let Some(shooting) = self.shooting.as_mut() else {
            return;
        };
        if shooting.is_alive() {
            let tail = shooting.origin.along(shooting.angle, shooting.length);
            surface.streak(
                shooting.origin,
                tail,
                Rgba::WHITE.with_alpha(shooting.life),
                2.0,
            );
            shooting.origin = shooting.origin.along(shooting.angle, shooting.speed);
            shooting.life -= self.config.shooting_decay;
        }
        if !shooting.is_alive() {
            self.shooting = None;
        }
    }

    /// Launches a shooting star from the upper-left part of the sky.
    pub fn spawn_shooting_star(&mut self) {
        let rng = &mut self.rng;
        let origin = Point::new(
            rng.random::<f64>() * self.width * 0.6,
            rng.random::<f64>() * self.height * 0.3,
        );
        self.shooting = Some(ShootingStar {
            origin,
            length: 60.0 + rng.random::<f64>() * 30.0,
            speed: 10.0 + rng.random::<f64>() * 8.0,
            angle: PI / 4.0 + (rng.random::<f64>() - 0.5) * 0.2,
            life: 1.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{DrawCall, RecordingSurface};

    fn field() -> StarField {
        StarField::new(StarConfig::default(), 7)
    }

    #[test]
    fn regenerate_fills_the_bounds() {
        let mut stars = field();
        stars.regenerate(640.0, 480.0);
        assert_eq!(stars.stars().len(), 100);
        for star in stars.stars() {
            assert!((0.0..640.0).contains(&star.x));
            assert!((0.0..480.0).contains(&star.y));
            assert!((0.5..2.5).contains(&star.size));
            assert!((0.1..0.4).contains(&star.speed));
            assert!((0.01..0.04).contains(&star.phase_speed));
            assert!([Rgba::CYAN, Rgba::MAGENTA, Rgba::GREEN].contains(&star.color));
        }
    }

    #[test]
    fn stars_wrap_to_the_top() {
        let mut stars = field();
        stars.regenerate(100.0, 10.0);
        let mut surface = RecordingSurface::new(100.0, 10.0);
        for _ in 0..200 {
            stars.frame(&mut surface);
            for star in stars.stars() {
                assert!(star.y <= 10.0 + 0.4);
                assert!((0.0..100.0).contains(&star.x));
            }
        }
    }

    #[test]
    fn frame_washes_then_draws_every_star() {
        let mut stars = field();
        stars.regenerate(300.0, 200.0);
        let mut surface = RecordingSurface::new(300.0, 200.0);
        stars.frame(&mut surface);
        let calls = surface.take_calls();
        assert_eq!(calls[0], DrawCall::Wash(Rgba::new(0, 0, 51, 0.15)));
        let dots = calls
            .iter()
            .filter(|call| matches!(call, DrawCall::GlowDot { blur, .. } if *blur == 8.0))
            .count();
        assert_eq!(dots, 100);
    }

    #[test]
    fn shooting_star_fades_out_in_fifty_frames() {
        let config = StarConfig {
            count: 0,
            shooting_chance: 0.0,
            ..StarConfig::default()
        };
        let mut stars = StarField::new(config, 3);
        stars.regenerate(800.0, 600.0);
        stars.spawn_shooting_star();

        let spawned = stars.shooting_star().cloned().unwrap();
        assert!(spawned.origin.x < 480.0 && spawned.origin.y < 180.0);
        assert!((PI / 4.0 - spawned.angle).abs() <= 0.1);

        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut frames = 0;
        while stars.shooting_star().is_some() {
            stars.frame(&mut surface);
            frames += 1;
            assert!(frames <= 51, "shooting star never expired");
        }
        let streaks = surface
            .calls()
            .iter()
            .filter(|call| matches!(call, DrawCall::Streak { .. }))
            .count();
        assert_eq!(streaks, frames);
        assert!((49..=51).contains(&frames));
    }

    #[test]
    fn at_most_one_shooting_star() {
        let config = StarConfig {
            count: 0,
            shooting_chance: 1.0,
            ..StarConfig::default()
        };
        let mut stars = StarField::new(config, 11);
        stars.regenerate(800.0, 600.0);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        for _ in 0..120 {
            stars.frame(&mut surface);
            let streaks = surface
                .take_calls()
                .into_iter()
                .filter(|call| matches!(call, DrawCall::Streak { .. }))
                .count();
            assert!(streaks <= 1);
        }
    }

    #[test]
    fn regenerate_discards_shooting_star() {
        let mut stars = field();
        stars.regenerate(800.0, 600.0);
        stars.spawn_shooting_star();
        stars.regenerate(1024.0, 768.0);
        assert!(stars.shooting_star().is_none());
        assert_eq!(stars.bounds(), (1024.0, 768.0));
    }
}
