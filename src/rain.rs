//! Full-viewport rain: a fixed population of drops plus splash rings.
//!
//! Drops are never destroyed. When one crosses the ground line it leaves a
//! splash behind and is recycled above the top edge with a fresh velocity.
//! Integration is per frame (velocities are px/frame), matching the display
//! refresh cadence the loop runs at.

use std::f64::consts::TAU;

use rand::Rng;

use crate::color::{self, Color};
use crate::config::{RainConfig, spread};
use crate::surface::{StrokeStyle, Surface};

#[derive(Clone, Debug, PartialEq)]
pub struct Drop {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub vy: f64,
    pub vx: f64,
    pub line_width: f64,
    /// Translucent stroke color derived from `base_color`.
    pub color: String,
    pub base_color: Color,
    /// Sway phase offset in radians.
    pub phase: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Splash {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub max_radius: f64,
    pub alpha: f64,
    pub color: Color,
}

impl Splash {
    pub fn advance(&mut self, growth: f64, decay: f64) {
        self.radius += growth;
        self.alpha *= decay;
    }

    pub fn is_spent(&self, cutoff: f64) -> bool {
        self.alpha < cutoff || self.radius > self.max_radius
    }
}

/// Horizontal wind from the pointer's offset to the viewport centre.
pub fn wind_from_pointer(pointer_x: f64, width: f64, range: f64) -> f64 {
    if width <= 0.0 || !pointer_x.is_finite() {
        return 0.0;
    }
    let raw = (pointer_x - width / 2.0) / width * (2.0 * range);
    raw.clamp(-range, range)
}

#[derive(Clone, Debug)]
pub struct RainField {
    cfg: RainConfig,
    width: f64,
    height: f64,
    drops: Vec<Drop>,
    splashes: Vec<Splash>,
}

impl RainField {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, cfg: RainConfig, width: f64, height: f64) -> Self {
        let mut field = Self {
            cfg,
            width: 0.0,
            height: 0.0,
            drops: Vec::new(),
            splashes: Vec::new(),
        };
        field.resize(rng, width, height);
        field
    }

    /// Reseed the whole population for the new viewport and drop all splashes.
    pub fn resize<R: Rng + ?Sized>(&mut self, rng: &mut R, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.splashes.clear();
        self.drops.clear();
        self.drops.reserve(self.cfg.drop_count);
        for _ in 0..self.cfg.drop_count {
            let drop = self.seed_drop(rng);
            self.drops.push(drop);
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn drops(&self) -> &[Drop] {
        &self.drops
    }

    pub fn splashes(&self) -> &[Splash] {
        &self.splashes
    }

    pub fn ground(&self) -> f64 {
        self.height - self.cfg.ground_offset
    }

    pub fn clear(&mut self) {
        self.drops.clear();
        self.splashes.clear();
    }

    /// Advance one frame at time `now` (ms) under `wind`.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64, wind: f64) {
        let t = now * 0.001;
        let wind = wind.clamp(-self.cfg.wind_range, self.cfg.wind_range);
        let margin = self.cfg.wrap_margin;
        let ground = self.ground();

        for i in 0..self.drops.len() {
            let d = &mut self.drops[i];
            d.vx += (t * self.cfg.sway_frequency + d.phase).sin() * self.cfg.sway_amplitude;
            d.x += d.vx + wind * self.cfg.wind_gain;
            d.y += d.vy;

            if d.x < -margin {
                d.x = self.width + margin;
            }
            if d.x > self.width + margin {
                d.x = -margin;
            }

            if d.y > ground {
                let splash = Splash {
                    x: d.x,
                    y: ground,
                    radius: 0.0,
                    max_radius: self.cfg.splash_base_radius
                        + d.length * self.cfg.splash_radius_per_length,
                    alpha: self.cfg.splash_alpha,
                    color: d.base_color,
                };
                self.splashes.push(splash);
                self.recycle(rng, i);
            }
        }

        let (growth, decay, cutoff) = (
            self.cfg.splash_growth,
            self.cfg.splash_decay,
            self.cfg.splash_cutoff,
        );
        self.splashes.retain_mut(|s| {
            s.advance(growth, decay);
            !s.is_spent(cutoff)
        });
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for d in &self.drops {
            let style = StrokeStyle::new(d.color.as_str(), d.line_width).round();
            surface.stroke_line(&style, d.x, d.y, d.x - d.vx * 4.0, d.y - d.length);
        }
        for s in &self.splashes {
            let style = StrokeStyle::new(s.color.rgba(self.cfg.splash_stroke_alpha * s.alpha), 1.0);
            surface.stroke_circle(&style, s.x, s.y, s.radius);
        }
    }

    fn seed_drop<R: Rng + ?Sized>(&self, rng: &mut R) -> Drop {
        let base_color = color::pick(rng);
        let alpha = self.cfg.drop_alpha.sample(rng);
        Drop {
            x: unit(rng) * self.width,
            y: unit(rng) * self.height,
            length: self.cfg.drop_length.sample(rng),
            vy: self.cfg.initial_vy.sample(rng),
            vx: spread(rng, self.cfg.initial_vx_spread),
            line_width: self.cfg.line_width.sample(rng),
            color: base_color.rgba(alpha),
            base_color,
            phase: unit(rng) * TAU,
        }
    }

    fn recycle<R: Rng + ?Sized>(&mut self, rng: &mut R, i: usize) {
        let x = unit(rng) * self.width;
        let y = -unit(rng) * self.cfg.respawn_height;
        let vy = self.cfg.respawn_vy.sample(rng);
        let vx = spread(rng, self.cfg.respawn_vx_spread);
        let d = &mut self.drops[i];
        d.x = x;
        d.y = y;
        d.vy = vy;
        d.vx = vx;
    }
}

fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.r#gen::<f64>()
}
