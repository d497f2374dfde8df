//! Puddle ripples inside a bounded container.
//!
//! Each interactive surface owns one [`RippleField`]: its own ripples, its
//! own canvas size and device pixel ratio. Nothing is shared between fields.

use rand::Rng;

use crate::color::{Accent, Color};
use crate::config::RippleConfig;
use crate::surface::{BufferSize, Composite, StrokeStyle, Surface, css_extent, effective_dpr};

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ripple {
    pub x: f64,
    pub y: f64,
    pub max_radius: f64,
    /// Spawn timestamp in ms.
    pub start: f64,
    pub duration_ms: f64,
    pub color: Color,
}

impl Ripple {
    /// Elapsed fraction of the duration, clamped to [0, 1].
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn radius(&self, now: f64) -> f64 {
        self.max_radius * ease_out_cubic(self.progress(now))
    }

    pub fn alpha(&self, now: f64) -> f64 {
        1.0 - self.progress(now)
    }

    pub fn is_done(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

#[derive(Clone, Debug)]
pub struct RippleField {
    cfg: RippleConfig,
    css_width: f64,
    css_height: f64,
    dpr: f64,
    accent: Accent,
    ripples: Vec<Ripple>,
}

impl RippleField {
    /// `accent` is the container's marker color, used for click ripples.
    pub fn new(cfg: RippleConfig, accent: Accent, css_width: f64, css_height: f64, dpr: f64) -> Self {
        let mut field = Self {
            cfg,
            css_width: 0.0,
            css_height: 0.0,
            dpr: 1.0,
            accent,
            ripples: Vec::new(),
        };
        field.resize(css_width, css_height, dpr);
        field
    }

    /// Re-measure the container; returns the backing-store size to apply.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> BufferSize {
        self.css_width = css_extent(css_width, self.cfg.min_extent);
        self.css_height = css_extent(css_height, self.cfg.min_extent);
        self.dpr = effective_dpr(dpr);
        self.buffer_size()
    }

    pub fn buffer_size(&self) -> BufferSize {
        BufferSize::for_css(self.css_width, self.css_height, self.dpr)
    }

    pub fn css_size(&self) -> (f64, f64) {
        (self.css_width, self.css_height)
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    pub fn accent(&self) -> Accent {
        self.accent
    }

    pub fn set_accent(&mut self, accent: Accent) {
        self.accent = accent;
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    /// Click ripple at container-local `(x, y)`. `reach_box` is the measured
    /// container box the reach is taken from.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        x: f64,
        y: f64,
        reach_box: (f64, f64),
        now: f64,
    ) -> &Ripple {
        let color = if self.cfg.accent_from_marker {
            self.accent.color()
        } else {
            Accent::Blue.color()
        };
        let ripple = Ripple {
            x,
            y,
            max_radius: reach_box.0.max(reach_box.1) * self.cfg.reach,
            start: now,
            duration_ms: self.cfg.duration_ms.sample(rng),
            color,
        };
        self.push(ripple)
    }

    /// Centred blue ripple shown once when the field is registered.
    pub fn welcome(&mut self, now: f64) -> &Ripple {
        let ripple = Ripple {
            x: self.css_width * 0.5,
            y: self.css_height * 0.5,
            max_radius: self.css_width.max(self.css_height) * self.cfg.welcome_reach,
            start: now,
            duration_ms: self.cfg.welcome_duration_ms,
            color: Accent::Blue.color(),
        };
        self.push(ripple)
    }

    pub fn push(&mut self, ripple: Ripple) -> &Ripple {
        self.ripples.push(ripple);
        &self.ripples[self.ripples.len() - 1]
    }

    /// Drop finished ripples.
    pub fn update(&mut self, now: f64) {
        self.ripples.retain(|r| !r.is_done(now));
    }

    /// Clear the surface (CSS pixel space) and paint every ripple.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, now: f64) {
        surface.clear(self.css_width, self.css_height);
        for r in &self.ripples {
            let p = r.progress(now);
            let radius = r.max_radius * ease_out_cubic(p);
            let alpha = 1.0 - p;

            let glow = StrokeStyle::new(r.color.rgba(alpha * self.cfg.glow_alpha), 6.0 * (1.0 - p) + 1.0);
            surface.stroke_circle(&glow, r.x, r.y, radius * 0.9);

            let core = StrokeStyle::new(r.color.rgba(alpha * self.cfg.core_alpha), 2.2 * (1.0 - p) + 0.8)
                .composite(Composite::Lighter);
            surface.stroke_circle(&core, r.x, r.y, radius);
        }
    }

    pub fn dispose(&mut self) {
        self.ripples.clear();
    }
}
