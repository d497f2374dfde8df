//! Procedural lightning bolts.
//!
//! A bolt is a random walk from its root: each step nudges the heading by a
//! bounded jitter and emits one segment. Branches are grown recursively from
//! the current point and spliced into the parent's segment list, so the
//! renderer only ever sees one flat polyline set per bolt.

use rand::Rng;

use crate::color::{self, Color};
use crate::config::{BoltConfig, spread};

/// Hard ceiling on branch nesting, whatever the configuration asks for.
pub const MAX_BRANCH_DEPTH: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bolt {
    /// Trunk and branch segments, flattened in generation order.
    pub segments: Vec<Segment>,
    pub color: Color,
    pub line_width: f64,
    /// Depth the bolt was generated at (0 for a trunk).
    pub depth: u8,
    /// Deepest branch level reached while growing this bolt.
    pub max_depth: u8,
    /// Segments walked by the trunk itself, branches excluded.
    pub trunk_steps: usize,
    /// `performance.now()` timestamp in ms.
    pub birth: f64,
    pub lifetime_ms: f64,
}

impl Bolt {
    /// Stamp a freshly generated bolt with its birth time and lifetime.
    pub fn born(mut self, now: f64, lifetime_ms: f64) -> Self {
        self.birth = now;
        self.lifetime_ms = lifetime_ms.max(0.0);
        self
    }

    pub fn age(&self, now: f64) -> f64 {
        now - self.birth
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) > self.lifetime_ms
    }

    /// Fraction of the lifetime consumed, clamped to [0, 1].
    pub fn progress(&self, now: f64) -> f64 {
        if self.lifetime_ms <= 0.0 {
            return 1.0;
        }
        (self.age(now) / self.lifetime_ms).clamp(0.0, 1.0)
    }

    /// Opacity multiplier, `1 - progress`.
    pub fn fade(&self, now: f64) -> f64 {
        1.0 - self.progress(now)
    }
}

/// Grow one bolt rooted at `(start_x, start_y)` heading along `angle`.
///
/// `depth` is clamped to `cfg.max_depth`, itself capped at
/// [`MAX_BRANCH_DEPTH`], so branching always terminates.
pub fn generate_bolt<R: Rng + ?Sized>(
    rng: &mut R,
    cfg: &BoltConfig,
    start_x: f64,
    start_y: f64,
    angle: f64,
    depth: u8,
) -> Bolt {
    let depth_cap = cfg.max_depth.min(MAX_BRANCH_DEPTH);
    let depth = depth.min(depth_cap);
    let segment_length = cfg.segment_length.sample(rng);
    let steps = if cfg.max_steps > cfg.min_steps {
        rng.gen_range(cfg.min_steps..cfg.max_steps)
    } else {
        cfg.min_steps
    };
    let color = color::pick(rng);
    let branch_probability = cfg.branch_probability.clamp(0.0, 1.0);

    let mut segments = Vec::with_capacity(steps);
    let mut max_depth = depth;
    let (mut x, mut y) = (start_x, start_y);

    for _ in 0..steps {
        let heading = angle + spread(rng, cfg.jitter);
        let nx = x + heading.cos() * segment_length;
        let ny = y + heading.sin() * segment_length;
        segments.push(Segment {
            x1: x,
            y1: y,
            x2: nx,
            y2: ny,
        });
        x = nx;
        y = ny;

        if depth < depth_cap && rng.gen_bool(branch_probability) {
            let branch_angle = angle + spread(rng, cfg.branch_spread);
            let branch = generate_bolt(rng, cfg, x, y, branch_angle, depth + 1);
            max_depth = max_depth.max(branch.max_depth);
            segments.extend(branch.segments);
        }
    }

    Bolt {
        segments,
        color,
        line_width: cfg.line_width(depth),
        depth,
        max_depth,
        trunk_steps: steps,
        birth: 0.0,
        lifetime_ms: 0.0,
    }
}
